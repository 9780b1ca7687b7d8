use std::env::VarError;

use crate::{BoxError, environment::Environment, error::FieldErrorKind};

/// Return type for functions that can be used with the `with` attribute.
pub type ParseResult<T> = Result<T, BoxError>;

pub trait Parser<T> {
    fn parse(&self, s: &str) -> ParseResult<T>;

    /// Looks `env_var` up in `env` and parses it. `None` when the variable is
    /// unset.
    fn parse_from_env(
        &self,
        env: &dyn Environment,
        env_var: &str,
    ) -> Option<Result<T, FieldErrorKind>> {
        match env.var(env_var) {
            Ok(value) => Some(self.parse_value(value)),
            Err(VarError::NotPresent) => None,
            Err(VarError::NotUnicode(_)) => Some(Err(FieldErrorKind::NotUnicode)),
        }
    }

    /// Parses `value`, keeping it in the error when it is rejected.
    fn parse_value(&self, value: impl Into<String>) -> Result<T, FieldErrorKind> {
        let value = value.into();
        self.parse(&value)
            .map_err(|source| FieldErrorKind::Invalid { value, source })
    }
}

pub fn from_str<T>(s: &str) -> ParseResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    s.parse::<T>().map_err(|e| e.into())
}

pub fn into<T>(s: &str) -> ParseResult<T>
where
    T: From<String>,
{
    Ok(s.to_owned().into())
}

/// `true` exactly when the value is `"true"`; anything else is `false`.
pub fn flag(s: &str) -> ParseResult<bool> {
    Ok(s == "true")
}

/// Splits a comma separated value and trims each item.
pub fn list(s: &str) -> ParseResult<Vec<String>> {
    Ok(s.split(',').map(|item| item.trim().to_owned()).collect())
}

impl<T, F> Parser<T> for F
where
    F: for<'a> Fn(&'a str) -> ParseResult<T>,
{
    fn parse(&self, s: &str) -> ParseResult<T> {
        (self)(s)
    }
}
