use std::env::VarError;

use crate::{
    environment::Environment,
    error::{ConfigurationError, FieldErrors},
};

/// One environment variable declared by a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub env_var: &'static str,
    pub default: Option<&'static str>,
    pub optional: bool,
}

/// A struct whose fields are read from environment variables.
///
/// Usually implemented with `#[derive(EnvSchema)]`:
///
/// ```
/// use envschema::EnvSchema;
///
/// #[derive(EnvSchema)]
/// pub struct Config {
///     #[env(from = "API_URL")]
///     api_url: String,
///     #[env(from, default = "8016")]
///     port: u16,
///     #[env(from)]
///     region: Option<String>,
///     #[env(nested)]
///     kafka: Kafka,
/// }
///
/// #[derive(EnvSchema)]
/// pub struct Kafka {
///     #[env(from = "KAFKA_BROKERS", with = list)]
///     brokers: Vec<String>,
/// }
/// ```
///
/// Only structs with named fields are schemas:
///
/// ```compile_fail
/// #[derive(envschema::EnvSchema)]
/// pub enum Mode {
///     Development,
///     Production,
/// }
/// ```
///
/// ```compile_fail
/// #[derive(envschema::EnvSchema)]
/// pub struct Port(u16);
/// ```
///
/// ```compile_fail
/// #[derive(envschema::EnvSchema)]
/// pub struct Config<T> {
///     #[env(from)]
///     port: T,
/// }
/// ```
///
/// An optional field cannot have a default:
///
/// ```compile_fail
/// #[derive(envschema::EnvSchema)]
/// pub struct Config {
///     #[env(from, default = "info")]
///     log_level: Option<String>,
/// }
/// ```
///
/// `nested` takes no other attribute:
///
/// ```compile_fail
/// # #[derive(envschema::EnvSchema)]
/// # pub struct Kafka {
/// #     #[env(from)]
/// #     brokers: String,
/// # }
/// #[derive(envschema::EnvSchema)]
/// pub struct Config {
///     #[env(nested, from = "KAFKA")]
///     kafka: Kafka,
/// }
/// ```
///
/// ```compile_fail
/// # #[derive(envschema::EnvSchema)]
/// # pub struct Kafka {
/// #     #[env(from)]
/// #     brokers: String,
/// # }
/// #[derive(envschema::EnvSchema)]
/// pub struct Config {
///     #[env(from, nested)]
///     kafka: Kafka,
/// }
/// ```
///
/// ```compile_fail
/// # #[derive(envschema::EnvSchema)]
/// # pub struct Kafka {
/// #     #[env(from)]
/// #     brokers: String,
/// # }
/// #[derive(envschema::EnvSchema)]
/// pub struct Config {
///     #[env(nested, default = "")]
///     kafka: Kafka,
/// }
/// ```
///
/// ```compile_fail
/// # #[derive(envschema::EnvSchema)]
/// # pub struct Kafka {
/// #     #[env(from)]
/// #     brokers: String,
/// # }
/// #[derive(envschema::EnvSchema)]
/// pub struct Config {
///     #[env(nested, with = into)]
///     kafka: Kafka,
/// }
/// ```
///
/// Unknown attributes are rejected:
///
/// ```compile_fail
/// #[derive(envschema::EnvSchema)]
/// pub struct Config {
///     #[env(from, rename = "PORT")]
///     port: u16,
/// }
/// ```
pub trait EnvSchema: Sized {
    /// Pushes every declared variable, nested schemas included, in declaration
    /// order.
    fn declare(fields: &mut Vec<FieldSpec>);

    /// Reads and transforms every field, collecting all failures.
    fn validate(env: &dyn Environment) -> Result<Self, FieldErrors>;

    fn fields() -> Vec<FieldSpec> {
        let mut fields = Vec::new();
        Self::declare(&mut fields);
        fields
    }

    /// Fails when any declared variable is unset or empty, regardless of
    /// defaults and transforms. Does not require `env` to validate.
    fn check(env: &dyn Environment) -> Result<(), ConfigurationError> {
        let missing: Vec<String> = Self::fields()
            .into_iter()
            .filter(|field| match env.var(field.env_var) {
                Ok(value) => value.is_empty(),
                Err(VarError::NotPresent) => true,
                Err(VarError::NotUnicode(_)) => false,
            })
            .map(|field| field.env_var.to_owned())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError::new(missing))
        }
    }

    /// One `NAME=default` line per declared variable, usable as a
    /// `.env.example`.
    fn requirements() -> String {
        Self::fields()
            .iter()
            .map(|field| format!("{}={}\n", field.env_var, field.default.unwrap_or_default()))
            .collect()
    }
}
