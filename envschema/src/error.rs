use std::{
    fmt,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use thiserror::Error;

use super::BoxError;

/// Why a single variable was rejected.
#[derive(Error, Debug)]
pub enum FieldErrorKind {
    #[error("required but not set")]
    Missing,

    #[error("invalid value \"{value}\": {source}")]
    Invalid {
        value: String,
        #[source]
        source: BoxError,
    },

    /// The raw value is not valid unicode and was not handed to the transform.
    #[error("value is not valid unicode")]
    NotUnicode,
}

/// A schema field that failed validation, with the variable it reads.
#[derive(Error, Debug)]
#[error("`{path}` ({env_var}): {kind}")]
pub struct FieldError {
    path: String,
    env_var: String,
    #[source]
    kind: FieldErrorKind,
}

impl FieldError {
    pub fn new(path: impl Into<String>, env_var: impl Into<String>, kind: FieldErrorKind) -> Self {
        Self {
            path: path.into(),
            env_var: env_var.into(),
            kind,
        }
    }

    /// `Struct.field` of the schema field.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn env_var(&self) -> &str {
        &self.env_var
    }

    pub fn kind(&self) -> &FieldErrorKind {
        &self.kind
    }

    pub fn is_missing(&self) -> bool {
        matches!(self.kind, FieldErrorKind::Missing)
    }
}

/// All field failures of one validation pass, in declaration order.
#[derive(Debug, Default)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Moves every error of a nested schema into this list.
    pub fn append(&mut self, nested: FieldErrors) {
        self.errors.extend(nested.errors);
    }

    /// True when nothing was rejected for a reason other than being unset.
    pub fn all_missing(&self) -> bool {
        self.errors.iter().all(FieldError::is_missing)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl FromIterator<FieldError> for FieldErrors {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FieldErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

// 2 fields failed
//   - `Config.host` (HOST): required but not set
//   - `Config.port` (PORT): invalid value "http": invalid digit found in string
impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "field" } else { "fields" };
        write!(f, "{} {noun} failed", self.errors.len())?;

        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// The environment does not satisfy the schema.
#[derive(Error, Debug)]
#[error("Invalid environment variables: {errors}")]
pub struct ValidationError {
    errors: FieldErrors,
}

impl ValidationError {
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

impl From<FieldErrors> for ValidationError {
    fn from(errors: FieldErrors) -> Self {
        Self { errors }
    }
}

/// Declared variables are absent or empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("❌ Failed - Missing env vars - {}", .missing.join(", "))]
pub struct ConfigurationError {
    missing: Vec<String>,
}

impl ConfigurationError {
    pub(crate) fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }

    /// Names of the missing or empty variables, in declaration order.
    pub fn missing(&self) -> &[String] {
        &self.missing
    }
}

/// Failure to load a `.env` file.
///
/// Messages never include line contents from the file, which may hold
/// secrets.
#[derive(Error, Debug)]
pub enum DotenvError {
    #[error(
        "Failed to parse {} at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading",
        .path.display()
    )]
    Parse { path: PathBuf, error_index: usize },

    #[error("Failed to read {}: {kind}", .path.display())]
    Io { path: PathBuf, kind: ErrorKind },

    #[error(
        "Failed to load {}. Hint: set DOTENV_DISABLED=1 to skip .env loading",
        .path.display()
    )]
    Unknown { path: PathBuf },
}

impl DotenvError {
    pub(crate) fn from_dotenvy(path: &Path, error: dotenvy::Error) -> Self {
        let path = path.to_path_buf();
        match error {
            dotenvy::Error::LineParse(_, error_index) => Self::Parse { path, error_index },
            dotenvy::Error::Io(io_err) => Self::Io {
                path,
                kind: io_err.kind(),
            },
            _ => Self::Unknown { path },
        }
    }
}

/// Errors from [`EnvironmentManager::from_process`](crate::EnvironmentManager::from_process).
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Dotenv(#[from] DotenvError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
