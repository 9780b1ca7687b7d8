//! Validate a process's environment variables against a typed schema at
//! startup.
//!
//! A schema is a struct deriving [`EnvSchema`]. An [`EnvironmentManager`]
//! validates it eagerly against an [`Environment`], re-validates on every
//! [`get_env`](EnvironmentManager::get_env), and offers a separate presence
//! pre-check with [`check`](EnvironmentManager::check).
//!
//! ```no_run
//! use envschema::{EnvSchema, EnvironmentManager};
//!
//! #[derive(EnvSchema, Debug)]
//! pub struct Config {
//!     #[env(from, default = "8016")]
//!     port: u16,
//!     #[env(from = "DEBUG", with = flag)]
//!     debug: bool,
//!     #[env(from, with = list)]
//!     brokers: Vec<String>,
//! }
//!
//! # fn main() -> Result<(), envschema::Error> {
//! let manager = EnvironmentManager::<Config>::from_process()?;
//! let config = manager.get_env()?;
//! # Ok(())
//! # }
//! ```
mod environment;
mod error;
mod manager;
mod parser;
mod schema;

#[doc(hidden)]
#[path = "private.rs"]
pub mod __private;

pub use environment::{Environment, ProcessEnv, Snapshot};
pub use envschema_derive::EnvSchema;
pub use error::{
    ConfigurationError, DotenvError, Error, FieldError, FieldErrorKind, FieldErrors, ValidationError,
};
pub use manager::EnvironmentManager;
pub use parser::{ParseResult, flag, list};
pub use schema::{EnvSchema, FieldSpec};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
