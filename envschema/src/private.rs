//! Items referenced by the code `#[derive(EnvSchema)]` generates.
//!
//! These are not meant to be used directly by users of the library.
pub use crate::environment::Environment;
pub use crate::error::{FieldError, FieldErrorKind, FieldErrors};
pub use crate::parser::{Parser, flag, from_str, into, list};
pub use crate::schema::{EnvSchema, FieldSpec};
