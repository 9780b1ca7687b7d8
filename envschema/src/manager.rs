use std::{fmt, marker::PhantomData};

use crate::{
    environment::{Environment, ProcessEnv},
    error::{ConfigurationError, Error, ValidationError},
    schema::EnvSchema,
};

/// Validates an [`Environment`] against the schema `S`.
///
/// Construction validates eagerly. Every [`get_env`](Self::get_env) validates
/// again, so changes to a live environment are picked up.
/// [`check`](Self::check) is a separate presence-only pass.
pub struct EnvironmentManager<S, E = ProcessEnv> {
    env: E,
    schema: PhantomData<fn() -> S>,
}

impl<S, E: fmt::Debug> fmt::Debug for EnvironmentManager<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentManager")
            .field("schema", &std::any::type_name::<S>())
            .field("env", &self.env)
            .finish()
    }
}

impl<S: EnvSchema> EnvironmentManager<S, ProcessEnv> {
    /// Validates the process environment overlaid with `.env` from the current
    /// directory.
    pub fn from_process() -> Result<Self, Error> {
        let env = ProcessEnv::load()?;
        Ok(Self::new(env)?)
    }
}

impl<S: EnvSchema, E: Environment> EnvironmentManager<S, E> {
    pub fn new(env: E) -> Result<Self, ValidationError> {
        let manager = Self {
            env,
            schema: PhantomData,
        };
        manager.validate()?;
        Ok(manager)
    }

    pub fn get_env(&self) -> Result<S, ValidationError> {
        self.validate()
    }

    /// Fails when any declared variable is unset or empty, regardless of
    /// defaults and transforms.
    pub fn check(&self) -> Result<(), ConfigurationError> {
        Self::check_env(&self.env)
    }

    /// The presence pass of [`check`](Self::check), for an environment that
    /// may not pass validation, so no manager can be built for it.
    pub fn check_env(env: &E) -> Result<(), ConfigurationError> {
        S::check(env).inspect_err(|err| {
            tracing::warn!(
                schema = std::any::type_name::<S>(),
                missing = %err.missing().join(", "),
                "missing environment variables"
            );
        })
    }

    pub fn environment(&self) -> &E {
        &self.env
    }

    fn validate(&self) -> Result<S, ValidationError> {
        let validated = S::validate(&self.env)?;
        tracing::debug!(schema = std::any::type_name::<S>(), "environment validated");
        Ok(validated)
    }
}
