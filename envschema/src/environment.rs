//! Sources of raw environment values.
//!
//! Invariants:
//! - Variable names are case-sensitive.
//! - Values in the real process environment take precedence over values read
//!   from a `.env` file.
//! - Nothing here mutates the process environment.

use std::{
    collections::{BTreeMap, HashMap},
    env::VarError,
    ffi::OsString,
    path::Path,
};

use crate::error::DotenvError;

/// A lookup from variable name to raw string value.
///
/// Mirrors [`std::env::var`]: values that are not valid unicode are reported
/// as [`VarError::NotUnicode`], never converted lossily.
pub trait Environment {
    fn var(&self, key: &str) -> Result<String, VarError>;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn var(&self, key: &str) -> Result<String, VarError> {
        (**self).var(key)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.get(key).cloned().ok_or(VarError::NotPresent)
    }
}

impl Environment for BTreeMap<String, String> {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.get(key).cloned().ok_or(VarError::NotPresent)
    }
}

/// The live process environment, optionally overlaid with a `.env` file.
///
/// Lookups always read the process environment first, so changes made by the
/// host process after construction are visible.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv {
    dotenv: BTreeMap<String, String>,
}

impl ProcessEnv {
    /// The process environment without a `.env` overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `.env` from the current directory if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the file is not read.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    /// Missing files are silently ignored.
    pub fn load() -> Result<Self, DotenvError> {
        Self::load_from(".env")
    }

    /// Like [`load`](Self::load), reading `path` instead of `.env`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, DotenvError> {
        let path = path.as_ref();

        if dotenv_disabled() {
            tracing::debug!("dotenv loading disabled by DOTENV_DISABLED");
            return Ok(Self::new());
        }

        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if is_not_found(&e) => {
                tracing::debug!(path = %path.display(), "no dotenv file found");
                return Ok(Self::new());
            }
            Err(e) => return Err(DotenvError::from_dotenvy(path, e)),
        };

        let mut dotenv = BTreeMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| DotenvError::from_dotenvy(path, e))?;
            dotenv.insert(key, value);
        }

        tracing::debug!(path = %path.display(), vars = dotenv.len(), "loaded dotenv file");

        Ok(Self { dotenv })
    }

    /// Values read from the `.env` file, before process precedence applies.
    pub fn dotenv_vars(&self) -> &BTreeMap<String, String> {
        &self.dotenv
    }
}

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Result<String, VarError> {
        match std::env::var(key) {
            Err(VarError::NotPresent) => self.dotenv.var(key),
            result => result,
        }
    }
}

fn dotenv_disabled() -> bool {
    matches!(
        std::env::var("DOTENV_DISABLED").ok().as_deref(),
        Some("true") | Some("1")
    )
}

fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}

/// An owned set of variables.
///
/// Useful for passing an explicit environment in tests, or for freezing the
/// process environment at a point in time with [`Snapshot::capture`]. Values
/// are kept as OS strings so a captured non-unicode value is still reported
/// as such.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot(BTreeMap<String, OsString>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies every variable currently visible through `env`'s process
    /// environment and `.env` overlay.
    pub fn capture(env: &ProcessEnv) -> Self {
        let mut snapshot = Self::from_iter(env.dotenv.clone());
        // Names that are not unicode can never be looked up by a schema.
        snapshot.extend(
            std::env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value))),
        );
        snapshot
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<OsString>,
    ) -> Option<OsString> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<OsString> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Environment for Snapshot {
    fn var(&self, key: &str) -> Result<String, VarError> {
        let value = self.0.get(key).ok_or(VarError::NotPresent)?;
        value
            .to_str()
            .map(ToOwned::to_owned)
            .ok_or_else(|| VarError::NotUnicode(value.clone()))
    }
}

impl<K, V> FromIterator<(K, V)> for Snapshot
where
    K: Into<String>,
    V: Into<OsString>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K, V> Extend<(K, V)> for Snapshot
where
    K: Into<String>,
    V: Into<OsString>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.0
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn snapshot_is_case_sensitive() {
        let env = Snapshot::from_iter([("HOST", "localhost")]);

        assert_eq!(env.var("HOST").ok().as_deref(), Some("localhost"));
        assert_eq!(env.var("host"), Err(VarError::NotPresent));
    }

    #[test]
    fn process_env_prefers_real_values_over_dotenv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "_ENVSCHEMA_UNIT_SHARED=from-file").unwrap();
        writeln!(file, "_ENVSCHEMA_UNIT_FILE_ONLY=file-only").unwrap();

        temp_env::with_vars(
            [
                ("DOTENV_DISABLED", None),
                ("_ENVSCHEMA_UNIT_SHARED", Some("from-process")),
                ("_ENVSCHEMA_UNIT_FILE_ONLY", None),
            ],
            || {
                let env = ProcessEnv::load_from(file.path()).unwrap();

                assert_eq!(env.dotenv_vars().len(), 2);
                assert_eq!(
                    env.var("_ENVSCHEMA_UNIT_SHARED").ok().as_deref(),
                    Some("from-process")
                );
                assert_eq!(
                    env.var("_ENVSCHEMA_UNIT_FILE_ONLY").ok().as_deref(),
                    Some("file-only")
                );
            },
        );
    }

    #[test]
    fn capture_freezes_the_environment() {
        let snapshot = temp_env::with_var("_ENVSCHEMA_UNIT_CAPTURED", Some("before"), || {
            Snapshot::capture(&ProcessEnv::new())
        });

        assert_eq!(
            snapshot.var("_ENVSCHEMA_UNIT_CAPTURED").ok().as_deref(),
            Some("before")
        );
    }

    #[cfg(unix)]
    #[test]
    fn non_unicode_values_are_reported_not_converted() {
        use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

        let raw = OsStr::from_bytes(b"ab\xffcd");

        let live = temp_env::with_var("_ENVSCHEMA_UNIT_RAW", Some(raw), || {
            (
                ProcessEnv::new().var("_ENVSCHEMA_UNIT_RAW"),
                Snapshot::capture(&ProcessEnv::new()),
            )
        });

        assert_eq!(live.0, Err(VarError::NotUnicode(raw.to_owned())));
        assert_eq!(
            live.1.var("_ENVSCHEMA_UNIT_RAW"),
            Err(VarError::NotUnicode(raw.to_owned()))
        );
    }
}
