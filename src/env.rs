//! Environment stores the transcoder reads from and writes to.
//!
//! The core never touches the process environment directly. It talks to an
//! [`EnvStore`], of which two are provided:
//!
//! - [`OsEnv`]: the environment of the current process
//! - [`MemoryEnv`]: an insertion-ordered in-memory store, handy for tests and
//!   for preparing the environment of a child process
//!
//! Mutating the process environment is not synchronized. Callers that touch
//! [`OsEnv`] from several threads must serialize those calls themselves.

use crate::{Error, Result};
use indexmap::IndexMap;

/// A flat key-value store holding environment variables.
pub trait EnvStore {
    /// Every variable as a `KEY=VALUE` string.
    fn list(&self) -> Vec<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn unset(&mut self, key: &str) -> Result<()>;

    fn clear(&mut self);
}

/// Keys the process environment cannot hold.
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.contains('=') || key.contains('\0') {
        return Err(Error::InvalidEnvKey(key.to_string()));
    }
    Ok(())
}

/// The environment of the current process.
///
/// Variables whose name or value is not valid Unicode are not listed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEnv;

impl EnvStore for OsEnv {
    fn list(&self) -> Vec<String> {
        std::env::vars_os()
            .filter_map(|(key, value)| Some(format!("{}={}", key.to_str()?, value.to_str()?)))
            .collect()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        if value.contains('\0') {
            return Err(Error::custom(format!("value of {} contains a NUL byte", key)));
        }
        std::env::set_var(key, value);
        Ok(())
    }

    fn unset(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        std::env::remove_var(key);
        Ok(())
    }

    fn clear(&mut self) {
        for (key, _) in std::env::vars_os() {
            std::env::remove_var(key);
        }
    }
}

/// An in-memory environment that lists variables in insertion order.
///
/// # Examples
///
/// ```rust
/// use serde_environ::{EnvStore, MemoryEnv};
///
/// let mut env = MemoryEnv::new();
/// env.set("ADDR", "localhost").unwrap();
/// env.set("PORT", "8080").unwrap();
/// assert_eq!(env.list(), vec!["ADDR=localhost", "PORT=8080"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryEnv {
    vars: IndexMap<String, String>,
}

impl MemoryEnv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `KEY=VALUE` strings; entries without `=` are
    /// ignored.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let vars = entries
            .into_iter()
            .filter_map(|entry| {
                crate::store::split_entry(entry.as_ref())
                    .map(|(key, value)| (key.to_string(), value.to_string()))
            })
            .collect();
        MemoryEnv { vars }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EnvStore for MemoryEnv {
    fn list(&self) -> Vec<String> {
        self.vars
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        self.vars.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn unset(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        self.vars.shift_remove(key);
        Ok(())
    }

    fn clear(&mut self) {
        self.vars.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_env_roundtrip() {
        let mut env = MemoryEnv::from_entries(["A=1", "B=x=y", "broken"]);
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("B"), Some("x=y"));

        env.set("A", "2").unwrap();
        env.unset("B").unwrap();
        env.unset("B").unwrap();
        assert_eq!(env.list(), vec!["A=2".to_string()]);

        env.clear();
        assert!(env.is_empty());
    }

    #[test]
    fn test_invalid_keys_are_rejected() {
        let mut env = MemoryEnv::new();
        assert!(matches!(env.set("", "v"), Err(Error::InvalidEnvKey(_))));
        assert!(matches!(env.set("A=B", "v"), Err(Error::InvalidEnvKey(_))));
        assert!(matches!(env.unset("A\0"), Err(Error::InvalidEnvKey(_))));
    }
}
