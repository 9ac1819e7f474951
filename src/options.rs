//! Configuration options for environment transcoding.
//!
//! [`EnvOptions`] carries the settings shared by the store-backed entry points:
//!
//! - a literal key prefix, prepended on encode and required and stripped on decode
//! - whether variables read during a decode are removed from the store afterwards
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_environ::{from_store, EnvOptions, EnvStore, MemoryEnv};
//!
//! #[derive(Deserialize)]
//! struct Config { addr: String }
//!
//! let mut env = MemoryEnv::from_entries(["APP_ADDR=localhost", "PATH=/bin"]);
//! let options = EnvOptions::new().with_prefix("APP_").with_unset_consumed(true);
//!
//! let config: Config = from_store(&mut env, &options).unwrap();
//! assert_eq!(config.addr, "localhost");
//! assert_eq!(env.list(), vec!["PATH=/bin".to_string()]);
//! ```

/// Configuration options for environment transcoding.
///
/// # Examples
///
/// ```rust
/// use serde_environ::EnvOptions;
///
/// let options = EnvOptions::new().with_prefix("MYAPP_");
/// assert_eq!(options.prefix, "MYAPP_");
/// assert!(!options.unset_consumed);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvOptions {
    pub prefix: String,
    pub unset_consumed: bool,
}

impl EnvOptions {
    /// Creates default options (no prefix, variables left in place).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the key prefix.
    ///
    /// Matching is literal and case-sensitive.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Removes every variable consumed by a decode from the store once the
    /// decode succeeds.
    #[must_use]
    pub fn with_unset_consumed(mut self, unset: bool) -> Self {
        self.unset_consumed = unset;
        self
    }
}
