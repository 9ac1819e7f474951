//! Error types for environment encoding and decoding.
//!
//! Every failure carries the key path it happened at, so a bad variable can be
//! traced back to the field that asked for it.
//!
//! ## Error Categories
//!
//! - **Shape errors**: the root value is not a struct or map, or a map key is
//!   not a scalar
//! - **Coercion errors**: a value cannot be parsed into the target integer, or
//!   the target is not a supported scalar at all
//! - **Map errors**: an entry discovered under a map has nothing at its own
//!   key, so its key cannot be told apart from a nested path
//! - **Sequence errors**: a scalar list value is not a valid CSV record, or a
//!   scalar list being encoded contains `None`
//! - **Store errors**: the environment rejected a key
//!
//! ## Examples
//!
//! ```rust
//! use serde::Deserialize;
//! use serde_environ::{from_entries, Error};
//!
//! #[derive(Deserialize, Debug)]
//! struct Config { port: u16 }
//!
//! let result: Result<Config, Error> = from_entries(["PORT=eighty"]);
//! assert!(matches!(result, Err(Error::IntegerParse { .. })));
//! ```

use std::fmt;
use std::num::ParseIntError;
use thiserror::Error;

/// Represents all possible errors that can occur while transcoding.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The top-level value is not a struct or a map.
    #[error("root value must be a struct or a map, found {0}")]
    InvalidRootKind(String),

    /// A map key type cannot be coerced from or to a scalar string.
    #[error("unsupported map key type at {key:?}: {kind}")]
    UnsupportedKeyType { key: String, kind: String },

    /// A value cannot be parsed as an integer.
    #[error("invalid integer {value:?} for key {key:?}: {source}")]
    IntegerParse {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The CSV record of a scalar sequence is malformed.
    #[error("malformed sequence encoding for key {key:?}: {reason}")]
    MalformedSequence { key: String, reason: String },

    /// Coercion was requested for a kind that is not bool, integer or string.
    #[error("unknown scalar kind {kind} for key {key:?}")]
    UnknownScalarKind { key: String, kind: &'static str },

    /// A map entry holds only nested keys where a scalar or scalar sequence
    /// was expected, as with a map key containing `.`.
    #[error("map entry {key:?} has no value of its own, only keys below it")]
    AmbiguousMapKey { key: String },

    /// A scalar sequence being encoded contains an absent element.
    #[error("absent element in scalar sequence {key:?}")]
    AbsentSequenceElement { key: String },

    /// The environment store refused a key.
    #[error("invalid environment key {0:?}")]
    InvalidEnvKey(String),

    /// Custom error
    #[error("{0}")]
    Custom(String),
}

impl Error {
    /// Creates an invalid root error naming the kind that was found.
    pub fn invalid_root<K: fmt::Display>(found: K) -> Self {
        Error::InvalidRootKind(found.to_string())
    }

    /// Creates an unsupported map key error.
    pub fn unsupported_key(key: &str, kind: &str) -> Self {
        Error::UnsupportedKeyType {
            key: key.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Creates an integer parse error for the value read at `key`.
    pub fn integer_parse(key: &str, value: &str, source: ParseIntError) -> Self {
        Error::IntegerParse {
            key: key.to_string(),
            value: value.to_string(),
            source,
        }
    }

    /// Creates a malformed sequence error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_environ::Error;
    ///
    /// let err = Error::malformed_sequence("LIST", "unterminated quoted field");
    /// assert!(err.to_string().contains("LIST"));
    /// ```
    pub fn malformed_sequence(key: &str, reason: &str) -> Self {
        Error::MalformedSequence {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn unknown_scalar(key: &str, kind: &'static str) -> Self {
        Error::UnknownScalarKind {
            key: key.to_string(),
            kind,
        }
    }

    pub fn ambiguous_map_key(key: &str) -> Self {
        Error::AmbiguousMapKey {
            key: key.to_string(),
        }
    }

    pub fn absent_element(key: &str) -> Self {
        Error::AbsentSequenceElement {
            key: key.to_string(),
        }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
