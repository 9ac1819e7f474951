//! Custom scalar coercion.
//!
//! The decoder hands a leaf's raw string to whatever `Deserialize`
//! implementation asks for it through `deserialize_str`. A type with its own
//! string form therefore needs no support from this crate beyond a way to
//! plug `FromStr` and `Display` in, which [`display_from_str`] provides for
//! use with `#[serde(with = "...")]`.
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_environ::{from_entries, to_vec};
//! use std::net::SocketAddr;
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Config {
//!     #[serde(with = "serde_environ::with::display_from_str")]
//!     listen: SocketAddr,
//! }
//!
//! let config: Config = from_entries(["LISTEN=127.0.0.1:8080"]).unwrap();
//! assert_eq!(config.listen.port(), 8080);
//! assert_eq!(to_vec(&config).unwrap(), vec!["LISTEN=127.0.0.1:8080"]);
//! ```

/// Encodes a value with `Display` and decodes it with `FromStr`.
pub mod display_from_str {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
