//! # serde_environ
//!
//! A Serde-compatible format that flattens structs and maps into environment
//! variables, and rebuilds them from environment variables.
//!
//! ## How values are flattened
//!
//! - **Fields** become uppercased keys: `port_name` is read from `PORT_NAME`
//! - **Nesting** is expressed with dots: `db.host` is `DB.HOST`
//! - **Scalar lists** are one CSV record: `TAGS=a,b,"with, comma"`
//! - **Other lists** are indexed: `ADDR.0.STREET`, `ADDR.1.STREET`
//! - **Maps** use their stringified key as a segment: `PORTS.HTTP=80`
//! - **Options** that are `None` produce no variable at all
//!
//! See the [`format`] module for the complete description.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_environ::{from_entries, to_vec};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     addr: String,
//!     port: u16,
//!     tags: Vec<String>,
//!     tls: Option<Tls>,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Tls {
//!     cert: String,
//! }
//!
//! let config: Config = from_entries([
//!     "ADDR=localhost",
//!     "PORT=8080",
//!     "TAGS=web,public",
//!     "TLS.CERT=/etc/cert.pem",
//! ])
//! .unwrap();
//! assert_eq!(config.port, 8080);
//! assert_eq!(config.tls.as_ref().unwrap().cert, "/etc/cert.pem");
//!
//! let entries = to_vec(&config).unwrap();
//! assert_eq!(
//!     entries,
//!     vec!["ADDR=localhost", "PORT=8080", "TAGS=web,public", "TLS.CERT=/etc/cert.pem"]
//! );
//! ```
//!
//! ## Reading the process environment
//!
//! ```rust,no_run
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Config { database_url: String }
//!
//! // Reads MYAPP_DATABASE_URL and removes it from the environment.
//! let config: Config = serde_environ::from_env_with_prefix_and_unset("MYAPP_").unwrap();
//! ```
//!
//! ## Limits
//!
//! - Only `bool`, integers, strings, chars and unit enum variants are scalars;
//!   floats are not supported
//! - The root value must be a struct or a map
//! - Map keys are uppercased on the way out and are not lowercased on the way
//!   back in

pub mod de;
pub mod env;
pub mod error;
pub mod format;
pub mod kind;
pub mod options;
mod path;
mod record;
mod scalar;
pub mod ser;
pub mod store;
pub mod with;

pub use de::Deserializer;
pub use env::{EnvStore, MemoryEnv, OsEnv};
pub use error::{Error, Result};
pub use kind::{classify, Kind};
pub use options::EnvOptions;
pub use ser::Serializer;
pub use store::KeyStore;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Serialize a struct or map into `KEY=VALUE` strings.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_environ::to_vec;
///
/// #[derive(Serialize)]
/// struct Conf { addr: String, port: i32 }
///
/// let conf = Conf { addr: "someOtherHost.net".into(), port: 8090 };
/// assert_eq!(to_vec(&conf).unwrap(), vec!["ADDR=someOtherHost.net", "PORT=8090"]);
/// ```
///
/// # Errors
///
/// Returns an error if the root is not a struct or map, or a nested value
/// cannot be encoded.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec<T>(value: &T) -> Result<Vec<String>>
where
    T: ?Sized + Serialize,
{
    to_vec_with_prefix(value, "")
}

/// Serialize a struct or map into `KEY=VALUE` strings, prepending `prefix`
/// to every key.
///
/// # Errors
///
/// Same as [`to_vec`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_vec_with_prefix<T>(value: &T, prefix: &str) -> Result<Vec<String>>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new();
    serializer.encode(value)?;
    let lines = serializer.into_lines(prefix);
    debug!(prefix, entries = lines.len(), "encoded value");
    Ok(lines)
}

/// Serialize a struct or map into a key to value map, in encoding order.
///
/// # Examples
///
/// ```rust
/// use serde::Serialize;
/// use serde_environ::to_map;
///
/// #[derive(Serialize)]
/// struct Conf { addr: String, port: i32 }
///
/// let conf = Conf { addr: "someOtherHost.net".into(), port: 8090 };
/// let map = to_map(&conf).unwrap();
/// assert_eq!(map["ADDR"], "someOtherHost.net");
/// assert_eq!(map["PORT"], "8090");
/// ```
///
/// # Errors
///
/// Same as [`to_vec`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_map<T>(value: &T) -> Result<IndexMap<String, String>>
where
    T: ?Sized + Serialize,
{
    to_map_with_prefix(value, "")
}

/// Like [`to_map`], with `prefix` prepended to every key.
///
/// # Errors
///
/// Same as [`to_vec`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_map_with_prefix<T>(value: &T, prefix: &str) -> Result<IndexMap<String, String>>
where
    T: ?Sized + Serialize,
{
    let mut serializer = Serializer::new();
    serializer.encode(value)?;
    Ok(serializer
        .into_entries()
        .into_iter()
        .map(|(key, value)| (format!("{}{}", prefix, key), value))
        .collect())
}

/// Serialize a struct or map and set every entry in `store`.
///
/// # Errors
///
/// Returns the encoding error, or the first error reported by the store.
pub fn to_store<T, S>(value: &T, store: &mut S, options: &EnvOptions) -> Result<()>
where
    T: ?Sized + Serialize,
    S: EnvStore + ?Sized,
{
    let map = to_map_with_prefix(value, &options.prefix)?;
    debug!(prefix = %options.prefix, entries = map.len(), "setting variables");
    for (key, value) in &map {
        store.set(key, value)?;
    }
    Ok(())
}

/// Serialize a struct or map into the process environment.
///
/// # Errors
///
/// Same as [`to_store`].
pub fn to_env<T>(value: &T) -> Result<()>
where
    T: ?Sized + Serialize,
{
    to_store(value, &mut OsEnv, &EnvOptions::default())
}

/// Like [`to_env`], with `prefix` prepended to every variable name.
///
/// # Errors
///
/// Same as [`to_store`].
pub fn to_env_with_prefix<T>(value: &T, prefix: &str) -> Result<()>
where
    T: ?Sized + Serialize,
{
    to_store(value, &mut OsEnv, &EnvOptions::new().with_prefix(prefix))
}

/// Deserialize a struct or map from `KEY=VALUE` strings.
///
/// Entries without `=` are ignored.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_environ::from_entries;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Conf { addr: String, port: i32 }
///
/// let conf: Conf = from_entries(["ADDR=localhost", "PORT=8080"]).unwrap();
/// assert_eq!(conf, Conf { addr: "localhost".into(), port: 8080 });
/// ```
///
/// # Errors
///
/// Returns an error if `T` is not a struct or map, or a value cannot be
/// coerced into its field.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_entries<T, I, S>(entries: I) -> Result<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    from_entries_with_prefix(entries, "")
}

/// Deserialize a struct or map from the entries whose key starts with
/// `prefix`; the prefix is stripped before the key is interpreted.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use serde_environ::from_entries_with_prefix;
///
/// #[derive(Deserialize)]
/// struct Conf { addr: String }
///
/// let conf: Conf = from_entries_with_prefix(["PFX_ADDR=localhost", "ADDR=other"], "PFX_").unwrap();
/// assert_eq!(conf.addr, "localhost");
/// ```
///
/// # Errors
///
/// Same as [`from_entries`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_entries_with_prefix<T, I, S>(entries: I, prefix: &str) -> Result<T>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut store = KeyStore::new(entries, prefix);
    from_key_store(&mut store)
}

/// Deserialize a struct or map from an existing [`KeyStore`].
///
/// The store keeps track of what was consumed, which can then be purged with
/// [`KeyStore::purge_consumed`].
///
/// # Errors
///
/// Same as [`from_entries`].
pub fn from_key_store<T>(store: &mut KeyStore) -> Result<T>
where
    T: DeserializeOwned,
{
    debug!(prefix = store.prefix(), entries = store.data().len(), "decoding value");
    let value = Deserializer::new(store).decode()?;
    debug!(consumed = store.consumed_keys().len(), "decoded value");
    Ok(value)
}

/// Deserialize a struct or map from an [`EnvStore`].
///
/// With [`EnvOptions::unset_consumed`], every variable the decode read is
/// removed from `env` afterwards.
///
/// # Errors
///
/// Returns the decoding error, or the last error reported while removing
/// consumed variables.
pub fn from_store<T, S>(env: &mut S, options: &EnvOptions) -> Result<T>
where
    T: DeserializeOwned,
    S: EnvStore + ?Sized,
{
    let mut store = KeyStore::new(env.list(), &options.prefix);
    let value = from_key_store(&mut store)?;
    if options.unset_consumed {
        store.purge_consumed(env)?;
    }
    Ok(value)
}

/// Deserialize a struct or map from the process environment.
///
/// # Errors
///
/// Same as [`from_entries`].
pub fn from_env<T>() -> Result<T>
where
    T: DeserializeOwned,
{
    from_store(&mut OsEnv, &EnvOptions::default())
}

/// Deserialize from the process variables starting with `prefix`.
///
/// # Errors
///
/// Same as [`from_entries`].
pub fn from_env_with_prefix<T>(prefix: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    from_store(&mut OsEnv, &EnvOptions::new().with_prefix(prefix))
}

/// Deserialize from the process environment and unset every variable read.
///
/// # Errors
///
/// Same as [`from_store`].
pub fn from_env_and_unset<T>() -> Result<T>
where
    T: DeserializeOwned,
{
    from_store(&mut OsEnv, &EnvOptions::new().with_unset_consumed(true))
}

/// Deserialize from the process variables starting with `prefix` and unset
/// every variable read.
///
/// # Errors
///
/// Same as [`from_store`].
pub fn from_env_with_prefix_and_unset<T>(prefix: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let options = EnvOptions::new()
        .with_prefix(prefix)
        .with_unset_consumed(true);
    from_store(&mut OsEnv, &options)
}
