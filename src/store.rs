//! Consumable view over flat `KEY=VALUE` input.
//!
//! [`KeyStore`] is built once per decode. It keeps the entries that carry the
//! requested prefix (with the prefix stripped) and hands each key out at most
//! once: reading a key moves it from the remaining set to the found set. Keys
//! are kept sorted so map entries are always visited in the same order.

use crate::env::EnvStore;
use crate::Result;
use std::collections::BTreeMap;
use std::ops::Bound;
use tracing::trace;

/// Splits a `KEY=VALUE` entry at the first `=`.
pub(crate) fn split_entry(entry: &str) -> Option<(&str, &str)> {
    entry.split_once('=')
}

/// The key-value store adapter mediating every lookup of a decode.
#[derive(Debug, Clone, Default)]
pub struct KeyStore {
    prefix: String,
    data: BTreeMap<String, String>,
    remaining: BTreeMap<String, String>,
    found: BTreeMap<String, String>,
}

impl KeyStore {
    /// Builds a store from `KEY=VALUE` entries.
    ///
    /// Entries without `=` and entries whose key does not start with `prefix`
    /// are dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_environ::KeyStore;
    ///
    /// let store = KeyStore::new(["PFX_ADDR=localhost", "OTHER=x"], "PFX_");
    /// assert_eq!(store.sorted_remaining_keys(), vec!["ADDR".to_string()]);
    /// ```
    pub fn new<I, S>(entries: I, prefix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut store = KeyStore {
            prefix: prefix.to_string(),
            ..Default::default()
        };

        for entry in entries {
            let Some((key, value)) = split_entry(entry.as_ref()) else {
                continue;
            };
            if let Some(key) = key.strip_prefix(prefix) {
                store.data.insert(key.to_string(), value.to_string());
                store.remaining.insert(key.to_string(), value.to_string());
            }
        }

        store
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Every entry visible to the decoder, consumed or not.
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Takes the value of `key`, or the empty string if it is absent or was
    /// already taken.
    pub fn get(&mut self, key: &str) -> String {
        match self.remaining.remove(key) {
            Some(value) => {
                trace!(key, "consumed");
                self.found.insert(key.to_string(), value.clone());
                value
            }
            None => String::new(),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.remaining.contains_key(key)
    }

    /// Whether any remaining key starts with `prefix`.
    pub fn has_key_with_prefix(&self, prefix: &str) -> bool {
        self.keys_with_prefix(prefix).next().is_some()
    }

    /// Whether `path` itself or anything below it is still unread.
    pub(crate) fn has_path(&self, path: &str) -> bool {
        self.contains_key(path) || self.has_key_with_prefix(&crate::path::descendants(path))
    }

    /// Remaining keys starting with `prefix`, in lexicographic order.
    pub(crate) fn keys_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.remaining
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(key, _)| key.as_str())
            .take_while(move |key| key.starts_with(prefix))
    }

    /// Snapshot of the remaining keys in lexicographic order.
    pub fn sorted_remaining_keys(&self) -> Vec<String> {
        self.remaining.keys().cloned().collect()
    }

    /// Keys taken so far, in lexicographic order.
    pub fn consumed_keys(&self) -> Vec<String> {
        self.found.keys().cloned().collect()
    }

    /// Removes every consumed key, prefix restored, from `env`.
    ///
    /// All removals are attempted; the last failure is returned.
    pub fn purge_consumed<S: EnvStore + ?Sized>(&self, env: &mut S) -> Result<()> {
        let mut outcome = Ok(());
        for key in self.found.keys() {
            let full = format!("{}{}", self.prefix, key);
            trace!(key = %full, "unset");
            if let Err(e) = env.unset(&full) {
                outcome = Err(e);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MemoryEnv;

    #[test]
    fn test_prefix_is_stripped_and_others_dropped() {
        let store = KeyStore::new(["_PFX_ADDR=localhost", "OTHER=x", "NOEQUALS"], "_PFX_");
        assert_eq!(store.prefix(), "_PFX_");
        assert_eq!(store.data().len(), 1);
        assert_eq!(store.data().get("ADDR").map(String::as_str), Some("localhost"));
    }

    #[test]
    fn test_value_keeps_later_equals_signs() {
        let mut store = KeyStore::new(["DSN=user=admin;db=main"], "");
        assert_eq!(store.get("DSN"), "user=admin;db=main");
    }

    #[test]
    fn test_get_consumes_once() {
        let mut store = KeyStore::new(["ADDR=localhost", "PORT=8080"], "");
        assert_eq!(store.get("ADDR"), "localhost");
        assert_eq!(store.get("ADDR"), "");
        assert_eq!(store.get("MISSING"), "");
        assert_eq!(store.consumed_keys(), vec!["ADDR".to_string()]);
        assert_eq!(store.sorted_remaining_keys(), vec!["PORT".to_string()]);
        assert_eq!(store.data().len(), 2);
    }

    #[test]
    fn test_prefix_queries_track_remaining() {
        let mut store = KeyStore::new(["ADDR.0.TYPE=1", "ADDR.1.TYPE=0", "ADDRESS=x"], "");
        assert!(store.has_key_with_prefix("ADDR.1"));
        assert!(store.has_path("ADDR.0"));
        assert!(!store.has_path("ADDR.2"));

        store.get("ADDR.1.TYPE");
        assert!(!store.has_key_with_prefix("ADDR.1"));

        let keys: Vec<_> = store.keys_with_prefix("ADDR").collect();
        assert_eq!(keys, vec!["ADDR.0.TYPE", "ADDRESS"]);
    }

    #[test]
    fn test_purge_removes_only_consumed() {
        let mut env = MemoryEnv::from_entries(["APP_ADDR=localhost", "APP_PORT=8080", "HOME=/root"]);
        let mut store = KeyStore::new(env.list(), "APP_");
        store.get("ADDR");
        store.get("PORT");
        store.purge_consumed(&mut env).unwrap();
        assert_eq!(env.list(), vec!["HOME=/root".to_string()]);

        // idempotent
        store.purge_consumed(&mut env).unwrap();
        assert_eq!(env.list().len(), 1);
    }
}
