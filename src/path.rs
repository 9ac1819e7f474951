//! Key path construction.
//!
//! A key path joins segments with `.`: uppercased field names, uppercased map
//! keys and decimal sequence indices. The root path is the empty string.

pub(crate) const SEPARATOR: char = '.';

/// Appends `segment` to `path`.
pub(crate) fn child(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        let mut key = String::with_capacity(path.len() + segment.len() + 1);
        key.push_str(path);
        key.push(SEPARATOR);
        key.push_str(segment);
        key
    }
}

/// Appends an uppercased field name or map key to `path`.
pub(crate) fn named(path: &str, name: &str) -> String {
    child(path, &name.to_uppercase())
}

pub(crate) fn indexed(path: &str, index: usize) -> String {
    child(path, &index.to_string())
}

/// The prefix every key strictly below `path` starts with.
pub(crate) fn descendants(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        let mut prefix = path.to_string();
        prefix.push(SEPARATOR);
        prefix
    }
}

/// Fields whose name starts with an underscore are internal and never
/// transcoded.
pub(crate) fn is_internal(name: &str) -> bool {
    name.starts_with('_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_uppercases_only_the_new_segment() {
        assert_eq!(named("", "port_name"), "PORT_NAME");
        assert_eq!(named("ADDR.0", "street"), "ADDR.0.STREET");
    }

    #[test]
    fn test_indexed_and_descendants() {
        assert_eq!(indexed("ARRLIST", 2), "ARRLIST.2");
        assert_eq!(descendants("ARRLIST.2"), "ARRLIST.2.");
        assert_eq!(descendants(""), "");
    }

    #[test]
    fn test_internal_fields() {
        assert!(is_internal("_cache"));
        assert!(!is_internal("name"));
    }
}
