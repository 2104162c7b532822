//! Snapshot of environment variables as seen by provider detection.
//!
//! Lookups treat an empty value the same as an unset one, so `FOO=` never
//! counts as "present" when a provider checks for it.

use std::collections::HashMap;
use std::ffi::OsString;

#[derive(Debug, Clone, Default)]
pub struct Envs {
    vars: HashMap<String, String>,
}

impl Envs {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self::from_os_pairs(std::env::vars_os())
    }

    /// Build from raw OS pairs; invalid UTF-8 becomes U+FFFD.
    pub fn from_os_pairs<I: IntoIterator<Item = (OsString, OsString)>>(pairs: I) -> Self {
        pairs
            .into_iter()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }

    /// Non-empty value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Owned non-empty value for `key`.
    pub fn string(&self, key: &str) -> Option<String> {
        self.get(key).map(str::to_owned)
    }

    /// First non-empty value among `keys`, in order.
    pub fn first(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|k| self.string(k))
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// True when `key` holds exactly `value`.
    pub fn equals(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Envs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_is_unset() {
        let envs: Envs = [("CI", ""), ("GITHUB_ACTIONS", "true")].into_iter().collect();
        assert!(!envs.is_set("CI"));
        assert!(envs.is_set("GITHUB_ACTIONS"));
        assert_eq!(envs.get("CI"), None);
    }

    #[test]
    fn test_first_skips_missing() {
        let envs: Envs = [("B", "two"), ("C", "three")].into_iter().collect();
        assert_eq!(envs.first(&["A", "B", "C"]), Some("two".to_string()));
        assert_eq!(envs.first(&["X"]), None);
    }

    #[test]
    fn test_equals_is_exact() {
        let envs: Envs = [("A", "True"), ("B", "")].into_iter().collect();
        assert!(envs.equals("A", "True"));
        assert!(!envs.equals("A", "true"));
        assert!(!envs.equals("B", ""));
    }

    #[test]
    fn test_from_process_reads_environment() {
        let envs = Envs::from_process();
        assert_eq!(envs.string("PATH"), std::env::var("PATH").ok().filter(|v| !v.is_empty()));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_values_do_not_panic() {
        use std::os::unix::ffi::OsStringExt;

        let envs = Envs::from_os_pairs([
            (OsString::from("CI"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![b'X', 0x80]), OsString::from("1")),
            (OsString::from("GITHUB_ACTIONS"), OsString::from("true")),
        ]);
        assert!(envs.is_set("CI"));
        assert_eq!(envs.get("CI"), Some("\u{fffd}\u{fffd}"));
        assert_eq!(envs.get("X\u{fffd}"), Some("1"));
        assert!(envs.equals("GITHUB_ACTIONS", "true"));
    }
}
