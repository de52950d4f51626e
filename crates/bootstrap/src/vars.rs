//! Package-scoped variable store with one-pass `$name` substitution.
//!
//! Variables are plain strings. Substitution order is the insertion order of
//! the store, so the result is deterministic for a given configuration.
//! Substituted values are never re-scanned for further `$name` tokens.

use serde::{Deserialize, Serialize};

/// Key under which the home directory is stored for tilde expansion.
pub const HOMEDIR_VAR: &str = "homedir";

/// Key under which the current user name is stored.
pub const USERNAME_VAR: &str = "username";

/// String-keyed variable store that preserves insertion order.
///
/// Backed by a `Vec` of pairs rather than a hash map: the stores are small
/// (a handful of entries per package) and substitution semantics depend on
/// a stable iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarStore {
    entries: Vec<(String, String)>,
}

impl VarStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables in the store
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a variable by name
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Check if a variable exists
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Set a variable, returning the previous value if it existed.
    ///
    /// Updating an existing key keeps its original position in the
    /// substitution order.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(std::mem::replace(&mut entry.1, value))
        } else {
            self.entries.push((key, value));
            None
        }
    }

    /// Set a variable only if it is not already present.
    ///
    /// Used when injecting global variables into a package: package-local
    /// declarations win on conflict.
    pub fn set_default(&mut self, key: &str, value: &str) {
        if !self.contains(key) {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    /// Copy every variable from `other` that this store does not define yet.
    pub fn merge_defaults(&mut self, other: &VarStore) {
        for (key, value) in &other.entries {
            self.set_default(key, value);
        }
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Expand `~` and `$name` tokens in `input`.
    ///
    /// The literal `~` is replaced with the `homedir` value first, then every
    /// `$<name>` occurrence is replaced per variable in insertion order.
    /// A single pass only: values containing further `$<name>` tokens are
    /// left as-is.
    pub fn expand(&self, input: &str) -> String {
        let mut result = if let Some(home) = self.get(HOMEDIR_VAR) {
            input.replace('~', home)
        } else {
            input.to_string()
        };

        for (key, value) in &self.entries {
            result = result.replace(&format!("${key}"), value);
        }

        result
    }
}

impl FromIterator<(String, String)> for VarStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (key, value) in iter {
            store.set(key, value);
        }
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(pairs: &[(&str, &str)]) -> VarStore {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_set_and_get() {
        let mut vars = VarStore::new();
        assert_eq!(vars.set("editor", "hx"), None);
        assert_eq!(vars.get("editor"), Some("hx"));
        assert_eq!(vars.set("editor", "vim"), Some("hx".to_string()));
        assert_eq!(vars.get("editor"), Some("vim"));
        assert_eq!(vars.len(), 1);
    }

    #[test]
    fn test_set_default_does_not_overwrite() {
        let mut vars = store(&[("user", "alice")]);
        vars.set_default("user", "bob");
        vars.set_default("shell", "zsh");
        assert_eq!(vars.get("user"), Some("alice"));
        assert_eq!(vars.get("shell"), Some("zsh"));
    }

    #[test]
    fn test_merge_defaults_local_wins() {
        let mut local = store(&[("target", "/opt/custom")]);
        let globals = store(&[("target", "/usr/local"), ("username", "alice")]);
        local.merge_defaults(&globals);
        assert_eq!(local.get("target"), Some("/opt/custom"));
        assert_eq!(local.get("username"), Some("alice"));
    }

    #[test]
    fn test_expand_simple_variable() {
        let vars = store(&[("name", "world")]);
        assert_eq!(vars.expand("hello $name"), "hello world");
    }

    #[test]
    fn test_expand_tilde_before_variables() {
        let vars = store(&[("homedir", "/home/alice"), ("dir", "config")]);
        assert_eq!(vars.expand("~/.config/$dir"), "/home/alice/.config/config");
    }

    #[test]
    fn test_expand_without_homedir_leaves_tilde() {
        let vars = store(&[("dir", "config")]);
        assert_eq!(vars.expand("~/$dir"), "~/config");
    }

    #[test]
    fn test_expand_is_single_pass() {
        // A value containing another token is not re-expanded.
        let vars = store(&[("outer", "$inner"), ("inner", "deep")]);
        assert_eq!(vars.expand("$outer"), "$inner");
    }

    #[test]
    fn test_expand_insertion_order() {
        // "$repo" is replaced before "$repodir" gets a chance to match.
        let vars = store(&[("repo", "dotfiles"), ("repodir", "/src")]);
        assert_eq!(vars.expand("$repodir"), "dotfilesdir");
    }

    #[test]
    fn test_expand_unknown_variable_untouched() {
        let vars = store(&[("known", "x")]);
        assert_eq!(vars.expand("$unknown stays"), "$unknown stays");
    }
}
