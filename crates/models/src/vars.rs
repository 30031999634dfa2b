//! Environment variable names and resolved variable maps

use crate::{ConfigError, ConfigResult, Patch};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Name of an environment variable
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VarName(String);

impl VarName {
    /// Validate and wrap a variable name.
    ///
    /// The first character must be an ASCII letter or `_`; the rest may be
    /// ASCII alphanumerics, `_`, `.` or `-`.
    pub fn new(name: impl Into<String>) -> ConfigResult<Self> {
        let name = name.into();
        let invalid = |reason: &str| ConfigError::InvalidVarName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        let mut chars = name.chars();
        match chars.next() {
            None => return Err(invalid("name is empty")),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            Some(_) => return Err(invalid("must start with a letter or underscore")),
        }

        let allowed = |c: &char| c.is_ascii_alphanumeric() || matches!(*c, '_' | '.' | '-');
        if let Some(c) = chars.find(|c| !allowed(c)) {
            return Err(invalid(&format!("character {:?} is not allowed", c)));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VarName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for VarName {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for VarName {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VarName> for String {
    fn from(name: VarName) -> Self {
        name.0
    }
}

impl Borrow<str> for VarName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for VarName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A fully resolved set of environment variables.
///
/// `Vars` has no public mutators; [`Vars::merge`] returns a new map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vars(BTreeMap<VarName, String>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw string pairs, validating every name
    pub fn try_from_pairs<I, K, V>(pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| Ok((VarName::new(k)?, v.into())))
            .collect::<ConfigResult<BTreeMap<_, _>>>()
            .map(Self)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VarName, &String)> {
        self.0.iter()
    }

    /// Apply `patch` on top of these vars, producing a new map.
    ///
    /// Set entries override, tombstones remove, untouched keys pass through.
    pub fn merge(&self, patch: &Patch) -> Vars {
        let mut vars = self.0.clone();

        for (name, value) in patch.iter() {
            match value {
                Some(value) => {
                    vars.insert(name.clone(), value.clone());
                }
                None => {
                    vars.remove(name);
                }
            }
        }

        Vars(vars)
    }

    /// `NAME=value` lines in name order
    pub fn to_env_lines(&self) -> Vec<String> {
        self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect()
    }

    /// SHA-256 hex digest over the sorted `NAME=value` lines
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        for (name, value) in &self.0 {
            hasher.update(name.as_str().as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }

    pub fn into_inner(self) -> BTreeMap<VarName, String> {
        self.0
    }
}

impl From<BTreeMap<VarName, String>> for Vars {
    fn from(map: BTreeMap<VarName, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(VarName, String)> for Vars {
    fn from_iter<T: IntoIterator<Item = (VarName, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Vars {
    type Item = (&'a VarName, &'a String);
    type IntoIter = std::collections::btree_map::Iter<'a, VarName, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Merge `patch` into `base`, treating a missing base as empty
pub fn merge(base: Option<&Vars>, patch: &Patch) -> Vars {
    match base {
        Some(base) => base.merge(patch),
        None => Vars::default().merge(patch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vars {
        Vars::try_from_pairs(pairs.iter().copied()).unwrap()
    }

    fn legacy(pairs: &[(&str, &str)]) -> Patch {
        Patch::from_legacy(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_var_name_validation() {
        assert!(VarName::new("DATABASE_URL").is_ok());
        assert!(VarName::new("_private").is_ok());
        assert!(VarName::new("app.log-level").is_ok());

        assert!(VarName::new("").is_err());
        assert!(VarName::new("1PASSWORD").is_err());
        assert!(VarName::new("A=B").is_err());
        assert!(VarName::new("WITH SPACE").is_err());
        assert!(VarName::new("NUL\0").is_err());
    }

    #[test]
    fn test_var_name_deserialize_rejects_invalid() {
        let result: Result<VarName, _> = serde_json::from_str("\"9LIVES\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_merge_tombstone_removes_key() {
        let base = vars(&[("A", "1"), ("B", "2")]);
        let merged = base.merge(&legacy(&[("B", "")]));
        assert!(!merged.contains("B"));
        assert_eq!(merged.get("A"), Some("1"));

        // tombstone for a key that was never present
        let merged = base.merge(&legacy(&[("Z", "")]));
        assert!(!merged.contains("Z"));
        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_override() {
        let base = vars(&[("A", "1")]);
        let merged = base
            .merge(&legacy(&[("K", "v1")]))
            .merge(&legacy(&[("K", "v2")]));
        assert_eq!(merged.get("K"), Some("v2"));
        assert_eq!(merged.get("A"), Some("1"));
    }

    #[test]
    fn test_merge_identity() {
        let base = vars(&[("A", "1"), ("B", "2")]);
        assert_eq!(base.merge(&Patch::default()), base);
    }

    #[test]
    fn test_merge_leaves_inputs_untouched() {
        let base = vars(&[("A", "1"), ("B", "2")]);
        let patch = legacy(&[("A", "changed"), ("B", ""), ("C", "3")]);
        let base_before = base.clone();
        let patch_before = patch.clone();

        let merged = base.merge(&patch);

        assert_eq!(base, base_before);
        assert_eq!(patch, patch_before);
        assert_eq!(merged, vars(&[("A", "changed"), ("C", "3")]));
    }

    #[test]
    fn test_merge_with_missing_base() {
        let merged = merge(None, &legacy(&[("A", "1"), ("B", "")]));
        assert_eq!(merged, vars(&[("A", "1")]));
    }

    #[test]
    fn test_explicit_empty_value_is_kept() {
        let patch = Patch::default().set(VarName::new("EMPTY").unwrap(), "");
        let merged = Vars::default().merge(&patch);
        assert_eq!(merged.get("EMPTY"), Some(""));
    }

    #[test]
    fn test_checksum_is_order_independent_and_value_sensitive() {
        let a = Vars::try_from_pairs([("B", "2"), ("A", "1")]).unwrap();
        let b = Vars::try_from_pairs([("A", "1"), ("B", "2")]).unwrap();
        let c = Vars::try_from_pairs([("A", "1"), ("B", "3")]).unwrap();

        assert_eq!(a.checksum(), b.checksum());
        assert_ne!(a.checksum(), c.checksum());
        assert_eq!(a.checksum().len(), 64);
    }

    #[test]
    fn test_env_lines_sorted() {
        let v = vars(&[("ZED", "z"), ("ALPHA", "a")]);
        assert_eq!(v.to_env_lines(), vec!["ALPHA=a", "ZED=z"]);
    }
}
