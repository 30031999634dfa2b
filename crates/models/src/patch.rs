//! Partial updates to an application's config vars

use crate::{ConfigError, ConfigResult, VarName, Vars};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A partial update: `Some(value)` sets a variable, `None` unsets it.
///
/// Serialized as a JSON object where `null` means unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch(BTreeMap<VarName, Option<String>>);

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch where an empty value means unset.
    ///
    /// This is the shape the public API accepts: `{"FOO": "bar", "BAZ": ""}`.
    pub fn from_legacy<I, K, V>(pairs: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(k, v)| {
                let value: String = v.into();
                let value = if value.is_empty() { None } else { Some(value) };
                Ok((VarName::new(k)?, value))
            })
            .collect::<ConfigResult<BTreeMap<_, _>>>()
            .map(Self)
    }

    /// Parse a legacy JSON body where both `""` and `null` mean unset
    pub fn from_legacy_json(json: &str) -> ConfigResult<Self> {
        let raw: BTreeMap<String, Option<String>> =
            serde_json::from_str(json).map_err(|e| ConfigError::InvalidPatch {
                reason: e.to_string(),
            })?;

        raw.into_iter()
            .map(|(k, v)| Ok((VarName::new(k)?, v.filter(|v| !v.is_empty()))))
            .collect::<ConfigResult<BTreeMap<_, _>>>()
            .map(Self)
    }

    pub fn set(mut self, name: VarName, value: impl Into<String>) -> Self {
        self.0.insert(name, Some(value.into()));
        self
    }

    pub fn unset(mut self, name: VarName) -> Self {
        self.0.insert(name, None);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VarName, &Option<String>)> {
        self.0.iter()
    }

    /// Names this patch removes
    pub fn tombstones(&self) -> impl Iterator<Item = &VarName> {
        self.0
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vars> for Patch {
    /// Legacy conversion: empty values become tombstones.
    fn from(vars: Vars) -> Self {
        vars.into_inner()
            .into_iter()
            .map(|(k, v)| if v.is_empty() { (k, None) } else { (k, Some(v)) })
            .collect()
    }
}

impl FromIterator<(VarName, Option<String>)> for Patch {
    fn from_iter<T: IntoIterator<Item = (VarName, Option<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_legacy_treats_empty_as_unset() {
        let patch = Patch::from_legacy([("A", "1"), ("B", "")]).unwrap();
        let tombstones: Vec<&str> = patch.tombstones().map(VarName::as_str).collect();
        assert_eq!(tombstones, vec!["B"]);
        assert_eq!(patch.len(), 2);
    }

    #[test]
    fn test_from_legacy_rejects_bad_names() {
        assert!(Patch::from_legacy([("BAD NAME", "x")]).is_err());
    }

    #[test]
    fn test_json_null_is_unset() {
        let patch: Patch = serde_json::from_str(r#"{"A":"1","B":null,"C":""}"#).unwrap();
        let expected = Patch::new()
            .set(VarName::new("A").unwrap(), "1")
            .unset(VarName::new("B").unwrap())
            .set(VarName::new("C").unwrap(), "");
        assert_eq!(patch, expected);
    }

    #[test]
    fn test_from_legacy_json_empty_and_null_unset() {
        let patch = Patch::from_legacy_json(r#"{"A":"1","B":"","C":null}"#).unwrap();
        let expected = Patch::new()
            .set(VarName::new("A").unwrap(), "1")
            .unset(VarName::new("B").unwrap())
            .unset(VarName::new("C").unwrap());
        assert_eq!(patch, expected);

        let tombstones: Vec<&str> = patch.tombstones().map(VarName::as_str).collect();
        assert_eq!(tombstones, vec!["B", "C"]);
    }

    #[test]
    fn test_from_legacy_json_rejects_bad_input() {
        assert!(matches!(
            Patch::from_legacy_json(r#"["A"]"#),
            Err(ConfigError::InvalidPatch { .. })
        ));
        assert!(matches!(
            Patch::from_legacy_json(r#"{"A": 1}"#),
            Err(ConfigError::InvalidPatch { .. })
        ));
        assert!(matches!(
            Patch::from_legacy_json(r#"{"BAD NAME": "x"}"#),
            Err(ConfigError::InvalidVarName { .. })
        ));
        assert!(Patch::from_legacy_json("{}").unwrap().is_empty());
    }

    #[test]
    fn test_from_vars_is_legacy_conversion() {
        let vars = Vars::try_from_pairs([("KEEP", "x"), ("DROP", "")]).unwrap();
        let patch = Patch::from(vars);
        let tombstones: Vec<&str> = patch.tombstones().map(VarName::as_str).collect();
        assert_eq!(tombstones, vec!["DROP"]);
    }
}
