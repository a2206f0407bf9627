//! Literal text/link substitution.
//!
//! Rules are applied one after another in map order, each replacing every
//! occurrence of its pattern. A later rule sees the output of earlier rules.

use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/// Insertion-ordered `pattern -> replacement` map.
///
/// Re-inserting a pattern overwrites its replacement in place; the entry keeps
/// its original position. (De)serializes as a JSON object in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuleMap {
    entries: Vec<(String, String)>,
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a rule. Returns the previous replacement, if any.
    pub fn insert(
        &mut self,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Option<String> {
        let pattern = pattern.into();
        let replacement = replacement.into();
        match self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            Some((_, existing)) => Some(std::mem::replace(existing, replacement)),
            None => {
                self.entries.push((pattern, replacement));
                None
            }
        }
    }

    pub fn get(&self, pattern: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, r)| r.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(p, r)| (p.as_str(), r.as_str()))
    }

    /// Merge `other` into `self` with last-write-wins on collisions.
    pub fn extend_from(&mut self, other: &RuleMap) {
        for (pattern, replacement) in other.iter() {
            self.insert(pattern, replacement);
        }
    }
}

impl<P: Into<String>, R: Into<String>> FromIterator<(P, R)> for RuleMap {
    fn from_iter<I: IntoIterator<Item = (P, R)>>(iter: I) -> Self {
        let mut map = RuleMap::new();
        for (p, r) in iter {
            map.insert(p, r);
        }
        map
    }
}

impl Serialize for RuleMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (p, r) in &self.entries {
            map.serialize_entry(p, r)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RuleMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleMapVisitor;

        impl<'de> Visitor<'de> for RuleMapVisitor {
            type Value = RuleMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of string replacements")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RuleMap, A::Error> {
                let mut map = RuleMap::new();
                while let Some((p, r)) = access.next_entry::<String, String>()? {
                    map.insert(p, r);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(RuleMapVisitor)
    }
}

/// Rewrite `text` with every rule in `rules`, in order.
///
/// Empty patterns are skipped: a literal empty match would splice the
/// replacement between every character.
pub fn apply_rules(text: &str, rules: &RuleMap) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = text.to_string();
    for (pattern, replacement) in rules.iter() {
        if pattern.is_empty() || !out.contains(pattern) {
            continue;
        }
        out = out.replace(pattern, replacement);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(pairs: &[(&str, &str)]) -> RuleMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn replaces_every_occurrence() {
        let r = rules(&[("foo", "bar")]);
        assert_eq!(apply_rules("foo baz foo", &r), "bar baz bar");
    }

    #[test]
    fn does_not_reapply_a_rule_to_its_own_output() {
        let r = rules(&[("a", "aa")]);
        assert_eq!(apply_rules("a", &r), "aa");
    }

    #[test]
    fn later_rules_see_earlier_output() {
        let r = rules(&[("cat", "dog"), ("dog", "wolf")]);
        assert_eq!(apply_rules("cat and dog", &r), "wolf and wolf");

        let reversed = rules(&[("dog", "wolf"), ("cat", "dog")]);
        assert_eq!(apply_rules("cat and dog", &reversed), "dog and wolf");
    }

    #[test]
    fn literal_not_regex() {
        let r = rules(&[("a.c", "X"), ("(", "[")]);
        assert_eq!(apply_rules("abc a.c (x)", &r), "abc X [x)");
    }

    #[test]
    fn stable_once_rules_are_cleared() {
        let r = rules(&[("http://old.example", "https://new.example"), ("@old", "@new")]);
        for t in ["", "plain", "see http://old.example @old", "@old@old"] {
            let once = apply_rules(t, &r);
            assert_eq!(apply_rules(&once, &RuleMap::new()), once);
        }
    }

    #[test]
    fn empty_input_and_empty_pattern_are_noops() {
        let r = rules(&[("", "x"), ("q", "z")]);
        assert_eq!(apply_rules("", &r), "");
        assert_eq!(apply_rules("abc", &r), "abc");
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut r = rules(&[("a", "1"), ("b", "2")]);
        assert_eq!(r.insert("a", "3"), Some("1".to_string()));
        let order: Vec<_> = r.iter().collect();
        assert_eq!(order, vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn json_keeps_document_order() {
        let r: RuleMap = serde_json::from_str(r#"{"z":"1","a":"2","m":"3"}"#).unwrap();
        let keys: Vec<_> = r.iter().map(|(p, _)| p).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(serde_json::to_string(&r).unwrap(), r#"{"z":"1","a":"2","m":"3"}"#);
    }
}
