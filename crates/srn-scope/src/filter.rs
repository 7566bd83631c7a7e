//! Scope filter dictionaries
//!
//! A [`ScopeFilter`] is the deterministic mapping storage adapters use to
//! decide which records belong to a scope. It contains exactly the
//! mandatory fields plus whichever optional fields are present — never a
//! field with an absent value. Merged filters over several scopes may carry
//! multi-valued fields, serialized under a `field__in` key.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Workspace field name
pub const FIELD_WORKSPACE: &str = "workspace";
/// Subject type field name
pub const FIELD_SUBJECT_TYPE: &str = "subject_type";
/// Subject id field name
pub const FIELD_SUBJECT_ID: &str = "subject_id";
/// Project field name
pub const FIELD_PROJECT: &str = "project";
/// Thread field name
pub const FIELD_THREAD: &str = "thread";
/// Topic field name
pub const FIELD_TOPIC: &str = "topic";

/// All scope fields in canonical order
pub const SCOPE_FIELDS: [&str; 6] = [
    FIELD_WORKSPACE,
    FIELD_SUBJECT_TYPE,
    FIELD_SUBJECT_ID,
    FIELD_PROJECT,
    FIELD_THREAD,
    FIELD_TOPIC,
];

/// Suffix appended to multi-valued field names on serialization
pub const MULTI_VALUE_SUFFIX: &str = "__in";

/// A filter field value: one value, or a distinct set of alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// Exactly one value across all contributing scopes
    One(String),
    /// More than one distinct value, first-seen order
    Many(Vec<String>),
}

impl FilterValue {
    /// Whether this field carries alternatives
    #[inline]
    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Many(_))
    }

    /// All values, in order
    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &str> {
        match self {
            Self::One(v) => std::slice::from_ref(v).iter(),
            Self::Many(vs) => vs.iter(),
        }
        .map(String::as_str)
    }

    /// Whether the value set contains `candidate`
    #[inline]
    #[must_use]
    pub fn contains(&self, candidate: &str) -> bool {
        self.values().any(|v| v == candidate)
    }
}

/// Field-to-value mapping derived from one or more scopes
///
/// Field order follows insertion order, which for scope-derived filters is
/// the canonical field order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeFilter {
    entries: IndexMap<String, FilterValue>,
}

impl ScopeFilter {
    /// Create an empty filter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single-valued field
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.entries
            .insert(field.into(), FilterValue::One(value.into()));
    }

    /// Add a value to a field, promoting to multi-valued on a second
    /// distinct value; duplicates are dropped, first-seen order kept
    pub fn add_value(&mut self, field: &str, value: &str) {
        match self.entries.get_mut(field) {
            None => self.insert(field, value),
            Some(FilterValue::One(existing)) => {
                if existing != value {
                    let many = vec![existing.clone(), value.to_string()];
                    self.entries
                        .insert(field.to_string(), FilterValue::Many(many));
                }
            }
            Some(FilterValue::Many(values)) => {
                if !values.iter().any(|v| v == value) {
                    values.push(value.to_string());
                }
            }
        }
    }

    /// Look up a field
    #[inline]
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FilterValue> {
        self.entries.get(field)
    }

    /// Whether the filter constrains `field`
    #[inline]
    #[must_use]
    pub fn contains_field(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    /// Number of constrained fields
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no fields are constrained
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields and values in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a record satisfies every constrained field
    ///
    /// `lookup` resolves a field name to the record's value, if any. A
    /// record missing a constrained field does not match.
    pub fn matches<'a>(&self, lookup: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.iter()
            .all(|(field, value)| lookup(field).is_some_and(|v| value.contains(v)))
    }
}

impl Serialize for ScopeFilter {
    /// Serializes as `field: value` for single values and
    /// `field__in: [values]` for alternatives
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, value) in &self.entries {
            match value {
                FilterValue::One(v) => map.serialize_entry(field, v)?,
                FilterValue::Many(vs) => {
                    map.serialize_entry(&format!("{field}{MULTI_VALUE_SUFFIX}"), vs)?;
                }
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_and_get() {
        let mut filter = ScopeFilter::new();
        filter.insert(FIELD_WORKSPACE, "abc");
        assert_eq!(filter.get(FIELD_WORKSPACE), Some(&FilterValue::One("abc".into())));
        assert_eq!(filter.len(), 1);
    }

    #[test]
    fn add_value_promotes_to_many() {
        let mut filter = ScopeFilter::new();
        filter.add_value(FIELD_SUBJECT_ID, "john");
        filter.add_value(FIELD_SUBJECT_ID, "john");
        assert!(!filter.get(FIELD_SUBJECT_ID).unwrap().is_multi());

        filter.add_value(FIELD_SUBJECT_ID, "jane");
        filter.add_value(FIELD_SUBJECT_ID, "bob");
        filter.add_value(FIELD_SUBJECT_ID, "jane");
        let value = filter.get(FIELD_SUBJECT_ID).unwrap();
        assert_eq!(
            value.values().collect::<Vec<_>>(),
            vec!["john", "jane", "bob"]
        );
    }

    #[test]
    fn matches_requires_every_field() {
        let mut filter = ScopeFilter::new();
        filter.insert(FIELD_WORKSPACE, "abc");
        filter.insert(FIELD_SUBJECT_ID, "john");

        let record = [("workspace", "abc"), ("subject_id", "john"), ("extra", "x")];
        let lookup = |field: &str| {
            record
                .iter()
                .find(|(k, _)| *k == field)
                .map(|(_, v)| *v)
        };
        assert!(filter.matches(lookup));

        let wrong = [("workspace", "abc"), ("subject_id", "jane")];
        let lookup = |field: &str| wrong.iter().find(|(k, _)| *k == field).map(|(_, v)| *v);
        assert!(!filter.matches(lookup));

        let missing = [("workspace", "abc")];
        let lookup = |field: &str| missing.iter().find(|(k, _)| *k == field).map(|(_, v)| *v);
        assert!(!filter.matches(lookup));
    }

    #[test]
    fn serializes_multi_values_under_in_suffix() {
        let mut filter = ScopeFilter::new();
        filter.insert(FIELD_WORKSPACE, "abc");
        filter.add_value(FIELD_SUBJECT_ID, "john");
        filter.add_value(FIELD_SUBJECT_ID, "jane");

        let json = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "workspace": "abc",
                "subject_id__in": ["john", "jane"],
            })
        );
    }
}
