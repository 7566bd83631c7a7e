//! Storage-facing scope contracts
//!
//! Storage backends do not subclass anything; they go through
//! [`ScopeFilterable`] for the two things a backend needs from a scope: a
//! filter to select records and a partition key to locate data.
//! Record-level helpers cover tagging, stripping, and filtering the JSON
//! objects the knowledge store persists.

use crate::filter::{ScopeFilter, SCOPE_FIELDS};
use crate::scope::Scope;
use serde_json::{Map, Value};

/// Scope capabilities a storage backend composes by reference
pub trait ScopeFilterable {
    /// Filter dictionary selecting records that belong to this scope
    fn to_filter(&self) -> ScopeFilter;

    /// Slash-joined partition key for directory- or table-per-scope layouts
    ///
    /// `<workspace>/<subject_type>/<subject_id>[/proj_<p>][/thr_<t>][/top_<o>]`
    fn directory_key(&self) -> String;

    /// Colon-joined key prefix for flat KV namespaces
    fn scoped_key(&self, key: &str) -> String;
}

impl ScopeFilterable for Scope {
    fn to_filter(&self) -> ScopeFilter {
        Scope::to_filter(self)
    }

    fn directory_key(&self) -> String {
        let mut parts = vec![
            self.workspace().to_string(),
            self.subject_type().as_str().to_string(),
            self.subject_id().to_string(),
        ];
        if let Some(project) = self.project() {
            parts.push(format!("proj_{project}"));
        }
        if let Some(thread) = self.thread() {
            parts.push(format!("thr_{thread}"));
        }
        if let Some(topic) = self.topic() {
            parts.push(format!("top_{topic}"));
        }
        parts.join("/")
    }

    fn scoped_key(&self, key: &str) -> String {
        let mut prefix = format!(
            "{}:{}:{}",
            self.workspace(),
            self.subject_type(),
            self.subject_id()
        );
        if let Some(project) = self.project() {
            prefix.push_str(&format!(":proj_{project}"));
        }
        if let Some(thread) = self.thread() {
            prefix.push_str(&format!(":thr_{thread}"));
        }
        if let Some(topic) = self.topic() {
            prefix.push_str(&format!(":top_{topic}"));
        }
        format!("{prefix}:{key}")
    }
}

/// Add a scope's filter fields to a record
///
/// Returns a copy; the original record is untouched. Existing scope fields
/// are overwritten with the scope's values.
#[must_use]
pub fn tag_record(record: &Map<String, Value>, scope: &Scope) -> Map<String, Value> {
    let mut tagged = record.clone();
    for (field, value) in scope.to_filter().iter() {
        // Scope-derived filters are single-valued per field
        if let Some(v) = value.values().next() {
            tagged.insert(field.to_string(), Value::String(v.to_string()));
        }
    }
    tagged
}

/// Remove all scope fields from a record, returning the bare payload
#[must_use]
pub fn strip_scope_fields(record: &Map<String, Value>) -> Map<String, Value> {
    let mut clean = record.clone();
    for field in SCOPE_FIELDS {
        clean.remove(field);
    }
    clean
}

/// Select the records matching a scope's filter
#[must_use]
pub fn filter_records<'a>(
    records: &'a [Map<String, Value>],
    scope: &Scope,
) -> Vec<&'a Map<String, Value>> {
    let filter = scope.to_filter();
    records
        .iter()
        .filter(|record| filter.matches(|field| record.get(field).and_then(Value::as_str)))
        .collect()
}
