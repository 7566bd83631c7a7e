//! Scope value object
//!
//! A [`Scope`] wraps validated SRN components together with their canonical
//! string form and provides the pure hierarchy operations: parent
//! derivation, depth, direct-parent tests, and filter generation. Two
//! scopes are equal iff their canonical strings match.

use crate::error::ScopeError;
use crate::filter::{
    ScopeFilter, FIELD_PROJECT, FIELD_SUBJECT_ID, FIELD_SUBJECT_TYPE, FIELD_THREAD, FIELD_TOPIC,
    FIELD_WORKSPACE,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use srn_grammar::{SrnComponents, SrnParser, SubjectType};
use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A resolved, validated SRN with hierarchy operations
#[derive(Debug, Clone)]
pub struct Scope {
    components: SrnComponents,
    canonical: String,
}

impl Scope {
    /// Wrap parsed components into a scope
    #[must_use]
    pub fn new(components: SrnComponents) -> Self {
        let canonical = components.to_string();
        Self {
            components,
            canonical,
        }
    }

    /// Parse a raw SRN string into a scope
    ///
    /// # Errors
    /// Propagates the grammar error taxonomy unchanged.
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        let components = SrnParser::new().parse(raw)?;
        Ok(Self::new(components))
    }

    /// Underlying components
    #[inline]
    #[must_use]
    pub fn components(&self) -> &SrnComponents {
        &self.components
    }

    /// Canonical string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Workspace identifier
    #[inline]
    #[must_use]
    pub fn workspace(&self) -> &str {
        self.components.workspace()
    }

    /// Subject type
    #[inline]
    #[must_use]
    pub fn subject_type(&self) -> SubjectType {
        self.components.subject_type()
    }

    /// Subject identifier
    #[inline]
    #[must_use]
    pub fn subject_id(&self) -> &str {
        self.components.subject_id()
    }

    /// Project identifier, if present
    #[inline]
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.components.project()
    }

    /// Thread identifier, if present
    #[inline]
    #[must_use]
    pub fn thread(&self) -> Option<&str> {
        self.components.thread()
    }

    /// Topic identifier, if present
    #[inline]
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.components.topic()
    }

    /// Count of optional fields present (0 = base scope, 3 = topic scope)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.components.depth()
    }

    /// Immediate parent scope, stripping the most specific optional field
    ///
    /// Returns `None` for a base (depth-0) scope.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.components.without_most_specific().map(Self::new)
    }

    /// Whether this scope is the direct parent of `child`
    ///
    /// Direct means exactly one level apart; multi-level ancestry goes
    /// through inheritance-chain resolution. Irreflexive.
    #[must_use]
    pub fn is_parent_of(&self, child: &Scope) -> bool {
        child.parent().is_some_and(|parent| parent == *self)
    }

    /// Whether this scope is the direct child of `parent`
    #[inline]
    #[must_use]
    pub fn is_child_of(&self, parent: &Scope) -> bool {
        parent.is_parent_of(self)
    }

    /// Whether this scope matches `other` exactly
    #[inline]
    #[must_use]
    pub fn matches_scope(&self, other: &Scope) -> bool {
        self.canonical == other.canonical
    }

    /// Filter dictionary for storage queries
    ///
    /// Contains the mandatory fields plus whichever optional fields are
    /// present, in canonical field order.
    #[must_use]
    pub fn to_filter(&self) -> ScopeFilter {
        let mut filter = ScopeFilter::new();
        filter.insert(FIELD_WORKSPACE, self.workspace());
        filter.insert(FIELD_SUBJECT_TYPE, self.subject_type().as_str());
        filter.insert(FIELD_SUBJECT_ID, self.subject_id());
        if let Some(project) = self.project() {
            filter.insert(FIELD_PROJECT, project);
        }
        if let Some(thread) = self.thread() {
            filter.insert(FIELD_THREAD, thread);
        }
        if let Some(topic) = self.topic() {
            filter.insert(FIELD_TOPIC, topic);
        }
        filter
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl Display for Scope {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Scope {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<SrnComponents> for Scope {
    fn from(components: SrnComponents) -> Self {
        Self::new(components)
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for Scope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// A resolved scope parameter
///
/// Replaces "scope or string or nothing" call signatures: callers resolve
/// raw input to a `ScopeRef` once at the boundary, and everything below
/// works with the tagged form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScopeRef {
    /// An explicit, validated scope
    Explicit(Scope),
    /// No scope: legacy unpartitioned access
    #[default]
    Unscoped,
}

impl ScopeRef {
    /// The scope, if one is set
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Self::Explicit(scope) => Some(scope),
            Self::Unscoped => None,
        }
    }

    /// Whether a scope is set
    #[inline]
    #[must_use]
    pub fn is_scoped(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }

    /// Resolve a raw string into an explicit scope reference
    ///
    /// # Errors
    /// Propagates the grammar error taxonomy unchanged.
    pub fn parse(raw: &str) -> Result<Self, ScopeError> {
        Scope::parse(raw).map(Self::Explicit)
    }
}

impl From<Scope> for ScopeRef {
    fn from(scope: Scope) -> Self {
        Self::Explicit(scope)
    }
}

impl From<Option<Scope>> for ScopeRef {
    fn from(scope: Option<Scope>) -> Self {
        scope.map_or(Self::Unscoped, Self::Explicit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterValue;

    const WS: &str = "abc12345abcd12345abc1234567890ab";

    fn scope(srn: &str) -> Scope {
        Scope::parse(srn).unwrap()
    }

    fn full() -> Scope {
        scope(&format!("1.{WS}.user.johndoe.proj_ai.thr_chat.top_nlp"))
    }

    #[test]
    fn equality_is_canonical() {
        let a = scope(&format!("1.{WS}.user.john"));
        let b = scope(&format!("  1.{}.USER.JOHN ", WS.to_uppercase()));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), b.as_str());
    }

    #[test]
    fn parent_strips_most_specific_field() {
        let s = full();
        let p1 = s.parent().unwrap();
        assert_eq!(p1.as_str(), format!("1.{WS}.user.johndoe.proj_ai.thr_chat"));
        let p2 = p1.parent().unwrap();
        assert_eq!(p2.as_str(), format!("1.{WS}.user.johndoe.proj_ai"));
        let p3 = p2.parent().unwrap();
        assert_eq!(p3.as_str(), format!("1.{WS}.user.johndoe"));
        assert!(p3.parent().is_none());
    }

    #[test]
    fn depth_decreases_by_one_through_parents() {
        let mut current = full();
        while let Some(parent) = current.parent() {
            assert_eq!(parent.depth(), current.depth() - 1);
            current = parent;
        }
        assert_eq!(current.depth(), 0);
    }

    #[test]
    fn is_parent_of_direct_only() {
        let base = scope(&format!("1.{WS}.user.johndoe"));
        let proj = scope(&format!("1.{WS}.user.johndoe.proj_ai"));
        let thread = scope(&format!("1.{WS}.user.johndoe.proj_ai.thr_chat"));

        assert!(base.is_parent_of(&proj));
        assert!(proj.is_parent_of(&thread));
        assert!(thread.is_child_of(&proj));

        // Grandparent is not a direct parent
        assert!(!base.is_parent_of(&thread));
        // Irreflexive
        assert!(!proj.is_parent_of(&proj));
        // Not symmetric
        assert!(!proj.is_parent_of(&base));
    }

    #[test]
    fn is_parent_of_requires_matching_lineage() {
        let proj_a = scope(&format!("1.{WS}.user.johndoe.proj_ai"));
        let other_thread = scope(&format!("1.{WS}.user.johndoe.proj_ml.thr_chat"));
        assert!(!proj_a.is_parent_of(&other_thread));

        let other_subject = scope(&format!("1.{WS}.user.janedoe.proj_ai"));
        let base = scope(&format!("1.{WS}.user.johndoe"));
        assert!(!base.is_parent_of(&other_subject));
    }

    #[test]
    fn filter_contains_exactly_present_fields() {
        let base = scope(&format!("1.{WS}.user.johndoe"));
        let filter = base.to_filter();
        assert_eq!(filter.len(), 3);
        assert!(!filter.contains_field(FIELD_PROJECT));

        let filter = full().to_filter();
        assert_eq!(filter.len(), 6);
        assert_eq!(filter.get(FIELD_TOPIC), Some(&FilterValue::One("nlp".into())));
        let fields: Vec<_> = filter.iter().map(|(k, _)| k).collect();
        assert_eq!(
            fields,
            vec![
                FIELD_WORKSPACE,
                FIELD_SUBJECT_TYPE,
                FIELD_SUBJECT_ID,
                FIELD_PROJECT,
                FIELD_THREAD,
                FIELD_TOPIC
            ]
        );
    }

    #[test]
    fn serde_round_trip_as_canonical_string() {
        let s = full();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, format!("\"{}\"", s.as_str()));
        let back: Scope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn scope_ref_resolution() {
        let explicit = ScopeRef::parse(&format!("1.{WS}.user.john")).unwrap();
        assert!(explicit.is_scoped());
        assert_eq!(explicit.scope().unwrap().subject_id(), "john");

        let unscoped = ScopeRef::default();
        assert!(!unscoped.is_scoped());
        assert!(unscoped.scope().is_none());

        assert!(ScopeRef::parse("garbage").is_err());
    }
}
