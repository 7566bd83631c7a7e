//! Cross-scope resolution
//!
//! [`ScopeResolver`] provides the operations that work over collections of
//! scopes: inheritance-chain resolution, glob pattern matching, common
//! ancestor computation, filter merging for multi-scope queries, and legacy
//! workspace conversion.

use crate::error::ScopeError;
use crate::filter::{ScopeFilter, SCOPE_FIELDS};
use crate::scope::Scope;
use srn_grammar::{validate_workspace, SrnComponents, SubjectType};
use std::collections::HashSet;
use wildmatch::WildMatch;

/// Resolver for scope inheritance and pattern matching
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeResolver;

impl ScopeResolver {
    /// Create a new resolver instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Inheritance chain for a scope, most specific first
    ///
    /// The scope itself, then each ancestor obtained by stripping the most
    /// specific optional field, ending at the base scope. Always exactly
    /// `depth + 1` elements.
    #[must_use]
    pub fn resolve_inheritance(&self, scope: &Scope) -> Vec<Scope> {
        let mut chain = vec![scope.clone()];
        let mut current = scope.clone();
        while let Some(parent) = current.parent() {
            chain.push(parent.clone());
            current = parent;
        }
        chain
    }

    /// Scopes whose canonical string matches a glob pattern (`*`, `?`)
    ///
    /// Input order is preserved; no dedup.
    #[must_use]
    pub fn find_matching(&self, pattern: &str, available: &[Scope]) -> Vec<Scope> {
        let matcher = WildMatch::new(pattern);
        available
            .iter()
            .filter(|scope| matcher.matches(scope.as_str()))
            .cloned()
            .collect()
    }

    /// Most specific ancestor shared by all scopes
    ///
    /// Computed as the maximum-depth element of the intersection of every
    /// scope's inheritance chain. A single-scope input returns that scope's
    /// direct parent, not the scope itself. Empty input returns `None`.
    #[must_use]
    pub fn common_parent(&self, scopes: &[Scope]) -> Option<Scope> {
        let (first, rest) = scopes.split_first()?;
        if rest.is_empty() {
            return first.parent();
        }

        let mut common: HashSet<Scope> = self.resolve_inheritance(first).into_iter().collect();
        for scope in rest {
            let ancestors: HashSet<Scope> =
                self.resolve_inheritance(scope).into_iter().collect();
            common.retain(|candidate| ancestors.contains(candidate));
            if common.is_empty() {
                return None;
            }
        }

        common.into_iter().max_by_key(Scope::depth)
    }

    /// Merge several scopes into one filter for multi-scope queries
    ///
    /// Per field, the distinct values across all scopes are collected in
    /// first-seen order; a field with one distinct value stays
    /// single-valued. A single-scope input returns that scope's plain
    /// filter unchanged.
    #[must_use]
    pub fn merge_filters(&self, scopes: &[Scope]) -> ScopeFilter {
        match scopes {
            [] => ScopeFilter::new(),
            [only] => only.to_filter(),
            many => {
                let mut merged = ScopeFilter::new();
                for field in SCOPE_FIELDS {
                    for scope in many {
                        if let Some(value) = scope_field(scope, field) {
                            merged.add_value(field, value);
                        }
                    }
                }
                merged
            }
        }
    }

    /// Convert a legacy flat workspace identifier into a base scope
    ///
    /// # Errors
    /// Returns [`ScopeError::ResolutionFailed`] unless the identifier is
    /// exactly 32 lowercase hex characters and the defaults form a valid
    /// base scope.
    pub fn from_legacy(
        &self,
        workspace: &str,
        default_subject_type: SubjectType,
        default_subject_id: &str,
    ) -> Result<Scope, ScopeError> {
        validate_workspace(workspace).map_err(|_| {
            ScopeError::ResolutionFailed(format!("invalid workspace format: {workspace}"))
        })?;
        let components =
            SrnComponents::base(workspace, default_subject_type, default_subject_id).map_err(
                |err| {
                    ScopeError::ResolutionFailed(format!(
                        "failed to create scope from workspace '{workspace}': {err}"
                    ))
                },
            )?;
        Ok(Scope::new(components))
    }

    /// Workspace identifier carried by a scope, for legacy consumers
    #[inline]
    #[must_use]
    pub fn extract_workspace<'a>(&self, scope: &'a Scope) -> &'a str {
        scope.workspace()
    }
}

fn scope_field<'a>(scope: &'a Scope, field: &str) -> Option<&'a str> {
    match field {
        "workspace" => Some(scope.workspace()),
        "subject_type" => Some(scope.subject_type().as_str()),
        "subject_id" => Some(scope.subject_id()),
        "project" => scope.project(),
        "thread" => scope.thread(),
        "topic" => scope.topic(),
        _ => None,
    }
}
