//! Error types for scope resolution

use srn_grammar::SrnError;

/// Errors raised while building or resolving scopes
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScopeError {
    /// Underlying grammar failure
    #[error(transparent)]
    Grammar(#[from] SrnError),

    /// Scope resolution or legacy conversion failed
    #[error("scope resolution failed: {0}")]
    ResolutionFailed(String),
}

impl ScopeError {
    /// Stable machine-readable error code
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Grammar(err) => err.code(),
            Self::ResolutionFailed(_) => "SCOPE_RESOLUTION_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_errors_keep_their_code() {
        let err: ScopeError = SrnError::InvalidWorkspace("x".into()).into();
        assert_eq!(err.code(), "INVALID_WORKSPACE");
    }

    #[test]
    fn resolution_code() {
        assert_eq!(
            ScopeError::ResolutionFailed("bad".into()).code(),
            "SCOPE_RESOLUTION_ERROR"
        );
    }
}
