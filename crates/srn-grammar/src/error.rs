//! Error types for SRN parsing and validation
//!
//! Every variant carries a stable machine-readable code so API layers can
//! map failures without matching on message text.

/// Errors raised while canonicalizing, parsing, or validating SRN strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SrnError {
    /// Overall string does not match the SRN grammar
    #[error("invalid SRN format: '{0}'")]
    InvalidFormat(String),

    /// Workspace segment is not a 128-bit hex identifier
    #[error("workspace must be exactly 32 lowercase hexadecimal characters, got: '{0}'")]
    InvalidWorkspace(String),

    /// Subject type is not in the closed enumeration
    #[error("invalid subject type '{0}'. Valid types: user, agent, workspace, contact, project, system")]
    InvalidSubjectType(String),

    /// An identifier segment violates the character-class or length rule
    #[error("{0}")]
    InvalidIdentifier(String),
}

impl SrnError {
    /// Stable machine-readable error code
    #[inline]
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat(_) => "INVALID_SRN_FORMAT",
            Self::InvalidWorkspace(_) => "INVALID_WORKSPACE",
            Self::InvalidSubjectType(_) => "INVALID_SUBJECT_TYPE",
            Self::InvalidIdentifier(_) => "INVALID_IDENTIFIER",
        }
    }

    /// Build the empty-identifier error with the conventional message
    #[inline]
    #[must_use]
    pub fn empty_identifier(identifier_type: &str) -> Self {
        Self::InvalidIdentifier(format!("{identifier_type} cannot be empty"))
    }

    /// Build the malformed-identifier error with the conventional message
    #[inline]
    #[must_use]
    pub fn bad_identifier(identifier_type: &str, value: &str) -> Self {
        Self::InvalidIdentifier(format!(
            "Invalid {identifier_type} '{value}'. Must be 1-63 characters, \
             containing only lowercase letters, numbers, underscore, and hyphen"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(SrnError::InvalidFormat("x".into()).code(), "INVALID_SRN_FORMAT");
        assert_eq!(SrnError::InvalidWorkspace("x".into()).code(), "INVALID_WORKSPACE");
        assert_eq!(SrnError::InvalidSubjectType("x".into()).code(), "INVALID_SUBJECT_TYPE");
        assert_eq!(SrnError::empty_identifier("project").code(), "INVALID_IDENTIFIER");
    }

    #[test]
    fn empty_identifier_message() {
        let err = SrnError::empty_identifier("subject_id");
        assert_eq!(err.to_string(), "subject_id cannot be empty");
    }
}
