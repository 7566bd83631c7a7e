//! Subject type enumeration
//!
//! The subject identifies who or what a scope belongs to. The set is closed;
//! anything outside it is rejected at parse time.

use crate::error::SrnError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Valid subject types for an SRN
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    /// Human user
    User,
    /// Autonomous agent
    Agent,
    /// Whole-workspace subject
    Workspace,
    /// External contact
    Contact,
    /// Project-level subject
    Project,
    /// System/internal subject
    System,
}

impl SubjectType {
    /// All valid subject types, in canonical order
    pub const ALL: [SubjectType; 6] = [
        Self::User,
        Self::Agent,
        Self::Workspace,
        Self::Contact,
        Self::Project,
        Self::System,
    ];

    /// Canonical lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
            Self::Workspace => "workspace",
            Self::Contact => "contact",
            Self::Project => "project",
            Self::System => "system",
        }
    }
}

impl Display for SubjectType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectType {
    type Err = SrnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "agent" => Ok(Self::Agent),
            "workspace" => Ok(Self::Workspace),
            "contact" => Ok(Self::Contact),
            "project" => Ok(Self::Project),
            "system" => Ok(Self::System),
            other => Err(SrnError::InvalidSubjectType(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for ty in SubjectType::ALL {
            assert_eq!(ty.as_str().parse::<SubjectType>().unwrap(), ty);
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "robot".parse::<SubjectType>().unwrap_err();
        assert_eq!(err.code(), "INVALID_SUBJECT_TYPE");
    }

    #[test]
    fn rejects_uppercase() {
        // Case folding happens during canonicalization, not here
        assert!("User".parse::<SubjectType>().is_err());
    }

    #[test]
    fn serde_uses_lowercase() {
        let json = serde_json::to_string(&SubjectType::Agent).unwrap();
        assert_eq!(json, "\"agent\"");
    }
}
