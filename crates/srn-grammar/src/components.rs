//! Parsed SRN components
//!
//! [`SrnComponents`] is the immutable value object behind every scope. The
//! four mandatory fields are always present; the optional fields form a
//! contiguous prefix-extension (no thread without project, no topic without
//! thread). Construction goes through [`SrnComponents::try_new`] or the
//! parser, so an instance in hand is always valid.

use crate::error::SrnError;
use crate::subject::SubjectType;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Only SRN version currently understood
pub const SRN_VERSION: &str = "1";

/// Maximum length of any identifier segment
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Validate a workspace segment (exactly 32 lowercase hex characters)
///
/// # Errors
/// Returns [`SrnError::InvalidWorkspace`] on any violation.
pub fn validate_workspace(workspace: &str) -> Result<(), SrnError> {
    if workspace.len() == 32 && workspace.bytes().all(|b| b.is_ascii_hexdigit() && !b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(SrnError::InvalidWorkspace(workspace.to_string()))
    }
}

/// Validate an identifier segment (`[a-z0-9_-]{1,63}`)
///
/// `identifier_type` names the field ("subject_id", "project", ...) in the
/// error message.
///
/// # Errors
/// Returns [`SrnError::InvalidIdentifier`] on any violation; the empty
/// string is reported as "cannot be empty".
pub fn validate_identifier(identifier: &str, identifier_type: &str) -> Result<(), SrnError> {
    if identifier.is_empty() {
        return Err(SrnError::empty_identifier(identifier_type));
    }
    let ok = identifier.len() <= MAX_IDENTIFIER_LEN
        && identifier
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    if ok {
        Ok(())
    } else {
        Err(SrnError::bad_identifier(identifier_type, identifier))
    }
}

/// Parsed components of an SRN string
///
/// Deserialization goes through the same validation as [`SrnComponents::try_new`],
/// so a deserialized instance is as valid as a parsed one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawComponents")]
pub struct SrnComponents {
    version: String,
    workspace: String,
    subject_type: SubjectType,
    subject_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<String>,
}

/// Unvalidated wire form; only exists as the deserialization intermediary
#[derive(Deserialize)]
struct RawComponents {
    version: String,
    workspace: String,
    subject_type: SubjectType,
    subject_id: String,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    thread: Option<String>,
    #[serde(default)]
    topic: Option<String>,
}

impl TryFrom<RawComponents> for SrnComponents {
    type Error = SrnError;

    fn try_from(raw: RawComponents) -> Result<Self, Self::Error> {
        if raw.version != SRN_VERSION {
            return Err(SrnError::InvalidFormat(format!(
                "Invalid version '{}'. Supported versions: {SRN_VERSION}",
                raw.version
            )));
        }
        Self::try_new(
            raw.workspace,
            raw.subject_type,
            raw.subject_id,
            raw.project,
            raw.thread,
            raw.topic,
        )
    }
}

impl SrnComponents {
    /// Construct a base (depth-0) component set
    ///
    /// # Errors
    /// Returns an error if the workspace or subject id is invalid.
    pub fn base(
        workspace: impl Into<String>,
        subject_type: SubjectType,
        subject_id: impl Into<String>,
    ) -> Result<Self, SrnError> {
        Self::try_new(workspace, subject_type, subject_id, None, None, None)
    }

    /// Construct a fully specified component set
    ///
    /// Enforces the contiguity invariant: `thread` requires `project`,
    /// `topic` requires `thread`.
    ///
    /// # Errors
    /// Returns [`SrnError::InvalidFormat`] on a contiguity violation and the
    /// segment-specific errors on field violations.
    pub fn try_new(
        workspace: impl Into<String>,
        subject_type: SubjectType,
        subject_id: impl Into<String>,
        project: Option<String>,
        thread: Option<String>,
        topic: Option<String>,
    ) -> Result<Self, SrnError> {
        let workspace = workspace.into();
        let subject_id = subject_id.into();

        validate_workspace(&workspace)?;
        validate_identifier(&subject_id, "subject_id")?;
        if let Some(project) = project.as_deref() {
            validate_identifier(project, "project")?;
        }
        if let Some(thread) = thread.as_deref() {
            validate_identifier(thread, "thread")?;
        }
        if let Some(topic) = topic.as_deref() {
            validate_identifier(topic, "topic")?;
        }

        if thread.is_some() && project.is_none() {
            return Err(SrnError::InvalidFormat(
                "thread requires a project".to_string(),
            ));
        }
        if topic.is_some() && thread.is_none() {
            return Err(SrnError::InvalidFormat(
                "topic requires a thread".to_string(),
            ));
        }

        Ok(Self {
            version: SRN_VERSION.to_string(),
            workspace,
            subject_type,
            subject_id,
            project,
            thread,
            topic,
        })
    }

    /// SRN version
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Workspace identifier (32 lowercase hex characters)
    #[inline]
    #[must_use]
    pub fn workspace(&self) -> &str {
        &self.workspace
    }

    /// Subject type
    #[inline]
    #[must_use]
    pub fn subject_type(&self) -> SubjectType {
        self.subject_type
    }

    /// Subject identifier
    #[inline]
    #[must_use]
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Project identifier, if present
    #[inline]
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Thread identifier, if present
    #[inline]
    #[must_use]
    pub fn thread(&self) -> Option<&str> {
        self.thread.as_deref()
    }

    /// Topic identifier, if present
    #[inline]
    #[must_use]
    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    /// Count of optional fields present (0-3)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        usize::from(self.project.is_some())
            + usize::from(self.thread.is_some())
            + usize::from(self.topic.is_some())
    }

    /// Components with the most specific optional field removed
    ///
    /// Returns `None` for a base (depth-0) component set.
    #[must_use]
    pub fn without_most_specific(&self) -> Option<Self> {
        let mut parent = self.clone();
        if parent.topic.take().is_some() {
            return Some(parent);
        }
        if parent.thread.take().is_some() {
            return Some(parent);
        }
        if parent.project.take().is_some() {
            return Some(parent);
        }
        None
    }
}

impl Display for SrnComponents {
    /// Canonical re-serialization with fixed field order
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.version, self.workspace, self.subject_type, self.subject_id
        )?;
        if let Some(project) = &self.project {
            write!(f, ".proj_{project}")?;
        }
        if let Some(thread) = &self.thread {
            write!(f, ".thr_{thread}")?;
        }
        if let Some(topic) = &self.topic {
            write!(f, ".top_{topic}")?;
        }
        Ok(())
    }
}
