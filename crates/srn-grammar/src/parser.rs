//! SRN string parsing
//!
//! The grammar is a single anchored pattern over the whole canonicalized
//! string. The optional segments are nested inside each other, so the
//! contiguity rule (no thread without project, no topic without thread) is
//! enforced by the grammar itself, not by a secondary check. When the
//! pattern rejects a string, a segment-level diagnosis pass recovers the
//! precise error instead of a blanket format failure.

use crate::components::{validate_identifier, validate_workspace, SrnComponents, SRN_VERSION};
use crate::error::SrnError;
use crate::subject::SubjectType;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SRN_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^(?P<version>\d+)\.
        (?P<workspace>[a-f0-9]{32})\.
        (?P<subject_type>user|agent|workspace|contact|project|system)\.
        (?P<subject_id>[a-z0-9_-]{1,63})
        (?:\.proj_(?P<project>[a-z0-9_-]{1,63})
            (?:\.thr_(?P<thread>[a-z0-9_-]{1,63})
                (?:\.top_(?P<topic>[a-z0-9_-]{1,63}))?
            )?
        )?$",
    )
    .expect("SRN pattern is valid")
});

/// Canonicalize a raw SRN string: NFC-normalize, lowercase, trim
///
/// Canonicalization is idempotent: `canonicalize(canonicalize(s)?)` yields
/// the same string.
///
/// # Errors
/// Returns [`SrnError::InvalidFormat`] if the input is empty before or
/// after canonicalization.
pub fn canonicalize(raw: &str) -> Result<String, SrnError> {
    if raw.is_empty() {
        return Err(SrnError::InvalidFormat(
            "SRN string cannot be empty".to_string(),
        ));
    }
    let canonical: String = raw.nfc().collect::<String>().to_lowercase();
    let canonical = canonical.trim().to_string();
    if canonical.is_empty() {
        return Err(SrnError::InvalidFormat(
            "SRN string cannot be empty after canonicalization".to_string(),
        ));
    }
    Ok(canonical)
}

/// Parser for SRN strings
#[derive(Debug, Clone, Copy, Default)]
pub struct SrnParser;

impl SrnParser {
    /// Create a new parser instance
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse an SRN string into components
    ///
    /// The input is canonicalized first; only lowercase canonical forms are
    /// ever produced.
    ///
    /// # Errors
    /// - [`SrnError::InvalidFormat`] if the overall pattern does not match
    ///   (including unsupported versions and out-of-order segments)
    /// - [`SrnError::InvalidWorkspace`] for a bad workspace segment
    /// - [`SrnError::InvalidSubjectType`] for an unknown subject type
    /// - [`SrnError::InvalidIdentifier`] for a bad identifier segment
    pub fn parse(&self, raw: &str) -> Result<SrnComponents, SrnError> {
        let canonical = canonicalize(raw)?;

        let Some(caps) = SRN_PATTERN.captures(&canonical) else {
            return Err(diagnose(raw, &canonical));
        };

        let version = &caps["version"];
        if version != SRN_VERSION {
            return Err(SrnError::InvalidFormat(format!(
                "Invalid version '{version}'. Supported versions: {SRN_VERSION}"
            )));
        }

        let subject_type: SubjectType = caps["subject_type"].parse()?;

        SrnComponents::try_new(
            &caps["workspace"],
            subject_type,
            &caps["subject_id"],
            caps.name("project").map(|m| m.as_str().to_string()),
            caps.name("thread").map(|m| m.as_str().to_string()),
            caps.name("topic").map(|m| m.as_str().to_string()),
        )
    }

    /// Validate an SRN string without keeping the components
    ///
    /// # Errors
    /// Same taxonomy as [`SrnParser::parse`].
    pub fn validate(&self, raw: &str) -> Result<(), SrnError> {
        self.parse(raw).map(|_| ())
    }

    /// Canonical re-serialization of parsed components
    #[inline]
    #[must_use]
    pub fn to_string(&self, components: &SrnComponents) -> String {
        components.to_string()
    }
}

/// Recover the most specific error for a string the pattern rejected
fn diagnose(raw: &str, canonical: &str) -> SrnError {
    let segments: Vec<&str> = canonical.split('.').collect();
    if segments.len() < 4 {
        return SrnError::InvalidFormat(raw.to_string());
    }

    if segments[0].is_empty() || !segments[0].bytes().all(|b| b.is_ascii_digit()) {
        return SrnError::InvalidFormat(raw.to_string());
    }
    if let Err(err) = validate_workspace(segments[1]) {
        return err;
    }
    if let Err(err) = segments[2].parse::<SubjectType>() {
        return err;
    }
    if let Err(err) = validate_identifier(segments[3], "subject_id") {
        return err;
    }

    // Optional segments must appear as proj_, thr_, top_, in that order.
    let mut next_level = 0usize;
    for segment in &segments[4..] {
        let Some((level, field, value)) = split_optional(segment) else {
            return SrnError::InvalidFormat(raw.to_string());
        };
        if level != next_level {
            return SrnError::InvalidFormat(raw.to_string());
        }
        if let Err(err) = validate_identifier(value, field) {
            return err;
        }
        next_level = level + 1;
    }

    SrnError::InvalidFormat(raw.to_string())
}

fn split_optional(segment: &str) -> Option<(usize, &'static str, &str)> {
    if let Some(rest) = segment.strip_prefix("proj_") {
        Some((0, "project", rest))
    } else if let Some(rest) = segment.strip_prefix("thr_") {
        Some((1, "thread", rest))
    } else if let Some(rest) = segment.strip_prefix("top_") {
        Some((2, "topic", rest))
    } else {
        None
    }
}
