//! SRN Grammar & Validator
//!
//! Parsing, validation, and canonicalization of Scope Resource Name (SRN)
//! strings:
//!
//! `1.<ws32>.<subject_type>.<subject_id>[.proj_<p>][.thr_<t>][.top_<o>]`
//!
//! # Overview
//!
//! - **[`SrnParser`]**: canonicalize + parse + validate in one pass
//! - **[`SrnComponents`]**: immutable, always-valid component value object
//! - **[`SubjectType`]**: closed subject enumeration
//! - **[`SrnError`]**: error taxonomy with stable machine-readable codes
//!
//! # Example
//!
//! ```rust
//! use srn_grammar::{SrnParser, SubjectType};
//!
//! let parser = SrnParser::new();
//! let srn = "1.abc12345abcd12345abc1234567890ab.user.johndoe.proj_ai";
//! let components = parser.parse(srn).unwrap();
//!
//! assert_eq!(components.subject_type(), SubjectType::User);
//! assert_eq!(components.project(), Some("ai"));
//! assert_eq!(components.to_string(), srn);
//! ```

#![warn(missing_docs)]

pub mod components;
pub mod error;
pub mod parser;
pub mod subject;

// Re-exports
pub use components::{validate_identifier, validate_workspace, SrnComponents, MAX_IDENTIFIER_LEN, SRN_VERSION};
pub use error::SrnError;
pub use parser::{canonicalize, SrnParser};
pub use subject::SubjectType;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for SRN grammar operations
    pub use crate::{canonicalize, SrnComponents, SrnError, SrnParser, SubjectType};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
