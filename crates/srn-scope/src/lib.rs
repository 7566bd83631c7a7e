//! SRN Scope Model & Resolver
//!
//! Hierarchical scope value objects over parsed SRNs, plus the cross-scope
//! operations a multi-tenant knowledge store needs for partitioning.
//!
//! # Overview
//!
//! - **[`Scope`]**: validated SRN with parent/depth/filter operations
//! - **[`ScopeRef`]**: tagged "explicit scope or unscoped" parameter type
//! - **[`ScopeResolver`]**: inheritance chains, glob matching, common
//!   ancestors, filter merging, legacy workspace conversion
//! - **[`ScopeFilter`]**: deterministic field filters for storage adapters
//! - **[`ScopeFilterable`]**: the contract storage backends compose
//!
//! # Example
//!
//! ```rust
//! use srn_scope::{Scope, ScopeResolver};
//!
//! let scope: Scope = "1.abc12345abcd12345abc1234567890ab.user.john.proj_ai"
//!     .parse()
//!     .unwrap();
//! let chain = ScopeResolver::new().resolve_inheritance(&scope);
//!
//! assert_eq!(chain.len(), 2);
//! assert_eq!(chain[1].depth(), 0);
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod filter;
pub mod resolver;
pub mod scope;
pub mod storage;

// Re-exports
pub use error::ScopeError;
pub use filter::{FilterValue, ScopeFilter, MULTI_VALUE_SUFFIX, SCOPE_FIELDS};
pub use resolver::ScopeResolver;
pub use scope::{Scope, ScopeRef};
pub use storage::{filter_records, strip_scope_fields, tag_record, ScopeFilterable};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scope operations
    pub use crate::{
        FilterValue, Scope, ScopeError, ScopeFilter, ScopeFilterable, ScopeRef, ScopeResolver,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
