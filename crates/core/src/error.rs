//! Error types for the Surn module contract.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for module contract operations.
pub type Result<T> = std::result::Result<T, SurnError>;

/// Errors a module, or the types it exchanges with the host, can report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SurnError {
    /// The module could not describe itself, so it cannot be loaded.
    #[error("Module identity unavailable: {reason}")]
    #[diagnostic(code(surn::register::identity_unavailable))]
    ModuleIdentityUnavailable { reason: String },

    /// The node carries a kind tag the module does not handle.
    #[error("Unsupported node kind {tag} for node '{node}'")]
    #[diagnostic(
        code(surn::transform::unsupported_node_kind),
        help("known kinds are 1 (statement), 2 (expression) and 3 (macro)")
    )]
    UnsupportedNodeKind { tag: u32, node: String },

    /// A required node field is missing or empty.
    #[error("Malformed {kind} node: {reason}")]
    #[diagnostic(code(surn::transform::malformed_node))]
    MalformedNode { kind: String, reason: String },

    #[error("Invalid version '{input}'")]
    #[diagnostic(
        code(surn::version::invalid),
        help("expected MAJOR[.MINOR[.PATCH]], for example 8.0.0")
    )]
    InvalidVersion { input: String },

    #[error("Invalid registration descriptor: {0}")]
    #[diagnostic(code(surn::register::invalid_descriptor))]
    InvalidDescriptor(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(surn::serde))]
    Serialization(String),
}

impl SurnError {
    /// Returns true when the host can skip the offending node and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SurnError::UnsupportedNodeKind { .. } | SurnError::MalformedNode { .. }
        )
    }
}
