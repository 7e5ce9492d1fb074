//! Per-node diagnostics collected during translation.

use std::fmt;

use serde::Serialize;
use surn_core::SurnError;

/// Category of a per-node failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnsupportedNodeKind,
    MalformedNode,
    /// The module panicked or returned an error outside the transform contract.
    ModuleFault,
}

/// A node that produced no output, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDiagnostic {
    /// Position of the node in its unit.
    pub index: usize,

    /// Node label (`surname::name`, or `<unnamed>`).
    pub node: String,

    /// Language of the module that rejected the node.
    pub module: String,

    pub kind: DiagnosticKind,

    pub message: String,
}

impl NodeDiagnostic {
    /// Builds a diagnostic from a transform error.
    pub fn from_error(index: usize, node: String, module: &str, error: &SurnError) -> Self {
        let kind = match error {
            SurnError::UnsupportedNodeKind { .. } => DiagnosticKind::UnsupportedNodeKind,
            SurnError::MalformedNode { .. } => DiagnosticKind::MalformedNode,
            _ => DiagnosticKind::ModuleFault,
        };

        Self {
            index,
            node,
            module: module.to_string(),
            kind,
            message: error.to_string(),
        }
    }

    /// Builds a diagnostic for a module call that did not return.
    pub fn fault(index: usize, node: String, module: &str, message: impl Into<String>) -> Self {
        Self {
            index,
            node,
            module: module.to_string(),
            kind: DiagnosticKind::ModuleFault,
            message: message.into(),
        }
    }
}

impl fmt::Display for NodeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: node #{} '{}': {}",
            self.module, self.index, self.node, self.message
        )
    }
}
