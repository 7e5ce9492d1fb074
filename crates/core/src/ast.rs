//! AST nodes exchanged between the host parser and transform modules.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurnError};
use crate::version::Version;

/// The kind of syntactic unit a node represents.
///
/// Serialized as its integer tag. Tags outside the known set decode to
/// [`NodeKind::Unknown`] and are rejected by modules at transform time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum NodeKind {
    Statement,
    Expression,
    Macro,
    Unknown(u32),
}

impl NodeKind {
    /// Returns the integer tag for this kind.
    pub const fn tag(self) -> u32 {
        match self {
            Self::Statement => 1,
            Self::Expression => 2,
            Self::Macro => 3,
            Self::Unknown(tag) => tag,
        }
    }

    /// Maps an integer tag to a kind.
    pub const fn from_tag(tag: u32) -> Self {
        match tag {
            1 => Self::Statement,
            2 => Self::Expression,
            3 => Self::Macro,
            other => Self::Unknown(other),
        }
    }
}

impl From<u32> for NodeKind {
    fn from(tag: u32) -> Self {
        Self::from_tag(tag)
    }
}

impl From<NodeKind> for u32 {
    fn from(kind: NodeKind) -> Self {
        kind.tag()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Statement => f.write_str("statement"),
            Self::Expression => f.write_str("expression"),
            Self::Macro => f.write_str("macro"),
            Self::Unknown(tag) => write!(f, "unknown({})", tag),
        }
    }
}

/// A single syntactic unit handed to a module for transformation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AstNode {
    /// Node kind tag.
    pub kind: NodeKind,

    /// Primary identifier.
    pub name: String,

    /// Secondary identifier used to disambiguate nodes sharing a name.
    #[serde(default)]
    pub surname: String,

    /// Version of the construct this node was parsed as.
    pub version: Version,
}

impl AstNode {
    /// Creates a new node with an empty surname.
    pub fn new(kind: NodeKind, name: impl Into<String>, version: Version) -> Self {
        Self {
            kind,
            name: name.into(),
            surname: String::new(),
            version,
        }
    }

    /// Creates a statement node.
    pub fn statement(name: impl Into<String>, version: Version) -> Self {
        Self::new(NodeKind::Statement, name, version)
    }

    /// Creates an expression node.
    pub fn expression(name: impl Into<String>, version: Version) -> Self {
        Self::new(NodeKind::Expression, name, version)
    }

    /// Creates a macro node.
    pub fn macro_call(name: impl Into<String>, version: Version) -> Self {
        Self::new(NodeKind::Macro, name, version)
    }

    /// Sets the surname.
    pub fn with_surname(mut self, surname: impl Into<String>) -> Self {
        self.surname = surname.into();
        self
    }

    /// Checks the kind tag and required fields.
    pub fn validate(&self) -> Result<()> {
        if let NodeKind::Unknown(tag) = self.kind {
            return Err(SurnError::UnsupportedNodeKind {
                tag,
                node: self.label(),
            });
        }

        if self.name.is_empty() {
            return Err(SurnError::MalformedNode {
                kind: self.kind.to_string(),
                reason: "name is empty".to_string(),
            });
        }

        Ok(())
    }

    /// Human-readable label for diagnostics.
    pub fn label(&self) -> String {
        match (self.name.is_empty(), self.surname.is_empty()) {
            (true, _) => "<unnamed>".to_string(),
            (false, true) => self.name.clone(),
            (false, false) => format!("{}::{}", self.surname, self.name),
        }
    }
}

/// An ordered sequence of nodes translated together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub nodes: Vec<AstNode>,
}

impl TranslationUnit {
    /// Creates a unit from nodes in source order.
    pub fn new(nodes: Vec<AstNode>) -> Self {
        Self { nodes }
    }

    /// Loads a unit from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SurnError::Serialization(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parses a unit from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SurnError::Serialization(e.to_string()))
    }

    /// Converts the unit to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| SurnError::Serialization(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the names shared by two or more expression nodes.
    ///
    /// Expressions with these names need their surname to stay distinct.
    pub fn shared_expression_names(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in &self.nodes {
            if node.kind == NodeKind::Expression && !node.name.is_empty() {
                *counts.entry(node.name.as_str()).or_default() += 1;
            }
        }

        let mut shared: Vec<&str> = counts
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name)
            .collect();
        shared.sort_unstable();
        shared
    }
}
