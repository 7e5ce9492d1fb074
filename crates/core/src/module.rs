//! The contract every language module implements.

use crate::ast::AstNode;
use crate::descriptor::RegistrationDescriptor;
use crate::error::Result;

/// Module contract revision implemented by this crate.
pub const API_VERSION: u32 = 1;

/// A unit that turns Surn AST nodes into source text for one target language.
///
/// Both operations are pure with respect to shared state, so a host may call
/// `transform` from several threads at once on independent nodes.
pub trait TransformModule: Send + Sync {
    /// Describes the module. Called once, when the host loads it.
    ///
    /// Fails only with [`crate::SurnError::ModuleIdentityUnavailable`].
    fn register(&self) -> Result<RegistrationDescriptor>;

    /// Renders one node as a fragment of target source.
    ///
    /// Must be deterministic. Fails with
    /// [`crate::SurnError::UnsupportedNodeKind`] or
    /// [`crate::SurnError::MalformedNode`].
    fn transform(&self, node: &AstNode) -> Result<String>;

    /// Renders a node whose name collides with another expression in the
    /// same unit, using its surname to keep it distinct.
    fn transform_qualified(&self, node: &AstNode) -> Result<String> {
        self.transform(node)
    }

    /// Text emitted once before the first fragment of a program.
    fn prologue(&self) -> String {
        String::new()
    }
}
