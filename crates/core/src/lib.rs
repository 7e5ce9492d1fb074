//! Surn Core - Types and module contract for the Surn transpiler.

mod ast;
mod buffer;
mod descriptor;
mod error;
mod format;
mod module;
mod version;

pub use ast::{AstNode, NodeKind, TranslationUnit};
pub use buffer::TextBuffer;
pub use descriptor::RegistrationDescriptor;
pub use error::{Result, SurnError};
pub use format::FormatOptions;
pub use module::{API_VERSION, TransformModule};
pub use version::Version;
