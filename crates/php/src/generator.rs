//! PHP code generation.

use surn_core::{
    API_VERSION, AstNode, NodeKind, RegistrationDescriptor, Result, SurnError, TextBuffer,
    TransformModule, Version,
};

use crate::LANG_NAME;

const OPEN_TAG: &str = "<?php";
const TERMINATOR: &str = ";";
const NAMESPACE_SEPARATOR: &str = "\\";
const MACRO_SIGIL: &str = "#";

/// Language module targeting PHP 8.
#[derive(Debug, Clone)]
pub struct PhpModule {
    lang_version: Version,
}

impl PhpModule {
    /// Creates a module targeting PHP 8.0.0.
    pub fn new() -> Self {
        Self {
            lang_version: Version::new(8, 0, 0),
        }
    }

    /// Targets a specific PHP release.
    pub fn with_lang_version(mut self, version: Version) -> Self {
        self.lang_version = version;
        self
    }

    fn render(&self, node: &AstNode, qualified: bool) -> Result<String> {
        node.validate()?;

        let mut out = TextBuffer::with_capacity(node.name.len() + node.surname.len() + 2);

        match node.kind {
            NodeKind::Statement => {
                out.append(&node.name).append(TERMINATOR);
            }
            NodeKind::Expression => {
                if qualified && !node.surname.is_empty() {
                    out.append(&node.surname).append(NAMESPACE_SEPARATOR);
                }
                out.append(&node.name);
            }
            NodeKind::Macro => {
                // Placeholder until macro expansion runs.
                out.append(MACRO_SIGIL).append(&node.name);
            }
            NodeKind::Unknown(tag) => {
                return Err(SurnError::UnsupportedNodeKind {
                    tag,
                    node: node.label(),
                });
            }
        }

        Ok(out.into_string())
    }
}

impl Default for PhpModule {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformModule for PhpModule {
    fn register(&self) -> Result<RegistrationDescriptor> {
        Ok(RegistrationDescriptor::new(
            LANG_NAME,
            format!("Support for PHP {}.x.x", self.lang_version.major),
            self.lang_version,
            API_VERSION,
        ))
    }

    fn transform(&self, node: &AstNode) -> Result<String> {
        self.render(node, false)
    }

    fn transform_qualified(&self, node: &AstNode) -> Result<String> {
        self.render(node, true)
    }

    fn prologue(&self) -> String {
        OPEN_TAG.to_string()
    }
}
