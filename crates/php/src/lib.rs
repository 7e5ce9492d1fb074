//! Surn PHP - Emits PHP 8 source from Surn AST nodes.

mod generator;

pub use generator::PhpModule;

/// Language name the PHP module registers under.
pub const LANG_NAME: &str = "php";
