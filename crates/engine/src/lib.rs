//! Surn Engine - Translates units of AST nodes with a loaded module.

mod cache;
mod config;
mod diagnostic;
mod error;
mod translator;

pub use cache::{CacheEntry, FragmentCache};
pub use config::{TranslatorConfig, default_cache_dir};
pub use diagnostic::{DiagnosticKind, NodeDiagnostic};
pub use error::{EngineError, Result};
pub use translator::{TranslationReport, Translator};
