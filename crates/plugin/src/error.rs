//! Plugin error types.

use miette::Diagnostic;
use surn_core::{SurnError, Version};
use thiserror::Error;

/// Error type for module loading and lookup.
#[derive(Debug, Error, Diagnostic)]
pub enum PluginError {
    /// The module could not describe itself.
    #[error("Module registration failed: {source}")]
    #[diagnostic(code(surn::plugin::registration))]
    Registration { source: SurnError },

    /// The module panicked while describing itself.
    #[error("Module registration panicked: {message}")]
    #[diagnostic(code(surn::plugin::registration_panicked))]
    RegistrationPanicked { message: String },

    /// The module described itself with an invalid descriptor.
    #[error("Module '{module}' returned an invalid descriptor: {source}")]
    #[diagnostic(code(surn::plugin::invalid_descriptor))]
    InvalidDescriptor { module: String, source: SurnError },

    /// The module implements a contract revision this host does not know.
    #[error("Module '{module}' implements API version {api_version}, supported: {supported:?}")]
    #[diagnostic(
        code(surn::plugin::unsupported_api),
        help("rebuild the module against a supported surn-core release")
    )]
    UnsupportedApi {
        module: String,
        api_version: u32,
        supported: Vec<u32>,
    },

    /// A module for the same language is already loaded.
    #[error("A module for '{0}' is already registered")]
    #[diagnostic(code(surn::plugin::duplicate))]
    Duplicate(String),

    /// No module is loaded for the language.
    #[error("No module registered for language '{0}'")]
    #[diagnostic(code(surn::plugin::not_found))]
    NotFound(String),

    /// The loaded module targets an incompatible language version.
    #[error("Module '{module}' targets version {declared}, incompatible with required {required}")]
    #[diagnostic(code(surn::plugin::incompatible_version))]
    IncompatibleVersion {
        module: String,
        declared: Version,
        required: Version,
    },
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
