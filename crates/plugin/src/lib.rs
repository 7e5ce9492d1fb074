//! Surn Plugin - Loading and lookup of language modules.
//!
//! Modules are linked in-process and handed to a [`ModuleRegistry`], which
//! calls their `register` operation once, checks the reported contract
//! version, and keeps one module per target language. A module that fails to
//! load is reported and skipped without affecting the others.

mod error;
mod registry;

pub use error::{PluginError, Result};
pub use registry::{LoadFailure, LoadReport, LoadedModule, ModuleRegistry};
