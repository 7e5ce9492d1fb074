//! In-process registry of loaded language modules.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use surn_core::{API_VERSION, AstNode, RegistrationDescriptor, TransformModule, Version};
use surn_php::PhpModule;

use crate::error::{PluginError, Result};

/// A module that registered successfully, together with its descriptor.
#[derive(Clone)]
pub struct LoadedModule {
    descriptor: RegistrationDescriptor,
    module: Arc<dyn TransformModule>,
}

impl LoadedModule {
    /// The descriptor the module reported at load time.
    pub fn descriptor(&self) -> &RegistrationDescriptor {
        &self.descriptor
    }

    /// The language name the module is registered under.
    pub fn name(&self) -> &str {
        &self.descriptor.lang_name
    }

    /// Shared handle to the module, usable from worker threads.
    pub fn module(&self) -> Arc<dyn TransformModule> {
        Arc::clone(&self.module)
    }

    /// Transforms a single node.
    pub fn transform(&self, node: &AstNode) -> surn_core::Result<String> {
        self.module.transform(node)
    }
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// A module that failed to load during [`ModuleRegistry::load_all`].
#[derive(Debug)]
pub struct LoadFailure {
    /// Position of the module in the input sequence.
    pub position: usize,

    /// Why it was rejected.
    pub error: PluginError,
}

/// Outcome of loading a batch of modules.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Language names of modules that loaded.
    pub loaded: Vec<String>,

    /// Modules that were rejected.
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    /// Returns true if every module loaded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Holds loaded modules keyed by language name.
pub struct ModuleRegistry {
    modules: HashMap<String, LoadedModule>,
    supported_api: Vec<u32>,
}

impl ModuleRegistry {
    /// Creates an empty registry accepting the current API version.
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            supported_api: vec![API_VERSION],
        }
    }

    /// Creates a registry with the built-in modules loaded.
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register_defaults()?;
        Ok(registry)
    }

    /// Sets the API versions this host accepts.
    pub fn with_supported_api_versions(mut self, versions: Vec<u32>) -> Self {
        self.supported_api = versions;
        self
    }

    /// Loads the built-in modules.
    pub fn register_defaults(&mut self) -> Result<()> {
        self.load(PhpModule::new())?;
        Ok(())
    }

    /// Loads a module, calling its `register` exactly once.
    pub fn load<M>(&mut self, module: M) -> Result<&LoadedModule>
    where
        M: TransformModule + 'static,
    {
        self.load_shared(Arc::new(module))
    }

    /// Loads an already shared module.
    pub fn load_shared(&mut self, module: Arc<dyn TransformModule>) -> Result<&LoadedModule> {
        let descriptor = panic::catch_unwind(AssertUnwindSafe(|| module.register()))
            .map_err(|payload| PluginError::RegistrationPanicked {
                message: panic_message(payload.as_ref()),
            })?
            .map_err(|source| PluginError::Registration { source })?;

        descriptor
            .validate()
            .map_err(|source| PluginError::InvalidDescriptor {
                module: descriptor.lang_name.clone(),
                source,
            })?;

        if !self.supported_api.contains(&descriptor.api_version) {
            return Err(PluginError::UnsupportedApi {
                module: descriptor.lang_name.clone(),
                api_version: descriptor.api_version,
                supported: self.supported_api.clone(),
            });
        }

        if self.modules.contains_key(&descriptor.lang_name) {
            return Err(PluginError::Duplicate(descriptor.lang_name));
        }

        tracing::info!(
            module = %descriptor.lang_name,
            version = %descriptor.lang_version,
            api = descriptor.api_version,
            "loaded module"
        );

        let name = descriptor.lang_name.clone();
        let loaded = LoadedModule { descriptor, module };
        let entry = self.modules.entry(name).or_insert(loaded);
        Ok(&*entry)
    }

    /// Loads several modules; a failing module is skipped and reported.
    pub fn load_all<I>(&mut self, modules: I) -> LoadReport
    where
        I: IntoIterator<Item = Arc<dyn TransformModule>>,
    {
        let mut report = LoadReport::default();

        for (position, module) in modules.into_iter().enumerate() {
            match self.load_shared(module) {
                Ok(loaded) => report.loaded.push(loaded.name().to_string()),
                Err(error) => {
                    tracing::warn!(position, %error, "skipping module");
                    report.failed.push(LoadFailure { position, error });
                }
            }
        }

        report
    }

    /// Gets a module by language name.
    pub fn get(&self, lang: &str) -> Option<&LoadedModule> {
        self.modules.get(lang)
    }

    /// Gets a module whose language version satisfies `required`.
    pub fn resolve(&self, lang: &str, required: &Version) -> Result<&LoadedModule> {
        let loaded = self
            .get(lang)
            .ok_or_else(|| PluginError::NotFound(lang.to_string()))?;

        if !loaded.descriptor.supports(required) {
            return Err(PluginError::IncompatibleVersion {
                module: lang.to_string(),
                declared: loaded.descriptor.lang_version,
                required: *required,
            });
        }

        Ok(loaded)
    }

    /// Removes a module.
    pub fn unload(&mut self, lang: &str) -> Option<LoadedModule> {
        self.modules.remove(lang)
    }

    /// Returns all registered language names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.modules.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.names())
            .field("supported_api", &self.supported_api)
            .finish()
    }
}
