//! Concurrent translation of whole units.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use surn_core::{NodeKind, TextBuffer, TranslationUnit};
use surn_plugin::LoadedModule;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};

use crate::cache::FragmentCache;
use crate::config::TranslatorConfig;
use crate::diagnostic::NodeDiagnostic;
use crate::error::{EngineError, Result};

/// Translates units of AST nodes with a single module.
pub struct Translator {
    /// The module producing fragments.
    module: LoadedModule,

    /// Translation settings.
    config: TranslatorConfig,

    /// Fragment cache, present when caching is enabled.
    cache: Option<FragmentCache>,
}

/// Translation report.
#[derive(Debug)]
pub struct TranslationReport {
    /// The composed program text.
    pub output: String,

    /// Number of nodes that produced a fragment.
    pub emitted: usize,

    /// Number of fragments served from the cache.
    pub cached: usize,

    /// Nodes that were skipped, in source order.
    pub diagnostics: Vec<NodeDiagnostic>,

    /// Set when new fragments could not be written to the cache.
    pub cache_error: Option<String>,

    /// Total translation time in milliseconds.
    pub duration_ms: u64,
}

impl TranslationReport {
    /// Returns true if every node produced a fragment.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

type Outcome = std::result::Result<surn_core::Result<String>, JoinError>;

impl Translator {
    /// Creates a new translator.
    pub fn new(module: LoadedModule, config: TranslatorConfig) -> Result<Self> {
        let cache = if config.use_cache {
            Some(FragmentCache::new(&config.cache_dir)?.with_max_entries(config.cache_max_entries))
        } else {
            None
        };

        Ok(Self {
            module,
            config,
            cache,
        })
    }

    /// The module this translator drives.
    pub fn module(&self) -> &LoadedModule {
        &self.module
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    /// Translates every node of a unit and composes the program.
    ///
    /// Nodes the module rejects are skipped and reported; they never abort
    /// the translation. Fragments appear in the output in source order.
    pub async fn translate(&mut self, unit: &TranslationUnit) -> Result<TranslationReport> {
        let start = Instant::now();
        let lang = self.module.name().to_string();
        let shared: HashSet<&str> = unit.shared_expression_names().into_iter().collect();

        let mut outcomes: Vec<Option<Outcome>> = Vec::with_capacity(unit.len());
        outcomes.resize_with(unit.len(), || None);
        let mut keys: Vec<Option<String>> = vec![None; unit.len()];
        let mut cached = 0;

        let semaphore = Arc::new(Semaphore::new(self.config.max_parallelism.max(1)));
        let mut tasks = JoinSet::new();

        for (index, node) in unit.nodes.iter().enumerate() {
            let qualified = node.kind == NodeKind::Expression && shared.contains(node.name.as_str());

            if let Some(cache) = &self.cache {
                let key = FragmentCache::key(self.module.descriptor(), node, qualified)?;
                if let Some(fragment) = cache.get(&key) {
                    tracing::debug!(module = %lang, index, "cache hit");
                    outcomes[index] = Some(Ok(Ok(fragment.to_string())));
                    cached += 1;
                    continue;
                }
                keys[index] = Some(key);
            }

            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|e| EngineError::Worker(e.to_string()))?;
            let module = self.module.module();
            let node = node.clone();

            tasks.spawn(async move {
                let outcome = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    if qualified {
                        module.transform_qualified(&node)
                    } else {
                        module.transform(&node)
                    }
                })
                .await;
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) = joined.map_err(|e| EngineError::Worker(e.to_string()))?;
            outcomes[index] = Some(outcome);
        }

        let mut fragments = Vec::with_capacity(unit.len());
        let mut diagnostics = Vec::new();
        let mut recorded = false;

        for (index, outcome) in outcomes.into_iter().enumerate() {
            let label = || unit.nodes[index].label();

            match outcome {
                Some(Ok(Ok(fragment))) => {
                    tracing::debug!(module = %lang, index, "emitted fragment");
                    if let (Some(cache), Some(key)) = (self.cache.as_mut(), keys[index].take()) {
                        cache.insert(key, &lang, &fragment);
                        recorded = true;
                    }
                    fragments.push(fragment);
                }
                Some(Ok(Err(error))) => {
                    diagnostics.push(NodeDiagnostic::from_error(index, label(), &lang, &error));
                }
                Some(Err(join_error)) => {
                    let message = if join_error.is_panic() {
                        "module panicked during transform".to_string()
                    } else {
                        format!("transform did not complete: {}", join_error)
                    };
                    diagnostics.push(NodeDiagnostic::fault(index, label(), &lang, message));
                }
                None => {
                    diagnostics.push(NodeDiagnostic::fault(
                        index,
                        label(),
                        &lang,
                        "transform produced no result",
                    ));
                }
            }
        }

        for diagnostic in &diagnostics {
            tracing::warn!(%diagnostic, "skipped node");
        }

        let mut cache_error = None;
        if recorded {
            if let Some(cache) = &self.cache {
                if let Err(error) = cache.save() {
                    tracing::warn!(%error, "failed to save fragment cache");
                    cache_error = Some(error.to_string());
                }
            }
        }

        Ok(TranslationReport {
            output: self.compose(&fragments),
            emitted: fragments.len(),
            cached,
            diagnostics,
            cache_error,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Joins fragments after the module prologue, one per line.
    fn compose(&self, fragments: &[String]) -> String {
        let format = &self.config.format;
        let prologue = self.module.module().prologue();

        let mut out = TextBuffer::new();
        let mut first = true;

        for part in std::iter::once(prologue.as_str())
            .filter(|p| !p.is_empty())
            .chain(fragments.iter().map(String::as_str))
        {
            if !first {
                out.append(&format.new_line);
            }
            out.append(part);
            first = false;
        }

        if format.final_newline && !first {
            out.append(&format.new_line);
        }

        out.into_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surn_core::{
        AstNode, FormatOptions, RegistrationDescriptor, Result as CoreResult, TransformModule,
        Version,
    };
    use surn_plugin::ModuleRegistry;
    use tempfile::tempdir;

    fn v8() -> Version {
        Version::new(8, 0, 0)
    }

    fn php() -> LoadedModule {
        ModuleRegistry::with_defaults()
            .unwrap()
            .get("php")
            .unwrap()
            .clone()
    }

    fn translator(config: TranslatorConfig) -> Translator {
        Translator::new(php(), config).unwrap()
    }

    /// Module that panics on a node named `boom`.
    struct Fragile;

    impl TransformModule for Fragile {
        fn register(&self) -> CoreResult<RegistrationDescriptor> {
            Ok(RegistrationDescriptor::new("fragile", "", Version::new(1, 0, 0), 1))
        }

        fn transform(&self, node: &AstNode) -> CoreResult<String> {
            if node.name == "boom" {
                panic!("boom");
            }
            node.validate()?;
            Ok(node.name.clone())
        }
    }

    #[tokio::test]
    async fn test_translate_php_program() {
        let unit = TranslationUnit::new(vec![
            AstNode::statement("echo_hello", v8()),
            AstNode::expression("total", v8()),
            AstNode::macro_call("DEFINE", Version::new(1, 0, 0)),
        ]);

        let report = translator(TranslatorConfig::default())
            .translate(&unit)
            .await
            .unwrap();

        assert_eq!(report.output, "<?php\necho_hello;\ntotal\n#DEFINE\n");
        assert_eq!(report.emitted, 3);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn test_malformed_node_does_not_stop_translation() {
        let unit = TranslationUnit::new(vec![
            AstNode::statement("first", v8()),
            AstNode::statement("", v8()),
            AstNode::new(NodeKind::Unknown(9), "odd", v8()),
            AstNode::statement("last", v8()),
        ]);

        let report = translator(TranslatorConfig::default())
            .translate(&unit)
            .await
            .unwrap();

        assert_eq!(report.output, "<?php\nfirst;\nlast;\n");
        assert_eq!(report.diagnostics.len(), 2);
        assert_eq!(report.diagnostics[0].index, 1);
        assert_eq!(
            report.diagnostics[0].kind,
            crate::DiagnosticKind::MalformedNode
        );
        assert_eq!(report.diagnostics[1].index, 2);
        assert_eq!(
            report.diagnostics[1].kind,
            crate::DiagnosticKind::UnsupportedNodeKind
        );
        assert_eq!(report.diagnostics[1].node, "odd");
    }

    #[tokio::test]
    async fn test_output_order_is_source_order() {
        let nodes: Vec<AstNode> = (0..64)
            .map(|i| AstNode::statement(format!("s{}", i), v8()))
            .collect();
        let unit = TranslationUnit::new(nodes);

        let report = translator(TranslatorConfig::new().with_max_parallelism(8))
            .translate(&unit)
            .await
            .unwrap();

        let expected: Vec<String> = (0..64).map(|i| format!("s{};", i)).collect();
        let lines: Vec<&str> = report.output.lines().skip(1).collect();
        assert_eq!(lines, expected);
    }

    #[tokio::test]
    async fn test_shared_expression_names_are_qualified() {
        let unit = TranslationUnit::new(vec![
            AstNode::expression("count", v8()).with_surname("App"),
            AstNode::expression("count", v8()).with_surname("Lib"),
            AstNode::expression("total", v8()).with_surname("App"),
        ]);

        let report = translator(TranslatorConfig::default())
            .translate(&unit)
            .await
            .unwrap();

        assert_eq!(report.output, "<?php\nApp\\count\nLib\\count\ntotal\n");
    }

    #[tokio::test]
    async fn test_panicking_module_is_isolated() {
        let mut registry = ModuleRegistry::new();
        let fragile = registry.load(Fragile).unwrap().clone();
        let mut translator = Translator::new(fragile, TranslatorConfig::default()).unwrap();

        let unit = TranslationUnit::new(vec![
            AstNode::statement("a", v8()),
            AstNode::statement("boom", v8()),
            AstNode::statement("b", v8()),
        ]);

        let report = translator.translate(&unit).await.unwrap();

        assert_eq!(report.output, "a\nb\n");
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].kind, crate::DiagnosticKind::ModuleFault);
        assert_eq!(report.diagnostics[0].node, "boom");
    }

    #[tokio::test]
    async fn test_windows_format_without_final_newline() {
        let format = FormatOptions::windows().with_final_newline(false);
        let unit = TranslationUnit::new(vec![AstNode::statement("x", v8())]);

        let report = translator(TranslatorConfig::new().with_format(format))
            .translate(&unit)
            .await
            .unwrap();

        assert_eq!(report.output, "<?php\r\nx;");
    }

    #[tokio::test]
    async fn test_empty_unit() {
        let report = translator(TranslatorConfig::default())
            .translate(&TranslationUnit::default())
            .await
            .unwrap();

        assert_eq!(report.output, "<?php\n");
        assert_eq!(report.emitted, 0);
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_translation() {
        let dir = tempdir().unwrap();
        let config = TranslatorConfig::new()
            .with_cache(true)
            .with_cache_dir(dir.path());

        let unit = TranslationUnit::new(vec![
            AstNode::statement("echo_hello", v8()),
            AstNode::statement("", v8()),
        ]);

        let first = translator(config.clone()).translate(&unit).await.unwrap();
        assert_eq!(first.cached, 0);

        let second = translator(config).translate(&unit).await.unwrap();
        assert_eq!(second.cached, 1);
        assert_eq!(second.output, first.output);
        assert_eq!(second.diagnostics.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_write_failure_keeps_output() {
        let dir = tempdir().unwrap();
        let config = TranslatorConfig::new()
            .with_cache(true)
            .with_cache_dir(dir.path());
        let mut translator = translator(config);

        // A directory where the cache file belongs makes the save fail.
        std::fs::create_dir(dir.path().join("fragments.json")).unwrap();

        let unit = TranslationUnit::new(vec![AstNode::statement("echo_hello", v8())]);
        let report = translator.translate(&unit).await.unwrap();

        assert_eq!(report.output, "<?php\necho_hello;\n");
        assert!(report.is_clean());
        assert!(report.cache_error.is_some());
    }

    #[tokio::test]
    async fn test_transform_is_deterministic_across_runs() {
        let unit = TranslationUnit::new(vec![
            AstNode::statement("a", v8()),
            AstNode::expression("b", v8()),
            AstNode::macro_call("C", v8()),
        ]);

        let mut translator = translator(TranslatorConfig::new().with_max_parallelism(3));
        let first = translator.translate(&unit).await.unwrap().output;
        for _ in 0..5 {
            assert_eq!(translator.translate(&unit).await.unwrap().output, first);
        }
    }

    #[test]
    fn test_module_accessor() {
        let translator = translator(TranslatorConfig::default());
        assert_eq!(translator.module().name(), "php");
        assert!(!translator.config().use_cache);
    }
}
