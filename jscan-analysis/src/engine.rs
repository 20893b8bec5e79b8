//! Engine seam and the stock plugin-dispatching engine.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::collector::ErrorCollector;
use crate::dialect::DialectSet;
use crate::plugin::{PluginOptions, PluginSpec};

/// Failures raised while scanning. Findings reported before the failure stay in the collector.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse {file_path}: {message}")]
    Parse { file_path: String, message: String },

    #[error("plugin `{plugin}` failed: {message}")]
    Plugin { plugin: String, message: String },
}

/// Everything the engine needs for one run.
#[derive(Debug, Clone, Copy)]
pub struct ScanRequest<'a> {
    pub plugins: &'a [PluginSpec],
    pub source: &'a str,
    pub file_path: &'a str,
    pub dialects: DialectSet,
}

/// The analysis engine. Results are reported through the collector, never returned.
pub trait AnalysisEngine: Send + Sync + 'static {
    fn scan(
        &self,
        request: &ScanRequest<'_>,
        collector: &mut ErrorCollector,
    ) -> Result<(), EngineError>;
}

/// Per-plugin view of a scan request.
#[derive(Debug, Clone, Copy)]
pub struct PluginContext<'a> {
    pub spec: &'a PluginSpec,
    pub source: &'a str,
    pub file_path: &'a str,
    pub dialects: DialectSet,
}

impl<'a> PluginContext<'a> {
    pub fn options(&self) -> Option<&'a PluginOptions> {
        self.spec.options.as_ref()
    }
}

/// A single rule implementation, looked up by the name used in plugin configuration.
pub trait ScanPlugin: Send + Sync {
    fn name(&self) -> &str;

    fn scan(
        &self,
        context: &PluginContext<'_>,
        collector: &mut ErrorCollector,
    ) -> Result<(), EngineError>;
}

#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn ScanPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin under its own name, replacing any previous registration.
    pub fn register(&mut self, plugin: Arc<dyn ScanPlugin>) -> &mut Self {
        self.plugins.insert(plugin.name().to_string(), plugin);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ScanPlugin>> {
        self.plugins.get(name)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Runs the configured plugins in declaration order against a shared collector.
///
/// The first plugin error stops the run; whatever earlier plugins reported is kept.
#[derive(Default, Clone)]
pub struct PluginEngine {
    registry: PluginRegistry,
}

impl PluginEngine {
    pub fn new(registry: PluginRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }
}

impl AnalysisEngine for PluginEngine {
    fn scan(
        &self,
        request: &ScanRequest<'_>,
        collector: &mut ErrorCollector,
    ) -> Result<(), EngineError> {
        for spec in request.plugins {
            let Some(plugin) = self.registry.get(&spec.name) else {
                debug!(plugin = %spec.name, "no plugin registered under this name, skipping");
                continue;
            };
            let context = PluginContext {
                spec,
                source: request.source,
                file_path: request.file_path,
                dialects: request.dialects,
            };
            plugin.scan(&context, collector)?;
        }
        Ok(())
    }
}
