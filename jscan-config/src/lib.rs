//! Settings schema and configuration loading for jscan.
//!
//! `defaults/jscan.default.toml` is embedded into every binary so that the documented defaults and
//! runtime behavior stay in sync. The server layers optional user files on top of those defaults
//! via [`Loader`] and deserializes the result into [`JscanConfig`]. Clients then override the
//! defaults per resource through [`Settings`], the JSON record found under the `jscan` section.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use jscan_analysis::PluginSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::debug;

const DEFAULT_TOML: &str = include_str!("../defaults/jscan.default.toml");

/// Client configuration section holding [`Settings`].
pub const SETTINGS_SECTION: &str = "jscan";

pub const DEFAULT_MAX_NUMBER_OF_PROBLEMS: usize = 1000;

/// Plugin list used when neither the client nor the defaults file supplies one.
pub fn default_plugins() -> Vec<PluginSpec> {
    vec![
        PluginSpec::new("needTryCatch").with_option("level", 2),
        PluginSpec::new("needHandlerInCatch"),
        PluginSpec::new("dangerousAndOperator"),
        PluginSpec::new("dangerousInitState"),
        PluginSpec::new("dangerousDefaultValue"),
    ]
}

/// Protocol tracing verbosity requested by the client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceServer {
    #[default]
    Off,
    Messages,
    Verbose,
}

/// Server-side defaults, read from the embedded TOML plus optional user layers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JscanConfig {
    pub max_number_of_problems: usize,
    pub trace_server: TraceServer,
    pub scan_plugins_conf: Vec<PluginSpec>,
}

impl JscanConfig {
    /// Compiled-in configuration, independent of the embedded TOML.
    pub fn builtin() -> Self {
        Self {
            max_number_of_problems: DEFAULT_MAX_NUMBER_OF_PROBLEMS,
            trace_server: TraceServer::Off,
            scan_plugins_conf: default_plugins(),
        }
    }

    /// Replace an empty plugin list with [`default_plugins`].
    pub fn normalize(mut self) -> Self {
        if self.scan_plugins_conf.is_empty() {
            debug!("configuration lists no plugins, using compiled-in plugin list");
            self.scan_plugins_conf = default_plugins();
        }
        self
    }

    /// Settings record equivalent to these defaults.
    pub fn settings(&self) -> Settings {
        Settings {
            max_number_of_problems: self.max_number_of_problems,
            scan_plugins_conf: Some(self.scan_plugins_conf.clone()),
            trace: TraceSettings {
                server: self.trace_server,
            },
        }
    }
}

impl Default for JscanConfig {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Per-resource settings as sent by the client (camelCase JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_max_number_of_problems")]
    pub max_number_of_problems: usize,
    #[serde(default)]
    pub scan_plugins_conf: Option<Vec<PluginSpec>>,
    #[serde(default)]
    pub trace: TraceSettings,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceSettings {
    #[serde(default)]
    pub server: TraceServer,
}

fn default_max_number_of_problems() -> usize {
    DEFAULT_MAX_NUMBER_OF_PROBLEMS
}

impl Settings {
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        Settings::deserialize(value)
    }

    /// The configured plugin list, or `defaults` when none (or an empty one) is configured.
    pub fn effective_plugins<'a>(&'a self, defaults: &'a [PluginSpec]) -> &'a [PluginSpec] {
        match self.scan_plugins_conf.as_deref() {
            Some(plugins) if !plugins.is_empty() => plugins,
            _ => defaults,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        JscanConfig::builtin().settings()
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        Self::from_defaults(DEFAULT_TOML)
    }

    fn from_defaults(toml: &str) -> Self {
        let builder = Config::builder().add_source(File::from_str(toml, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<JscanConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<JscanConfig, ConfigError> {
    Loader::new().build()
}

/// Layer a user file over the embedded defaults. Unlike [`load_or_builtin`], a missing or
/// malformed file is an error.
pub fn load_file(path: impl AsRef<Path>) -> Result<JscanConfig, ConfigError> {
    Loader::new()
        .with_file(path)
        .build()
        .map(JscanConfig::normalize)
}

/// Build the loader, substituting compiled-in values for anything unusable.
///
/// Never fails: a broken configuration yields [`JscanConfig::builtin`], and an empty plugin list
/// yields [`default_plugins`].
pub fn load_or_builtin(loader: Loader) -> JscanConfig {
    match loader.build() {
        Ok(config) => config.normalize(),
        Err(err) => {
            debug!(error = %err, "default configuration unusable, using compiled-in defaults");
            JscanConfig::builtin()
        }
    }
}
