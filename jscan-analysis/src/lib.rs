//! Analysis-facing building blocks for jscan
//!
//!     The language server never inspects source code itself. It hands the document text, the
//!     ordered plugin configuration and the parser dialects to an [`AnalysisEngine`], and reads
//!     the findings back out of an [`ErrorCollector`] that every plugin of the run shares.
//!
//!     Types:
//!         - [`ScanError`] / [`ErrorLevel`]: a raw finding, positioned by byte offsets.
//!         - [`ErrorCollector`]: per-document sink, cleared before every run.
//!         - [`PluginSpec`]: a named rule plus its options, applied in declaration order.
//!         - [`Dialect`] / [`DialectSet`]: parser feature flags (JSX, TypeScript syntax).
//!
//!     Engine:
//!         [`PluginEngine`] is the stock engine. It walks the plugin list and dispatches every
//!         entry to the [`ScanPlugin`] registered under that name in a [`PluginRegistry`].
//!         Rule packs live outside this crate and register themselves when embedding the server.

pub mod collector;
pub mod dialect;
pub mod engine;
pub mod plugin;

pub use collector::{ErrorCollector, ErrorLevel, ScanError};
pub use dialect::{Dialect, DialectSet};
pub use engine::{
    AnalysisEngine, EngineError, PluginContext, PluginEngine, PluginRegistry, ScanPlugin,
    ScanRequest,
};
pub use plugin::{PluginOptions, PluginSpec};
