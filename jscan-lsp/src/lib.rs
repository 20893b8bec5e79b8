//! Language Server Protocol (LSP) implementation for jscan
//!
//!     This crate runs the jscan analysis engine over JavaScript and TypeScript documents open in
//!     an editor and publishes what it finds as diagnostics. It does one thing: keep every open
//!     document's diagnostics in step with its latest text and the latest configuration.
//!
//! Validation Pipeline
//!
//!     Each open, edit or configuration change triggers a run for the affected documents:
//!
//!         1. Take a snapshot of the document (text, language, version).
//!         2. Skip languages the engine does not handle (anything but javascript, typescript,
//!            javascriptreact and typescriptreact).
//!         3. Resolve the settings governing the document.
//!         4. Clear the document's collector and hand the engine the effective plugin list,
//!            the source, the document URI and the parser dialects for its language.
//!         5. Map every finding to a diagnostic, capped at maxNumberOfProblems.
//!         6. Publish the full set, then send the custom follow-up messages.
//!
//!     Runs are stamped with the document version and a configuration epoch. A run that is
//!     overtaken by an edit, a configuration change or a close publishes nothing, so the last
//!     publication for a document always reflects its latest text.
//!
//! Configuration
//!
//!     Clients that answer workspace/configuration are asked for the `jscan` section per
//!     document and the answers are cached until the next didChangeConfiguration (pull mode).
//!     Other clients push one global record with didChangeConfiguration (push mode). Missing or
//!     malformed settings resolve to the defaults loaded through jscan-config.
//!
//! Architecture
//!
//!     LSP Layer (tower-lsp):
//!         - JSON-RPC transport, capability negotiation, request routing
//!
//!     Server Layer (server.rs, session.rs):
//!         - Implements the LanguageServer trait
//!         - Owns documents, collectors and the settings cache
//!         - Thin: forwards notifications to the stores and the pipeline
//!
//!     Feature Layer (features/):
//!         - Dialect resolution, diagnostic mapping, custom messages, the validation pipeline
//!         - Stateless where possible, with dense unit tests
//!
//!     The client connection is reached through the LspClient trait so the server can be driven
//!     by a recording client in tests.
//!
//! Usage
//!
//!     Binary:
//!         $ jscan-lsp --stdio
//!         Starts the language server on stdin/stdout for editor integration.
//!         Logs go to stderr; set JSCAN_LOG (e.g. JSCAN_LOG=jscan_lsp=debug) or --log-level.

use thiserror::Error;
use tower_lsp::lsp_types::Url;

pub mod collectors;
pub mod documents;
pub mod features;
pub mod line_index;
pub mod server;
pub mod session;
pub mod settings;

pub use server::{JscanLanguageServer, LspClient};

#[derive(Debug, Error)]
pub enum LspError {
    #[error("workspace/configuration request failed: {0}")]
    ConfigurationUnavailable(String),

    #[error("invalid jscan settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),

    #[error("document {0} is not open")]
    DocumentNotFound(Url),

    #[error("stale change for {uri}: document is at version {current}, change carries {received}")]
    StaleChange {
        uri: Url,
        current: i32,
        received: i32,
    },
}

pub type LspResult<T> = Result<T, LspError>;
