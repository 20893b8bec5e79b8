//! Validation pipeline: document text in, published diagnostics out.
//!
//! Every run is stamped with the document's open generation, its version and the settings epoch
//! it started from. The run holds its document's collector lock from the moment it clears the
//! collector until it has published, and it re-checks the stamp under that lock, the last time
//! right before publishing. A run overtaken by an edit, a configuration change or a close (even
//! one followed by a reopen at the same version) is dropped without publishing.

use jscan_analysis::{AnalysisEngine, PluginSpec, ScanRequest};
use jscan_config::{JscanConfig, Settings, TraceServer};
use tower_lsp::lsp_types::{MessageType, Url};
use tracing::{debug, error};

use crate::collectors::CollectorRegistry;
use crate::documents::{DocumentStamp, DocumentStore};
use crate::features::diagnostics::collect_diagnostics;
use crate::features::dialects::resolve_dialects;
use crate::server::LspClient;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationOutcome {
    /// The document is not open.
    NotOpen,
    /// The document's language is not analysed.
    Unsupported,
    /// A newer edit, configuration change or close overtook the run.
    Superseded,
    /// Diagnostics were published; holds how many.
    Published(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RunStamp {
    document: DocumentStamp,
    epoch: u64,
}

/// Borrowed view of the session state a run needs.
pub struct ValidationPipeline<'a, C, E> {
    pub client: &'a C,
    pub engine: &'a E,
    pub session: &'a Session,
    pub documents: &'a DocumentStore,
    pub collectors: &'a CollectorRegistry,
    pub defaults: &'a JscanConfig,
}

impl<'a, C, E> ValidationPipeline<'a, C, E>
where
    C: LspClient,
    E: AnalysisEngine,
{
    pub async fn validate(&self, uri: &Url) -> ValidationOutcome {
        let Some(document) = self.documents.snapshot(uri).await else {
            return ValidationOutcome::NotOpen;
        };
        if !document.language.is_supported() {
            debug!(%uri, language = ?document.language, "skipping unsupported document");
            return ValidationOutcome::Unsupported;
        }
        let stamp = RunStamp {
            document: DocumentStamp {
                generation: document.generation,
                version: document.version,
            },
            epoch: self.session.settings.epoch(),
        };

        let settings = self.session.settings.get(uri, self.client).await;

        let collector = self.collectors.get_or_create(uri).await;
        let mut collector = collector.lock().await;
        if !self.is_current(uri, stamp).await {
            debug!(%uri, version = document.version, "validation superseded before scanning");
            if self.documents.version(uri).await.is_none() {
                self.collectors.remove(uri).await;
            }
            return ValidationOutcome::Superseded;
        }
        collector.clear();

        let plugins = settings.effective_plugins(&self.defaults.scan_plugins_conf);
        let request = ScanRequest {
            plugins,
            source: document.text.as_str(),
            file_path: uri.as_str(),
            dialects: resolve_dialects(document.language),
        };
        if let Err(err) = self.engine.scan(&request, &mut collector) {
            error!(%uri, error = %err, "analysis failed, publishing partial results");
        }

        let errors = collector.errors();
        if errors.len() > settings.max_number_of_problems {
            debug!(
                %uri,
                found = errors.len(),
                max = settings.max_number_of_problems,
                "truncating diagnostics"
            );
        }
        let diagnostics = collect_diagnostics(
            errors,
            uri,
            &document.text,
            &self.session.capabilities,
            settings.max_number_of_problems,
        );

        let count = diagnostics.len();
        self.trace(uri, &settings, plugins, count).await;
        if !self.is_current(uri, stamp).await {
            debug!(%uri, version = document.version, "validation superseded before publishing");
            return ValidationOutcome::Superseded;
        }
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(document.version))
            .await;
        drop(collector);

        self.client.send_custom_messages().await;
        ValidationOutcome::Published(count)
    }

    async fn is_current(&self, uri: &Url, stamp: RunStamp) -> bool {
        self.documents.stamp(uri).await == Some(stamp.document)
            && self.session.settings.epoch() == stamp.epoch
    }

    async fn trace(&self, uri: &Url, settings: &Settings, plugins: &[PluginSpec], count: usize) {
        let message = match settings.trace.server {
            TraceServer::Off => return,
            TraceServer::Messages => format!("Publishing {count} diagnostic(s) for {uri}"),
            TraceServer::Verbose => {
                let names: Vec<&str> = plugins.iter().map(|p| p.name.as_str()).collect();
                format!(
                    "Publishing {count} diagnostic(s) for {uri} (plugins: {})",
                    names.join(", ")
                )
            }
        };
        self.client.log_message(MessageType::LOG, message).await;
    }
}
