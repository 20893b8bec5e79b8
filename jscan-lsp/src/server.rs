//! Main language server implementation

use std::sync::{Arc, OnceLock};

use jscan_analysis::{AnalysisEngine, PluginEngine};
use jscan_config::JscanConfig;
use serde_json::Value;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    ConfigurationItem, Diagnostic, DidChangeConfigurationParams, DidChangeTextDocumentParams,
    DidChangeWatchedFilesParams, DidChangeWorkspaceFoldersParams, DidCloseTextDocumentParams,
    DidOpenTextDocumentParams, InitializeParams, InitializeResult, InitializedParams,
    MessageType, OneOf, Registration, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, TextDocumentSyncOptions, Url, WorkspaceFoldersServerCapabilities,
    WorkspaceServerCapabilities,
};
use tower_lsp::Client;
use tracing::{debug, info, warn};

use crate::collectors::CollectorRegistry;
use crate::documents::DocumentStore;
use crate::features::messages::send_custom_messages;
use crate::features::validation::{ValidationOutcome, ValidationPipeline};
use crate::session::{Session, SessionCapabilities};
use crate::settings::ConfigurationMode;

const CONFIGURATION_REGISTRATION_ID: &str = "jscan-did-change-configuration";

/// The parts of the client connection the server talks to.
#[async_trait]
pub trait LspClient: Send + Sync + Clone + 'static {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>);

    async fn log_message(&self, typ: MessageType, message: String);

    async fn configuration(&self, items: Vec<ConfigurationItem>) -> Result<Vec<Value>>;

    async fn register_capability(&self, registrations: Vec<Registration>) -> Result<()>;

    /// Follow-up messages sent after every publication.
    async fn send_custom_messages(&self);
}

#[async_trait]
impl LspClient for Client {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        Client::publish_diagnostics(self, uri, diagnostics, version).await;
    }

    async fn log_message(&self, typ: MessageType, message: String) {
        Client::log_message(self, typ, message).await;
    }

    async fn configuration(&self, items: Vec<ConfigurationItem>) -> Result<Vec<Value>> {
        Client::configuration(self, items).await
    }

    async fn register_capability(&self, registrations: Vec<Registration>) -> Result<()> {
        Client::register_capability(self, registrations).await
    }

    async fn send_custom_messages(&self) {
        send_custom_messages(self).await;
    }
}

pub struct JscanLanguageServer<C = Client, E = PluginEngine> {
    client: C,
    engine: Arc<E>,
    defaults: Arc<JscanConfig>,
    session: OnceLock<Session>,
    documents: DocumentStore,
    collectors: CollectorRegistry,
}

impl JscanLanguageServer<Client, PluginEngine> {
    pub fn new(client: Client) -> Self {
        Self::with_engine(
            client,
            Arc::new(PluginEngine::default()),
            Arc::new(JscanConfig::builtin()),
        )
    }
}

impl<C, E> JscanLanguageServer<C, E>
where
    C: LspClient,
    E: AnalysisEngine,
{
    pub fn with_engine(client: C, engine: Arc<E>, defaults: Arc<JscanConfig>) -> Self {
        Self {
            client,
            engine,
            defaults,
            session: OnceLock::new(),
            documents: DocumentStore::default(),
            collectors: CollectorRegistry::default(),
        }
    }

    /// The negotiated session. Before `initialize` a session without any optional client
    /// capability is assumed.
    fn session(&self) -> &Session {
        self.session
            .get_or_init(|| Session::new(SessionCapabilities::default(), &self.defaults))
    }

    fn pipeline(&self) -> ValidationPipeline<'_, C, E> {
        ValidationPipeline {
            client: &self.client,
            engine: self.engine.as_ref(),
            session: self.session(),
            documents: &self.documents,
            collectors: &self.collectors,
            defaults: &self.defaults,
        }
    }

    pub(crate) async fn validate(&self, uri: &Url) -> ValidationOutcome {
        let outcome = self.pipeline().validate(uri).await;
        debug!(%uri, ?outcome, "validation finished");
        outcome
    }

    async fn validate_all(&self) {
        for uri in self.documents.uris().await {
            self.validate(&uri).await;
        }
    }
}

#[async_trait]
impl<C, E> tower_lsp::LanguageServer for JscanLanguageServer<C, E>
where
    C: LspClient,
    E: AnalysisEngine,
{
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let capabilities = SessionCapabilities::from_client(&params.capabilities);
        if self
            .session
            .set(Session::new(capabilities, &self.defaults))
            .is_err()
        {
            warn!("session already established, ignoring repeated initialize");
        }
        info!(?capabilities, "initializing session");

        let workspace = capabilities
            .workspace_folders
            .then(|| WorkspaceServerCapabilities {
                workspace_folders: Some(WorkspaceFoldersServerCapabilities {
                    supported: Some(true),
                    change_notifications: Some(OneOf::Left(true)),
                }),
                file_operations: None,
            });
        let capabilities = ServerCapabilities {
            text_document_sync: Some(TextDocumentSyncCapability::Options(
                TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::INCREMENTAL),
                    ..TextDocumentSyncOptions::default()
                },
            )),
            workspace,
            ..ServerCapabilities::default()
        };

        Ok(InitializeResult {
            capabilities,
            server_info: Some(ServerInfo {
                name: "jscan-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let session = self.session();
        if session.settings.mode() == ConfigurationMode::Pull {
            let registration = Registration {
                id: CONFIGURATION_REGISTRATION_ID.to_string(),
                method: "workspace/didChangeConfiguration".to_string(),
                register_options: None,
            };
            if let Err(err) = self.client.register_capability(vec![registration]).await {
                warn!(error = %err, "failed to register for configuration changes");
            }
        }
        if session.capabilities.workspace_folders {
            info!("listening for workspace folder changes");
        }
        self.client
            .log_message(MessageType::INFO, "jscan-lsp initialized".to_string())
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.session()
            .settings
            .configuration_changed(&params.settings)
            .await;
        self.collectors.clear_all_collectors().await;
        self.validate_all().await;
    }

    async fn did_change_workspace_folders(&self, params: DidChangeWorkspaceFoldersParams) {
        info!(
            added = params.event.added.len(),
            removed = params.event.removed.len(),
            "workspace folders changed"
        );
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        info!(changes = params.changes.len(), "watched files changed");
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri.clone();
        self.documents.open(params.text_document).await;
        self.validate(&uri).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        match self
            .documents
            .apply_changes(&uri, params.text_document.version, &params.content_changes)
            .await
        {
            Ok(_) => {
                self.validate(&uri).await;
            }
            Err(err) => warn!(error = %err, "ignoring document change"),
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.close(&uri).await;
        self.session().settings.forget(&uri).await;
        self.collectors.remove(&uri).await;
    }
}
