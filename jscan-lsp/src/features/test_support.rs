//! Recording doubles for the client connection and the analysis engine.

use std::sync::{Arc, Mutex};

use jscan_analysis::{AnalysisEngine, DialectSet, EngineError, ErrorCollector, ScanRequest};
use serde_json::Value;
use tokio::sync::Notify;
use tower_lsp::async_trait;
use tower_lsp::jsonrpc;
use tower_lsp::lsp_types::{
    ConfigurationItem, Diagnostic, MessageType, PublishDiagnosticsParams, Registration, Url,
};

use crate::server::LspClient;

#[derive(Default)]
struct ClientState {
    published: Vec<PublishDiagnosticsParams>,
    logs: Vec<(MessageType, String)>,
    configuration_requests: usize,
    last_configuration_items: Vec<ConfigurationItem>,
    configuration_reply: Option<Value>,
    fail_configuration: bool,
    registrations: Vec<Registration>,
    custom_messages: usize,
}

/// Holds `workspace/configuration` replies until released.
#[derive(Clone, Default)]
pub struct ConfigurationGate {
    requested: Arc<Notify>,
    released: Arc<Notify>,
}

impl ConfigurationGate {
    /// Wait until the server has asked for configuration.
    pub async fn requested(&self) {
        self.requested.notified().await;
    }

    pub fn release(&self) {
        self.released.notify_one();
    }
}

#[derive(Clone, Default)]
pub struct RecordingClient {
    state: Arc<Mutex<ClientState>>,
    gate: Option<ConfigurationGate>,
}

impl RecordingClient {
    pub fn gated() -> (Self, ConfigurationGate) {
        let gate = ConfigurationGate::default();
        let client = Self {
            gate: Some(gate.clone()),
            ..Self::default()
        };
        (client, gate)
    }

    /// Answer subsequent configuration requests with `value`.
    pub fn reply_with(&self, value: Value) {
        let mut state = self.state.lock().unwrap();
        state.configuration_reply = Some(value);
        state.fail_configuration = false;
    }

    pub fn fail_configuration(&self) {
        self.state.lock().unwrap().fail_configuration = true;
    }

    pub fn configuration_requests(&self) -> usize {
        self.state.lock().unwrap().configuration_requests
    }

    pub fn last_configuration_items(&self) -> Vec<ConfigurationItem> {
        self.state.lock().unwrap().last_configuration_items.clone()
    }

    pub fn published(&self) -> Vec<PublishDiagnosticsParams> {
        self.state.lock().unwrap().published.clone()
    }

    pub fn last_published(&self) -> Option<PublishDiagnosticsParams> {
        self.state.lock().unwrap().published.last().cloned()
    }

    pub fn logs(&self) -> Vec<(MessageType, String)> {
        self.state.lock().unwrap().logs.clone()
    }

    pub fn registrations(&self) -> Vec<Registration> {
        self.state.lock().unwrap().registrations.clone()
    }

    pub fn custom_messages(&self) -> usize {
        self.state.lock().unwrap().custom_messages
    }
}

#[async_trait]
impl LspClient for RecordingClient {
    async fn publish_diagnostics(&self, uri: Url, diagnostics: Vec<Diagnostic>, version: Option<i32>) {
        self.state
            .lock()
            .unwrap()
            .published
            .push(PublishDiagnosticsParams::new(uri, diagnostics, version));
    }

    async fn log_message(&self, typ: MessageType, message: String) {
        self.state.lock().unwrap().logs.push((typ, message));
    }

    async fn configuration(&self, items: Vec<ConfigurationItem>) -> jsonrpc::Result<Vec<Value>> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.configuration_requests += 1;
            state.last_configuration_items = items.clone();
            if state.fail_configuration {
                None
            } else {
                Some(state.configuration_reply.clone().unwrap_or(Value::Null))
            }
        };
        if let Some(gate) = &self.gate {
            gate.requested.notify_one();
            gate.released.notified().await;
        }
        match reply {
            Some(value) => Ok(items.iter().map(|_| value.clone()).collect()),
            None => Err(jsonrpc::Error::internal_error()),
        }
    }

    async fn register_capability(&self, registrations: Vec<Registration>) -> jsonrpc::Result<()> {
        self.state
            .lock()
            .unwrap()
            .registrations
            .extend(registrations);
        Ok(())
    }

    async fn send_custom_messages(&self) {
        self.state.lock().unwrap().custom_messages += 1;
    }
}

/// What the engine was asked to do on one run.
#[derive(Debug, Clone)]
pub struct RecordedScan {
    pub plugins: Vec<String>,
    pub dialects: DialectSet,
    pub source: String,
    pub file_path: String,
    pub findings_on_entry: usize,
}

type Script = dyn Fn(&ScanRequest<'_>, &mut ErrorCollector) -> Result<(), EngineError> + Send + Sync;

/// Engine whose findings come from a closure.
pub struct ScriptedEngine {
    script: Box<Script>,
    scans: Mutex<Vec<RecordedScan>>,
}

impl ScriptedEngine {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&ScanRequest<'_>, &mut ErrorCollector) -> Result<(), EngineError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            script: Box::new(script),
            scans: Mutex::default(),
        }
    }

    /// Reports nothing.
    pub fn silent() -> Self {
        Self::new(|_, _| Ok(()))
    }

    pub fn scans(&self) -> Vec<RecordedScan> {
        self.scans.lock().unwrap().clone()
    }
}

impl AnalysisEngine for ScriptedEngine {
    fn scan(
        &self,
        request: &ScanRequest<'_>,
        collector: &mut ErrorCollector,
    ) -> Result<(), EngineError> {
        self.scans.lock().unwrap().push(RecordedScan {
            plugins: request.plugins.iter().map(|p| p.name.clone()).collect(),
            dialects: request.dialects,
            source: request.source.to_string(),
            file_path: request.file_path.to_string(),
            findings_on_entry: collector.len(),
        });
        (self.script)(request, collector)
    }
}
