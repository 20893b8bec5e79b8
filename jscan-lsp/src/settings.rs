//! Per-resource settings resolution.
//!
//! Clients that support `workspace/configuration` are asked for the `jscan` section of every
//! resource on first use and the answer is memoized until the next configuration change (pull
//! mode). Other clients push one global record with `workspace/didChangeConfiguration` (push
//! mode). The mode is fixed when the session is created.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use jscan_config::{Settings, SETTINGS_SECTION};
use serde_json::Value;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tower_lsp::lsp_types::{ConfigurationItem, Url};
use tracing::{debug, warn};

use crate::server::LspClient;
use crate::{LspError, LspResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationMode {
    Pull,
    Push,
}

enum ConfigurationSource {
    /// Memoized per-URI fetches; each cell is shared by every caller waiting on that URI.
    Pull(Mutex<HashMap<Url, Arc<OnceCell<Arc<Settings>>>>>),
    Push(RwLock<Arc<Settings>>),
}

pub struct SettingsCache {
    source: ConfigurationSource,
    defaults: Arc<Settings>,
    epoch: AtomicU64,
}

impl SettingsCache {
    pub fn new(mode: ConfigurationMode, defaults: Settings) -> Self {
        let defaults = Arc::new(defaults);
        let source = match mode {
            ConfigurationMode::Pull => ConfigurationSource::Pull(Mutex::default()),
            ConfigurationMode::Push => ConfigurationSource::Push(RwLock::new(Arc::clone(&defaults))),
        };
        Self {
            source,
            defaults,
            epoch: AtomicU64::new(0),
        }
    }

    pub fn mode(&self) -> ConfigurationMode {
        match self.source {
            ConfigurationSource::Pull(_) => ConfigurationMode::Pull,
            ConfigurationSource::Push(_) => ConfigurationMode::Push,
        }
    }

    /// Number of configuration changes seen so far.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }

    pub fn defaults(&self) -> &Arc<Settings> {
        &self.defaults
    }

    /// Settings governing `uri`. Never fails; unusable configuration resolves to the defaults.
    pub async fn get<C: LspClient>(&self, uri: &Url, client: &C) -> Arc<Settings> {
        match &self.source {
            ConfigurationSource::Push(current) => Arc::clone(&*current.read().await),
            ConfigurationSource::Pull(entries) => {
                let cell = Arc::clone(entries.lock().await.entry(uri.clone()).or_default());
                let fetched = cell
                    .get_or_try_init(|| fetch_settings(client, uri, &self.defaults))
                    .await;
                match fetched {
                    Ok(settings) => Arc::clone(settings),
                    Err(err) => {
                        warn!(%uri, error = %err, "using default settings");
                        Arc::clone(&self.defaults)
                    }
                }
            }
        }
    }

    /// React to `workspace/didChangeConfiguration`.
    ///
    /// Pull mode drops every memoized entry; push mode replaces the global record with the
    /// `jscan` section of `payload`, or with the defaults when it is missing or malformed.
    pub async fn configuration_changed(&self, payload: &Value) {
        match &self.source {
            ConfigurationSource::Pull(entries) => entries.lock().await.clear(),
            ConfigurationSource::Push(current) => {
                *current.write().await = pushed_settings(payload, &self.defaults);
            }
        }
        self.epoch.fetch_add(1, Ordering::SeqCst);
    }

    /// Drop the memoized settings of a closed document.
    pub async fn forget(&self, uri: &Url) {
        if let ConfigurationSource::Pull(entries) = &self.source {
            entries.lock().await.remove(uri);
        }
    }
}

async fn fetch_settings<C: LspClient>(
    client: &C,
    uri: &Url,
    defaults: &Arc<Settings>,
) -> LspResult<Arc<Settings>> {
    let items = vec![ConfigurationItem {
        scope_uri: Some(uri.clone()),
        section: Some(SETTINGS_SECTION.to_string()),
    }];
    let values = client
        .configuration(items)
        .await
        .map_err(|err| LspError::ConfigurationUnavailable(err.to_string()))?;
    match values.into_iter().next() {
        None | Some(Value::Null) => {
            debug!(%uri, "client has no jscan settings for resource");
            Ok(Arc::clone(defaults))
        }
        Some(value) => Ok(Arc::new(Settings::from_value(&value)?)),
    }
}

fn pushed_settings(payload: &Value, defaults: &Arc<Settings>) -> Arc<Settings> {
    match payload.get(SETTINGS_SECTION) {
        Some(section) if !section.is_null() => match Settings::from_value(section) {
            Ok(settings) => Arc::new(settings),
            Err(err) => {
                warn!(error = %err, "malformed jscan settings, using defaults");
                Arc::clone(defaults)
            }
        },
        _ => {
            debug!("configuration change carries no jscan settings, using defaults");
            Arc::clone(defaults)
        }
    }
}
