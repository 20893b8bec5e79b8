//! One error collector per open document.

use std::collections::HashMap;
use std::sync::Arc;

use jscan_analysis::ErrorCollector;
use tokio::sync::{Mutex, RwLock};
use tower_lsp::lsp_types::Url;

/// A document's collector. Holding its lock serializes validation runs for that document.
pub type SharedCollector = Arc<Mutex<ErrorCollector>>;

#[derive(Default)]
pub struct CollectorRegistry {
    collectors: RwLock<HashMap<Url, SharedCollector>>,
}

impl CollectorRegistry {
    pub async fn get_or_create(&self, uri: &Url) -> SharedCollector {
        if let Some(collector) = self.collectors.read().await.get(uri) {
            return Arc::clone(collector);
        }
        let mut collectors = self.collectors.write().await;
        Arc::clone(collectors.entry(uri.clone()).or_default())
    }

    pub async fn clear(&self, uri: &Url) {
        let collector = self.collectors.read().await.get(uri).cloned();
        if let Some(collector) = collector {
            collector.lock().await.clear();
        }
    }

    /// Empty every collector, e.g. after the rule configuration changed.
    pub async fn clear_all_collectors(&self) {
        let collectors: Vec<SharedCollector> =
            self.collectors.read().await.values().cloned().collect();
        for collector in collectors {
            collector.lock().await.clear();
        }
    }

    /// Drop the collector of a closed document. Returns whether one existed.
    pub async fn remove(&self, uri: &Url) -> bool {
        self.collectors.write().await.remove(uri).is_some()
    }

    pub async fn len(&self) -> usize {
        self.collectors.read().await.len()
    }
}
