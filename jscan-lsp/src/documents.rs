//! Open documents and their live text, kept in sync through incremental changes.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::lsp_types::{TextDocumentContentChangeEvent, TextDocumentItem, Url};

use crate::features::dialects::LanguageId;
use crate::line_index::LineIndex;
use crate::{LspError, LspResult};

/// Immutable view of a document at one version.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub uri: Url,
    pub language: LanguageId,
    pub version: i32,
    /// Distinguishes successive opens of the same URI.
    pub generation: u64,
    pub text: Arc<String>,
}

#[derive(Debug, Clone)]
struct DocumentEntry {
    language: LanguageId,
    version: i32,
    generation: u64,
    text: Arc<String>,
}

impl DocumentEntry {
    fn snapshot(&self, uri: &Url) -> DocumentSnapshot {
        DocumentSnapshot {
            uri: uri.clone(),
            language: self.language,
            version: self.version,
            generation: self.generation,
            text: Arc::clone(&self.text),
        }
    }
}

#[derive(Default)]
pub struct DocumentStore {
    entries: RwLock<HashMap<Url, DocumentEntry>>,
    next_generation: AtomicU64,
}

/// Identifies one state of an open document: which open it belongs to and its version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStamp {
    pub generation: u64,
    pub version: i32,
}

impl DocumentStore {
    /// Track a newly opened document, replacing any previous entry for the URI.
    pub async fn open(&self, item: TextDocumentItem) -> DocumentSnapshot {
        let entry = DocumentEntry {
            language: LanguageId::from_id(&item.language_id),
            version: item.version,
            generation: self.next_generation.fetch_add(1, Ordering::SeqCst),
            text: Arc::new(item.text),
        };
        let snapshot = entry.snapshot(&item.uri);
        self.entries.write().await.insert(item.uri, entry);
        snapshot
    }

    /// Apply content changes in order and move the document to `version`.
    ///
    /// Changes carrying a version that does not advance the document are rejected untouched.
    pub async fn apply_changes(
        &self,
        uri: &Url,
        version: i32,
        changes: &[TextDocumentContentChangeEvent],
    ) -> LspResult<DocumentSnapshot> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(uri)
            .ok_or_else(|| LspError::DocumentNotFound(uri.clone()))?;
        if version <= entry.version {
            return Err(LspError::StaleChange {
                uri: uri.clone(),
                current: entry.version,
                received: version,
            });
        }
        apply_content_changes(Arc::make_mut(&mut entry.text), changes);
        entry.version = version;
        Ok(entry.snapshot(uri))
    }

    /// Stop tracking a document. Returns whether it was open.
    pub async fn close(&self, uri: &Url) -> bool {
        self.entries.write().await.remove(uri).is_some()
    }

    pub async fn snapshot(&self, uri: &Url) -> Option<DocumentSnapshot> {
        self.entries
            .read()
            .await
            .get(uri)
            .map(|entry| entry.snapshot(uri))
    }

    pub async fn version(&self, uri: &Url) -> Option<i32> {
        self.entries.read().await.get(uri).map(|entry| entry.version)
    }

    pub async fn stamp(&self, uri: &Url) -> Option<DocumentStamp> {
        self.entries.read().await.get(uri).map(|entry| DocumentStamp {
            generation: entry.generation,
            version: entry.version,
        })
    }

    pub async fn uris(&self) -> Vec<Url> {
        self.entries.read().await.keys().cloned().collect()
    }
}

/// Apply protocol content changes sequentially; each range is relative to the text left by the
/// previous change. A change without a range replaces the whole text.
pub fn apply_content_changes(text: &mut String, changes: &[TextDocumentContentChangeEvent]) {
    for change in changes {
        match change.range {
            Some(range) => {
                let index = LineIndex::new(text.as_str());
                let start = index.offset(range.start);
                let end = index.offset(range.end).max(start);
                text.replace_range(start..end, &change.text);
            }
            None => {
                text.clear();
                text.push_str(&change.text);
            }
        }
    }
}
