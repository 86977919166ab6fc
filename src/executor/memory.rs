//! In-memory document store
//!
//! - Collections keep insertion order, which is also relevance order
//! - Fulltext indexes are declared per (collection, field)
//! - Every term must match some word of the field, case-insensitively
//! - Open cursors are counted until their stream is dropped
//!
//! Data files are JSON lines, one entry per line:
//!
//! ```text
//! {"collection": "ncbi_taxon", "index": {"type": "fulltext", "fields": ["scientific_name"]}}
//! {"collection": "ncbi_taxon", "document": {"id": "562", "scientific_name": "Escherichia coli"}}
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;

use super::fulltext::{parse_expression, tokenize, Term};
use super::store::{
    Document, DocumentStore, DocumentStream, FulltextRequest, IndexInfo, StoreError, StoreResult,
};

#[derive(Debug, Default, Clone)]
struct Collection {
    documents: Arc<Vec<Document>>,
    indexes: Vec<IndexInfo>,
}

impl Collection {
    fn has_fulltext(&self, field: &str) -> bool {
        self.indexes
            .iter()
            .any(|idx| idx.kind == "fulltext" && idx.fields.first().map(String::as_str) == Some(field))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataLine {
    Index { collection: String, index: IndexInfo },
    Document { collection: String, document: Document },
}

/// Decrements the open cursor count when dropped
struct CursorGuard {
    open: Arc<AtomicUsize>,
}

impl CursorGuard {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self {
            open: Arc::clone(counter),
        }
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Cursor {
    documents: Arc<Vec<Document>>,
    position: usize,
    field: String,
    terms: Vec<Term>,
    latency: Option<Duration>,
    _guard: CursorGuard,
}

impl Cursor {
    fn matches(&self, doc: &Document) -> bool {
        let Some(text) = doc.get(&self.field).and_then(|v| v.as_str()) else {
            return false;
        };
        let words = tokenize(text);
        self.terms
            .iter()
            .all(|term| words.iter().any(|word| term.matches_word(word)))
    }
}

/// Document store held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    open_cursors: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a delay before each document the cursor visits
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Loads collections, indexes and documents from a JSON lines file
    pub fn load_jsonl(path: &Path) -> StoreResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_jsonl(&content)
    }

    /// Parses JSON lines text; blank lines are skipped
    pub fn from_jsonl(content: &str) -> StoreResult<Self> {
        let store = Self::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: DataLine = serde_json::from_str(line).map_err(|e| StoreError::Malformed {
                line: i + 1,
                reason: e.to_string(),
            })?;
            match entry {
                DataLine::Index { collection, index } => store.add_index(&collection, index)?,
                DataLine::Document {
                    collection,
                    document,
                } => store.insert(&collection, document)?,
            }
        }
        Ok(store)
    }

    /// Creates an empty collection if absent
    pub fn create_collection(&self, name: &str) -> StoreResult<()> {
        self.write()?.entry(name.to_string()).or_default();
        Ok(())
    }

    /// Appends a document, creating the collection if needed
    pub fn insert(&self, collection: &str, document: Document) -> StoreResult<()> {
        let mut collections = self.write()?;
        let entry = collections.entry(collection.to_string()).or_default();
        Arc::make_mut(&mut entry.documents).push(document);
        Ok(())
    }

    /// Declares an index, creating the collection if needed
    pub fn add_index(&self, collection: &str, index: IndexInfo) -> StoreResult<()> {
        let mut collections = self.write()?;
        let entry = collections.entry(collection.to_string()).or_default();
        if !entry.indexes.contains(&index) {
            entry.indexes.push(index);
        }
        Ok(())
    }

    /// Declares a fulltext index on one field
    pub fn ensure_fulltext_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.add_index(collection, IndexInfo::fulltext(field))
    }

    /// Number of cursors whose streams are still alive
    pub fn open_cursors(&self) -> usize {
        self.open_cursors.load(Ordering::SeqCst)
    }

    /// Number of documents in a collection
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .ok()
            .and_then(|c| c.get(collection).map(|c| c.documents.len()))
            .unwrap_or(0)
    }

    fn write(
        &self,
    ) -> StoreResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Collection>>> {
        self.collections
            .write()
            .map_err(|_| StoreError::Io("Lock poisoned".into()))
    }

    fn lookup(&self, name: &str) -> StoreResult<Option<Collection>> {
        let collections = self
            .collections
            .read()
            .map_err(|_| StoreError::Io("Lock poisoned".into()))?;
        Ok(collections.get(name).cloned())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fulltext(&self, request: &FulltextRequest) -> StoreResult<DocumentStream> {
        let collection = self
            .lookup(&request.collection)?
            .ok_or_else(|| StoreError::CollectionNotFound(request.collection.clone()))?;

        if !collection.has_fulltext(&request.field) {
            return Err(StoreError::IndexNotFound {
                collection: request.collection.clone(),
                field: request.field.clone(),
            });
        }

        let terms = parse_expression(&request.expression)
            .ok_or_else(|| StoreError::InvalidExpression(request.expression.clone()))?;

        let cursor = Cursor {
            documents: collection.documents,
            position: 0,
            field: request.field.clone(),
            terms,
            latency: self.latency,
            _guard: CursorGuard::open(&self.open_cursors),
        };

        let stream = futures::stream::unfold(cursor, |mut cursor| async move {
            while cursor.position < cursor.documents.len() {
                let index = cursor.position;
                cursor.position += 1;
                if let Some(delay) = cursor.latency {
                    tokio::time::sleep(delay).await;
                }
                if cursor.matches(&cursor.documents[index]) {
                    let doc = cursor.documents[index].clone();
                    return Some((Ok(doc), cursor));
                }
            }
            None
        });

        Ok(stream.boxed())
    }

    async fn indexes(&self, collection: &str) -> StoreResult<Option<Vec<IndexInfo>>> {
        Ok(self.lookup(collection)?.map(|c| c.indexes))
    }
}
