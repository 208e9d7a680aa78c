use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::{Mutex, RwLock};

use crate::error::{FeedError, StoreError, StoreResult};
use crate::traits::{CatalogSource, ChangeFeed, ChangeStream, DocumentStore};
use crate::types::{AggregateDocument, CatalogDocument, ChangeEvent, SequenceToken};

/// In-memory document store enforcing the same revision contract as
/// the backing store: a write must carry the currently stored revision
/// (or none, when creating) or it is rejected with a conflict.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<HashMap<String, AggregateDocument>>>,
    rev_counter: Arc<AtomicU64>,
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            docs: Arc::clone(&self.docs),
            rev_counter: Arc::clone(&self.rev_counter),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_rev(&self) -> String {
        (self.rev_counter.fetch_add(1, Ordering::Relaxed) + 1).to_string()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_document(&self, id: &str) -> StoreResult<AggregateDocument> {
        let docs = self.docs.read().await;
        docs.get(id).cloned().ok_or(StoreError::NotFound)
    }

    async fn put_document(&self, doc: AggregateDocument) -> StoreResult<AggregateDocument> {
        let mut docs = self.docs.write().await;
        match docs.get(&doc.id) {
            Some(existing) if existing.rev != doc.rev => return Err(StoreError::Conflict),
            None if doc.rev.is_some() => return Err(StoreError::Conflict),
            _ => {}
        }
        let mut stored = doc;
        stored.rev = Some(self.next_rev());
        docs.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }
}

/// In-memory catalog documents keyed by id.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    docs: RwLock<HashMap<String, CatalogDocument>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, doc: CatalogDocument) {
        self.docs.write().await.insert(doc.id.clone(), doc);
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn fetch_catalog(&self, id: &str) -> StoreResult<CatalogDocument> {
        let docs = self.docs.read().await;
        docs.get(id).cloned().ok_or(StoreError::NotFound)
    }
}

/// Scripted change feed. Each `subscribe` call consumes the next
/// pre-loaded channel-backed segment; a segment's stream ends when its
/// sender is dropped. The feed records the resume token offered to
/// every subscription, and reports a non-benign error once exhausted.
pub struct MemoryFeed<D> {
    segments: Mutex<VecDeque<flume::Receiver<Result<ChangeEvent<D>, FeedError>>>>,
    resume_log: Mutex<Vec<Option<SequenceToken>>>,
}

impl<D> Default for MemoryFeed<D> {
    fn default() -> Self {
        Self {
            segments: Mutex::new(VecDeque::new()),
            resume_log: Mutex::new(Vec::new()),
        }
    }
}

impl<D> MemoryFeed<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one subscription segment and hand back its sending half.
    pub async fn push_segment(&self) -> flume::Sender<Result<ChangeEvent<D>, FeedError>> {
        let (tx, rx) = flume::unbounded();
        self.segments.lock().await.push_back(rx);
        tx
    }

    /// The resume tokens passed to `subscribe`, in call order.
    pub async fn resume_log(&self) -> Vec<Option<SequenceToken>> {
        self.resume_log.lock().await.clone()
    }
}

#[async_trait]
impl<D: Send + 'static> ChangeFeed for MemoryFeed<D> {
    type Document = D;

    async fn subscribe(
        &self,
        resume_from: Option<SequenceToken>,
    ) -> Result<ChangeStream<D>, FeedError> {
        self.resume_log.lock().await.push(resume_from);
        let segment = self
            .segments
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| FeedError::backend("no remaining feed segments"))?;
        Ok(segment.into_stream().boxed())
    }
}
