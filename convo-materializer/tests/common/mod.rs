#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use convo_store::memory::MemoryStore;
use convo_store::{
    AggregateDocument, ChangeEvent, CommentEvent, DocumentStore, ReactionEvent, ReactionKind,
    SequenceToken, StoreError, StoreResult,
};

pub fn comment_event(
    seq: &str,
    conversation: &str,
    sender: &str,
    content: &str,
) -> ChangeEvent<CommentEvent> {
    ChangeEvent::new(
        CommentEvent {
            conversation_id: conversation.to_string(),
            sender_id: sender.to_string(),
            content: content.to_string(),
        },
        SequenceToken::new(seq),
    )
}

pub fn reaction_event(
    seq: &str,
    conversation: &str,
    index: usize,
    kind: ReactionKind,
) -> ChangeEvent<ReactionEvent> {
    ChangeEvent::new(
        ReactionEvent {
            conversation_id: conversation.to_string(),
            comment_index: index,
            reaction_kind: kind,
        },
        SequenceToken::new(seq),
    )
}

/// Wraps a store, holding every operation open for a fixed delay and
/// tracking how many operations overlap. Lets tests observe whether an
/// aggregator runs its cycles sequentially or concurrently.
pub struct ProbeStore {
    inner: MemoryStore,
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ProbeStore {
    pub fn new(inner: MemoryStore, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
    }

    fn exit(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DocumentStore for ProbeStore {
    async fn get_document(&self, id: &str) -> StoreResult<AggregateDocument> {
        self.enter().await;
        let result = self.inner.get_document(id).await;
        self.exit();
        result
    }

    async fn put_document(&self, doc: AggregateDocument) -> StoreResult<AggregateDocument> {
        self.enter().await;
        let result = self.inner.put_document(doc).await;
        self.exit();
        result
    }
}

/// Rejects the first N puts with a revision conflict, then delegates.
pub struct ConflictStore {
    inner: MemoryStore,
    rejects: AtomicUsize,
}

impl ConflictStore {
    pub fn new(inner: MemoryStore, rejects: usize) -> Self {
        Self {
            inner,
            rejects: AtomicUsize::new(rejects),
        }
    }
}

#[async_trait]
impl DocumentStore for ConflictStore {
    async fn get_document(&self, id: &str) -> StoreResult<AggregateDocument> {
        self.inner.get_document(id).await
    }

    async fn put_document(&self, doc: AggregateDocument) -> StoreResult<AggregateDocument> {
        if self.rejects.load(Ordering::SeqCst) > 0 {
            self.rejects.fetch_sub(1, Ordering::SeqCst);
            return Err(StoreError::Conflict);
        }
        self.inner.put_document(doc).await
    }
}

/// Fails every operation touching one poisoned document id.
pub struct FailStore {
    inner: MemoryStore,
    fail_id: String,
}

impl FailStore {
    pub fn new(inner: MemoryStore, fail_id: &str) -> Self {
        Self {
            inner,
            fail_id: fail_id.to_string(),
        }
    }
}

#[async_trait]
impl DocumentStore for FailStore {
    async fn get_document(&self, id: &str) -> StoreResult<AggregateDocument> {
        if id == self.fail_id {
            return Err(StoreError::backend("injected failure"));
        }
        self.inner.get_document(id).await
    }

    async fn put_document(&self, doc: AggregateDocument) -> StoreResult<AggregateDocument> {
        if doc.id == self.fail_id {
            return Err(StoreError::backend("injected failure"));
        }
        self.inner.put_document(doc).await
    }
}
