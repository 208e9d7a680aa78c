use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::{FeedError, StoreResult};
use crate::types::{AggregateDocument, CatalogDocument, ChangeEvent, SequenceToken};

/// Stream of changes from one feed subscription. The stream may
/// terminate; the caller is responsible for resubscribing.
pub type ChangeStream<D> = BoxStream<'static, Result<ChangeEvent<D>, FeedError>>;

/// Read/write-by-id access to the aggregate document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id. `StoreError::NotFound` if absent.
    async fn get_document(&self, id: &str) -> StoreResult<AggregateDocument>;

    /// Write a document, creating it when it carries no revision.
    /// Returns the stored document with its new revision.
    /// `StoreError::Conflict` when the stored revision has moved since
    /// the document was fetched.
    async fn put_document(&self, doc: AggregateDocument) -> StoreResult<AggregateDocument>;
}

/// Source of the bootstrap catalog document.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_catalog(&self, id: &str) -> StoreResult<CatalogDocument>;
}

/// A subscribable change feed over one ingress database.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    type Document: Send;

    /// Open a new subscription, optionally resuming after a known
    /// sequence token.
    async fn subscribe(
        &self,
        resume_from: Option<SequenceToken>,
    ) -> Result<ChangeStream<Self::Document>, FeedError>;
}
