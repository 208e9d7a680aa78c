mod comment;
mod reaction;

pub use comment::CommentAggregator;
pub use reaction::ReactionAggregator;

use convo_store::{AggregateDocument, DocumentStore, StoreError, StoreResult};
use tracing::debug;

/// Optimistic read-merge-write cycle against one aggregate document.
///
/// On a revision conflict the cycle re-fetches and re-applies the same
/// delta, up to `attempts` tries; the merge closure must therefore be
/// safe to run against any fresh copy. A missing document starts the
/// merge from an empty one (lazy creation).
pub(crate) async fn update_with_retry<S, M>(
    store: &S,
    id: &str,
    attempts: u32,
    merge: M,
) -> StoreResult<AggregateDocument>
where
    S: DocumentStore + ?Sized,
    M: Fn(&mut AggregateDocument),
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        let mut doc = match store.get_document(id).await {
            Ok(doc) => doc,
            Err(StoreError::NotFound) => AggregateDocument::new(id),
            Err(err) => return Err(err),
        };
        merge(&mut doc);
        match store.put_document(doc).await {
            Ok(stored) => return Ok(stored),
            Err(StoreError::Conflict) if attempt < attempts => {
                debug!("conflict writing {}, retrying (attempt {})", id, attempt);
            }
            Err(err) => return Err(err),
        }
    }
}
