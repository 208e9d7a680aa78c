use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use convo_store::{ChangeEvent, CommentEntry, CommentEvent, DocumentStore};
use futures_util::future::join_all;

use super::update_with_retry;
use crate::pipeline::{BatchAggregator, BatchOutcome};

/// Folds comment batches into aggregate documents: one read-merge-write
/// cycle per conversation, issued concurrently since different
/// conversations touch different documents.
pub struct CommentAggregator<S: ?Sized> {
    store: Arc<S>,
    retry_attempts: u32,
}

impl<S: DocumentStore + ?Sized> CommentAggregator<S> {
    pub fn new(store: Arc<S>, retry_attempts: u32) -> Self {
        Self {
            store,
            retry_attempts,
        }
    }
}

#[async_trait]
impl<S> BatchAggregator for CommentAggregator<S>
where
    S: DocumentStore + ?Sized + 'static,
{
    type Event = CommentEvent;

    async fn apply_batch(&self, batch: Vec<ChangeEvent<CommentEvent>>) -> BatchOutcome {
        // Group by conversation, preserving arrival order within each
        // group; new entries start with all-zero reaction counts.
        let mut grouped: HashMap<String, Vec<CommentEntry>> = HashMap::new();
        for event in batch {
            let comment = event.document;
            grouped
                .entry(comment.conversation_id)
                .or_default()
                .push(CommentEntry::new(comment.content, comment.sender_id));
        }

        let mut outcome = BatchOutcome {
            conversations: grouped.len(),
            ..Default::default()
        };
        let updates = grouped.into_iter().map(|(conversation, entries)| {
            let store = Arc::clone(&self.store);
            let attempts = self.retry_attempts;
            async move {
                let result = update_with_retry(store.as_ref(), &conversation, attempts, |doc| {
                    doc.comments.extend(entries.iter().cloned());
                })
                .await;
                (conversation, result)
            }
        });
        for (conversation, result) in join_all(updates).await {
            if let Err(err) = result {
                outcome.failures.push((conversation, err));
            }
        }
        outcome
    }
}
