use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use convo_store::{ChangeEvent, DocumentStore, ReactionEvent, ReactionKind};
use tracing::warn;

use super::update_with_retry;
use crate::pipeline::{BatchAggregator, BatchOutcome};

/// Folds reaction batches into aggregate documents. Increments are
/// summed per (comment index, kind) first, then conversations are
/// processed strictly one after another so at most one
/// read-modify-write cycle is in flight against the store.
pub struct ReactionAggregator<S: ?Sized> {
    store: Arc<S>,
    retry_attempts: u32,
}

impl<S: DocumentStore + ?Sized> ReactionAggregator<S> {
    pub fn new(store: Arc<S>, retry_attempts: u32) -> Self {
        Self {
            store,
            retry_attempts,
        }
    }
}

#[async_trait]
impl<S> BatchAggregator for ReactionAggregator<S>
where
    S: DocumentStore + ?Sized + 'static,
{
    type Event = ReactionEvent;

    async fn apply_batch(&self, batch: Vec<ChangeEvent<ReactionEvent>>) -> BatchOutcome {
        let mut grouped: HashMap<String, HashMap<(usize, ReactionKind), u64>> = HashMap::new();
        for event in batch {
            let reaction = event.document;
            *grouped
                .entry(reaction.conversation_id)
                .or_default()
                .entry((reaction.comment_index, reaction.reaction_kind))
                .or_insert(0) += 1;
        }

        let mut outcome = BatchOutcome {
            conversations: grouped.len(),
            ..Default::default()
        };
        for (conversation, deltas) in grouped {
            let result = update_with_retry(
                self.store.as_ref(),
                &conversation,
                self.retry_attempts,
                |doc| {
                    for ((index, kind), delta) in &deltas {
                        // The entry may not be materialized yet: the
                        // comment pipeline runs independently with no
                        // cross-pipeline ordering guarantee.
                        if let Some(entry) = doc.comments.get_mut(*index) {
                            entry.reactions.add(*kind, *delta);
                        }
                    }
                },
            )
            .await;
            match result {
                Ok(stored) => {
                    let dropped = deltas
                        .keys()
                        .filter(|(index, _)| *index >= stored.comments.len())
                        .count();
                    if dropped > 0 {
                        warn!(
                            "{}: dropped {} reaction deltas with no matching comment entry",
                            conversation, dropped
                        );
                        outcome.dropped += dropped;
                    }
                }
                Err(err) => outcome.failures.push((conversation, err)),
            }
        }
        outcome
    }
}
