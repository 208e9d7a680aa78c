use std::time::Duration;

use async_trait::async_trait;
use convo_store::{ChangeEvent, StoreError};
use tracing::{debug, warn};

use crate::gate::{BatchGate, GateHandle};

/// Result of folding one batch into the aggregate store.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Distinct conversations touched by the batch.
    pub conversations: usize,
    /// Per-conversation failures. The batch as a whole still counts as
    /// processed; failures are reported after the gate re-arms.
    pub failures: Vec<(String, StoreError)>,
    /// Reaction deltas dropped for lack of a matching comment entry.
    pub dropped: usize,
}

/// One aggregation stage: folds a batch of change events into the
/// aggregate store.
#[async_trait]
pub trait BatchAggregator: Send + Sync {
    type Event: Send;

    async fn apply_batch(&self, batch: Vec<ChangeEvent<Self::Event>>) -> BatchOutcome;
}

/// Drives one pipeline: take a batch, fold it, re-arm the gate.
///
/// The completion signal fires even when individual writes failed, so
/// a bad batch can never stall the gate. Empty batches re-arm after a
/// short delay to keep the idle loop cool.
pub async fn run_pipeline<A>(
    name: &'static str,
    mut gate: BatchGate<ChangeEvent<A::Event>>,
    handle: GateHandle,
    aggregator: A,
    empty_batch_delay: Duration,
) where
    A: BatchAggregator,
{
    while let Some(batch) = gate.next_batch().await {
        if batch.is_empty() {
            tokio::time::sleep(empty_batch_delay).await;
            handle.complete();
            continue;
        }
        let size = batch.len();
        let outcome = aggregator.apply_batch(batch).await;
        handle.complete();
        debug!(
            "{}: folded {} events into {} conversations",
            name, size, outcome.conversations
        );
        for (conversation, err) in &outcome.failures {
            warn!(
                "{}: failed to update conversation {}: {}",
                name, conversation, err
            );
        }
    }
    debug!("{}: gate closed, pipeline stopping", name);
}
