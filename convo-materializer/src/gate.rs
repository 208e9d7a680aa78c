use tokio::sync::mpsc;
use tracing::debug;

/// Pairs an unbounded event channel with a completion signal, yielding
/// discrete batches: one batch is released only after the previous
/// one's completion signal has fired. This is the serialization
/// primitive that keeps aggregation cycles from overlapping on the
/// same documents.
///
/// The gate starts open: the first `next_batch` call drains whatever
/// has accumulated without waiting for a signal.
pub fn batch_gate<T>(events: flume::Receiver<T>) -> (BatchGate<T>, GateHandle) {
    let (ready_tx, ready_rx) = mpsc::channel(1);
    // Prime the gate so the first batch is released immediately.
    let _ = ready_tx.try_send(());
    (
        BatchGate {
            events,
            ready: ready_rx,
        },
        GateHandle { ready: ready_tx },
    )
}

pub struct BatchGate<T> {
    events: flume::Receiver<T>,
    ready: mpsc::Receiver<()>,
}

impl<T> BatchGate<T> {
    /// Waits for the previous batch's completion signal, then drains
    /// every event accumulated so far into one ordered batch. The
    /// batch may be empty; the consumer must still re-arm the gate.
    /// Returns `None` once every `GateHandle` has been dropped.
    pub async fn next_batch(&mut self) -> Option<Vec<T>> {
        self.ready.recv().await?;
        let mut batch = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            batch.push(event);
        }
        Some(batch)
    }
}

/// Completion side of the gate. Fired exactly once per delivered
/// batch, after all of the batch's writes have settled.
#[derive(Clone)]
pub struct GateHandle {
    ready: mpsc::Sender<()>,
}

impl GateHandle {
    pub fn complete(&self) {
        if self.ready.try_send(()).is_err() {
            debug!("gate already armed; duplicate completion ignored");
        }
    }
}
