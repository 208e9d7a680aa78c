use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use convo_materializer::gate::batch_gate;
use convo_materializer::pipeline::{run_pipeline, BatchAggregator, BatchOutcome};
use convo_store::{ChangeEvent, CommentEvent};
use tokio::sync::Mutex;

mod common;
use common::comment_event;

/// Records every non-empty batch it receives and flags any overlap
/// between two apply calls.
struct RecordingAggregator {
    batches: Arc<Mutex<Vec<Vec<String>>>>,
    in_flight: Arc<AtomicUsize>,
    overlapped: Arc<AtomicBool>,
    delay: Duration,
}

#[async_trait]
impl BatchAggregator for RecordingAggregator {
    type Event = CommentEvent;

    async fn apply_batch(&self, batch: Vec<ChangeEvent<CommentEvent>>) -> BatchOutcome {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        tokio::time::sleep(self.delay).await;
        let contents: Vec<String> = batch
            .into_iter()
            .map(|event| event.document.content)
            .collect();
        self.batches.lock().await.push(contents);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        BatchOutcome::default()
    }
}

#[tokio::test]
async fn batches_are_serialized_and_nothing_is_lost() {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let overlapped = Arc::new(AtomicBool::new(false));
    let aggregator = RecordingAggregator {
        batches: Arc::clone(&batches),
        in_flight: Arc::new(AtomicUsize::new(0)),
        overlapped: Arc::clone(&overlapped),
        delay: Duration::from_millis(100),
    };

    let (tx, rx) = flume::unbounded();
    let (gate, handle) = batch_gate(rx);
    let pipeline = tokio::spawn(run_pipeline(
        "test",
        gate,
        handle,
        aggregator,
        Duration::from_millis(1),
    ));

    tx.send(comment_event("1", "c1", "u1", "a")).unwrap();
    // Let the first batch start processing, then pile up more events;
    // they must all land in later batches, in order.
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(comment_event("2", "c1", "u1", "b")).unwrap();
    tx.send(comment_event("3", "c1", "u1", "c")).unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    let recorded = batches.lock().await.clone();
    assert_eq!(recorded[0], vec!["a"]);
    let flattened: Vec<String> = recorded.iter().flatten().cloned().collect();
    assert_eq!(flattened, vec!["a", "b", "c"]);
    assert!(
        !overlapped.load(Ordering::SeqCst),
        "two batches were processed at once"
    );

    pipeline.abort();
}

#[tokio::test]
async fn empty_cycles_keep_the_pipeline_live() {
    let batches = Arc::new(Mutex::new(Vec::new()));
    let aggregator = RecordingAggregator {
        batches: Arc::clone(&batches),
        in_flight: Arc::new(AtomicUsize::new(0)),
        overlapped: Arc::new(AtomicBool::new(false)),
        delay: Duration::from_millis(1),
    };

    let (tx, rx) = flume::unbounded();
    let (gate, handle) = batch_gate(rx);
    let pipeline = tokio::spawn(run_pipeline(
        "test",
        gate,
        handle,
        aggregator,
        Duration::from_millis(1),
    ));

    // The gate cycles through empty batches for a while first.
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(comment_event("1", "c1", "u1", "late")).unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let recorded = batches.lock().await.clone();
    assert_eq!(recorded, vec![vec!["late".to_string()]]);

    pipeline.abort();
}
