pub mod aggregate;
pub mod gate;
pub mod pipeline;
pub mod reader;
pub mod seeder;

use std::sync::Arc;
use std::time::Duration;

use envconfig::Envconfig;
use tokio::task::JoinHandle;

use convo_store::{CatalogSource, ChangeFeed, CommentEvent, DocumentStore, ReactionEvent};

use aggregate::{CommentAggregator, ReactionAggregator};
use gate::batch_gate;
use pipeline::run_pipeline;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "CONVO_CATALOG_ID", default = "hot")]
    pub catalog_id: String,
    #[envconfig(from = "CONVO_EMPTY_BATCH_DELAY_MS", default = "10")]
    pub empty_batch_delay_ms: u64,
    #[envconfig(from = "CONVO_WRITE_RETRY_ATTEMPTS", default = "3")]
    pub write_retry_attempts: u32,
}

/// The collaborators the engine runs against. The production document
/// store client lives outside this crate; tests and the dev binary
/// wire the in-memory implementations from `convo_store::memory`.
pub struct MaterializerDeps {
    pub comment_feed: Arc<dyn ChangeFeed<Document = CommentEvent>>,
    pub reaction_feed: Arc<dyn ChangeFeed<Document = ReactionEvent>>,
    pub store: Arc<dyn DocumentStore>,
    pub catalog: Arc<dyn CatalogSource>,
}

pub struct Materializer {
    pub tasks: Vec<JoinHandle<()>>,
}

/// Seeds the catalog, then spawns the two pipelines: each gets its own
/// feed reader, event channel, batch gate, and driver task. The
/// pipelines share the aggregate store but never a gate.
pub async fn start_materializer(conf: &Config, deps: MaterializerDeps) -> Materializer {
    seeder::seed_catalog(
        deps.catalog.as_ref(),
        deps.store.as_ref(),
        &conf.catalog_id,
    )
    .await;

    let empty_delay = Duration::from_millis(conf.empty_batch_delay_ms);
    let mut tasks = Vec::new();

    let (comment_tx, comment_rx) = flume::unbounded();
    tasks.push(reader::spawn_reader(
        "comments",
        deps.comment_feed,
        comment_tx,
    ));
    let (gate, handle) = batch_gate(comment_rx);
    let aggregator = CommentAggregator::new(Arc::clone(&deps.store), conf.write_retry_attempts);
    tasks.push(tokio::spawn(run_pipeline(
        "comments",
        gate,
        handle,
        aggregator,
        empty_delay,
    )));

    let (reaction_tx, reaction_rx) = flume::unbounded();
    tasks.push(reader::spawn_reader(
        "reactions",
        deps.reaction_feed,
        reaction_tx,
    ));
    let (gate, handle) = batch_gate(reaction_rx);
    let aggregator = ReactionAggregator::new(Arc::clone(&deps.store), conf.write_retry_attempts);
    tasks.push(tokio::spawn(run_pipeline(
        "reactions",
        gate,
        handle,
        aggregator,
        empty_delay,
    )));

    Materializer { tasks }
}
