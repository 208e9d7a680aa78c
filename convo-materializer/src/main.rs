use std::error::Error;
use std::sync::Arc;

use convo_materializer::{start_materializer, Config, MaterializerDeps};
use convo_store::memory::{MemoryCatalog, MemoryFeed, MemoryStore};
use convo_store::{CommentEvent, ReactionEvent};
use envconfig::Envconfig;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_log();
    let conf = Config::init_from_env()?;

    // Local development wiring: in-memory collaborators stand in for
    // the document store client. Each feed gets one open segment whose
    // sender is held until shutdown so the readers stay subscribed.
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(MemoryCatalog::new());
    let comment_feed: Arc<MemoryFeed<CommentEvent>> = Arc::new(MemoryFeed::new());
    let reaction_feed: Arc<MemoryFeed<ReactionEvent>> = Arc::new(MemoryFeed::new());
    let _comment_tx = comment_feed.push_segment().await;
    let _reaction_tx = reaction_feed.push_segment().await;

    let materializer = start_materializer(
        &conf,
        MaterializerDeps {
            comment_feed,
            reaction_feed,
            store,
            catalog,
        },
    )
    .await;
    info!("materializer running");

    match signal::ctrl_c().await {
        Ok(()) => {}
        Err(err) => {
            eprintln!("Unable to listen for shutdown signal: {}", err);
            // we also shut down in case of error
        }
    }
    info!("shutting down");
    for task in materializer.tasks {
        task.abort();
    }
    Ok(())
}

fn init_log() {
    use tracing::level_filters::LevelFilter;
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("CONVO_LOG")
                .from_env_lossy(),
        )
        .init();
}
