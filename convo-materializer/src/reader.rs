use std::sync::Arc;

use convo_store::{ChangeEvent, ChangeFeed, FeedError, SequenceToken};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Tails one change feed forever, forwarding every event into the
/// pipeline's event channel in arrival order.
///
/// A clean disconnect (stream end or benign error) is recovered by
/// resubscribing immediately with the last observed sequence token.
/// A non-benign error ends the task without crashing the process;
/// the other pipeline keeps running.
pub fn spawn_reader<F>(
    name: &'static str,
    feed: Arc<F>,
    events: flume::Sender<ChangeEvent<F::Document>>,
) -> JoinHandle<()>
where
    F: ChangeFeed + ?Sized + 'static,
{
    tokio::spawn(async move {
        let mut resume: Option<SequenceToken> = None;
        loop {
            let mut stream = match feed.subscribe(resume.clone()).await {
                Ok(stream) => stream,
                Err(err) => {
                    error!("{}: subscribe failed, reader stopping: {}", name, err);
                    return;
                }
            };
            while let Some(item) = stream.next().await {
                match item {
                    Ok(event) => {
                        resume = Some(event.seq.clone());
                        if events.send(event).is_err() {
                            debug!("{}: event channel closed, reader stopping", name);
                            return;
                        }
                    }
                    Err(err) if err.is_benign() => {
                        if let FeedError::Disconnected {
                            last_seq: Some(seq),
                        } = &err
                        {
                            resume = Some(seq.clone());
                        }
                        info!("{}: feed disconnected, resubscribing", name);
                        break;
                    }
                    Err(err) => {
                        error!("{}: feed failed, reader stopping: {}", name, err);
                        return;
                    }
                }
            }
            // Stream ended without an error: treat it as a clean
            // disconnect and resubscribe from the last token.
        }
    })
}
