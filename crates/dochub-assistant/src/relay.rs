//! Forwarding upstream deltas to a client channel.

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use dochub_core::error::AppError;

use crate::backend::DeltaStream;
use crate::event::ChatEvent;

/// How a relay ended.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream finished; holds the full reply text.
    Completed(String),
    /// The client went away or the token was cancelled.
    Cancelled,
    /// Upstream failed part-way.
    Failed(AppError),
}

/// Send every delta of `upstream` as a `ContentDelta` event.
///
/// Returns as soon as the receiver is dropped or `cancel` fires; the
/// upstream stream is dropped on return, which aborts the upstream call.
pub async fn relay(
    mut upstream: DeltaStream,
    tx: &mpsc::Sender<ChatEvent>,
    cancel: &CancellationToken,
) -> RelayOutcome {
    let mut content = String::new();

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return RelayOutcome::Cancelled,
            _ = tx.closed() => {
                debug!(received = content.len(), "Client disconnected during reply");
                return RelayOutcome::Cancelled;
            }
            next = upstream.next() => match next {
                Some(Ok(delta)) => {
                    if delta.is_empty() {
                        continue;
                    }
                    content.push_str(&delta);
                    if tx.send(ChatEvent::ContentDelta { delta }).await.is_err() {
                        return RelayOutcome::Cancelled;
                    }
                }
                Some(Err(e)) => return RelayOutcome::Failed(e),
                None => return RelayOutcome::Completed(content),
            }
        }
    }
}
