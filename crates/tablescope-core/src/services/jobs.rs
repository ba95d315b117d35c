//! Cancellable background jobs for store I/O.
//!
//! Store calls are the only operations expected to block, so they run as
//! spawned tasks whose completion is delivered back to the single owner as
//! a discrete [`Event`] on a channel. The owner mutates its result set only
//! while draining events, which keeps the single-writer discipline without
//! any locking in the engine itself.
//!
//! Cancellation drops the in-flight future: results fetched so far are
//! discarded rather than published as a partial result set, and a
//! [`Event::Cancelled`] marker is delivered instead.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::events::Event;

/// Spawns store I/O as cancellable tasks and funnels their completions into
/// a single event channel.
#[derive(Debug)]
pub struct JobRunner {
    events: mpsc::UnboundedSender<Event>,
}

/// A handle to one in-flight job.
#[derive(Debug)]
pub struct JobHandle {
    cancel: Arc<Notify>,
    join: JoinHandle<()>,
}

impl JobRunner {
    /// Create a runner and the receiving end of its event channel.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Event>) {
        let (events, rx) = mpsc::unbounded_channel();
        (Self { events }, rx)
    }

    /// Spawn `job` as a background task. Its resulting event is delivered on
    /// the runner's channel; if the handle cancels first, the future is
    /// dropped and [`Event::Cancelled`] is delivered instead.
    pub fn submit<F>(&self, job: F) -> JobHandle
    where
        F: Future<Output = Event> + Send + 'static,
    {
        let cancel = Arc::new(Notify::new());
        let cancelled = cancel.clone();
        let events = self.events.clone();

        let join = tokio::spawn(async move {
            tokio::select! {
                () = cancelled.notified() => {
                    debug!("job cancelled; discarding partial results");
                    let _ = events.send(Event::Cancelled);
                }
                event = job => {
                    let _ = events.send(event);
                }
            }
        });

        JobHandle { cancel, join }
    }
}

impl JobHandle {
    /// Signal the job to stop. The in-flight future is dropped at its next
    /// await point; anything it had fetched is discarded.
    pub fn cancel(&self) {
        self.cancel.notify_one();
    }

    /// Returns `true` once the task has finished (completed or cancelled).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait for the task to finish.
    pub async fn join(self) {
        let _ = self.join.await;
    }
}
