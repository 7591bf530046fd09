//! Background fetch worker
//!
//! Runs posts requests on tokio tasks and hands the results back to the UI
//! loop through a channel, so the terminal keeps redrawing while a request
//! is in flight.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::debug;

use crate::data::{FetchError, Post, PostsSource};

/// Result of a background fetch, delivered to the main loop
#[derive(Debug)]
pub struct FetchMessage {
    /// Outcome of `get_all_posts`
    pub result: Result<Vec<Post>, FetchError>,
}

/// Handle owning the channel between fetch tasks and the UI loop
pub struct FetchWorker {
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
}

impl FetchWorker {
    /// Creates a worker with an empty channel
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(8);
        Self { sender, receiver }
    }

    /// Spawns a task that fetches from `source` and posts the result back
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, source: Arc<dyn PostsSource>) {
        let tx = self.sender.clone();
        tokio::spawn(async move {
            let result = source.get_all_posts().await;
            if tx.send(FetchMessage { result }).await.is_err() {
                debug!("Fetch result dropped, receiver closed");
            }
        });
    }

    /// Returns a finished fetch without blocking, if one is waiting
    pub fn try_recv(&mut self) -> Option<FetchMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the next finished fetch
    pub async fn recv(&mut self) -> Option<FetchMessage> {
        self.receiver.recv().await
    }
}

impl Default for FetchWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::tests::{post, ScriptedSource};

    #[tokio::test]
    async fn test_try_recv_empty_when_nothing_spawned() {
        let mut worker = FetchWorker::new();
        assert!(worker.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_spawned_fetch_delivers_result() {
        let mut worker = FetchWorker::new();
        let source = ScriptedSource::new(vec![Ok(vec![post(1, "a", "b")])], None);

        worker.spawn(Arc::new(source));
        let message = worker.recv().await.expect("Should receive a result");

        let posts = message.result.expect("Fetch should succeed");
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 1);
    }

    #[tokio::test]
    async fn test_spawned_fetch_delivers_failure() {
        let mut worker = FetchWorker::new();
        let source = ScriptedSource::new(vec![Err(FetchError::Timeout)], None);

        worker.spawn(Arc::new(source));
        let message = worker.recv().await.unwrap();

        assert!(matches!(message.result, Err(FetchError::Timeout)));
    }
}
