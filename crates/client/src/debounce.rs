//! Input debouncing for search-as-you-type.
//!
//! A background task holds the latest pushed value and emits it once no new
//! value has arrived for the debounce delay. Intermediate values are
//! dropped, so a search only runs for the text the user settled on.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Delay applied to search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Emits the most recent pushed value after a quiet period.
pub struct Debouncer<T> {
    input: mpsc::UnboundedSender<T>,
    output: mpsc::UnboundedReceiver<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Start a debouncer with the given quiet period.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        let (input, mut pending) = mpsc::unbounded_channel::<T>();
        let (emit, output) = mpsc::unbounded_channel::<T>();

        let task = tokio::spawn(async move {
            while let Some(mut latest) = pending.recv().await {
                loop {
                    match timeout(delay, pending.recv()).await {
                        Ok(Some(newer)) => latest = newer,
                        // Input closed: flush what we have and stop
                        Ok(None) => {
                            let _ = emit.send(latest);
                            return;
                        }
                        Err(_) => break,
                    }
                }
                if emit.send(latest).is_err() {
                    return;
                }
            }
        });

        Self {
            input,
            output,
            task,
        }
    }

    /// Push a new value, restarting the quiet period.
    ///
    /// Returns `false` if the background task has stopped.
    pub fn push(&self, value: T) -> bool {
        self.input.send(value).is_ok()
    }

    /// Wait for the next settled value.
    ///
    /// Returns `None` once the background task has stopped.
    pub async fn next(&mut self) -> Option<T> {
        self.output.recv().await
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tokio::time::{Instant, sleep};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_latest_value_is_emitted() {
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        let start = Instant::now();

        debouncer.push("j");
        debouncer.push("ja");
        debouncer.push("jan");

        assert_eq!(debouncer.next().await, Some("jan"));
        assert!(start.elapsed() >= SEARCH_DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_quiet_period_restarts_on_each_push() {
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        let start = Instant::now();

        debouncer.push("a");
        sleep(Duration::from_millis(200)).await;
        debouncer.push("ab");

        assert_eq!(debouncer.next().await, Some("ab"));
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_emit_separately() {
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);

        debouncer.push("first");
        sleep(Duration::from_millis(400)).await;
        debouncer.push("second");

        assert_eq!(debouncer.next().await, Some("first"));
        assert_eq!(debouncer.next().await, Some("second"));
    }
}
