//! Timer-reset-on-change debouncing for rapidly changing values.
//!
//! A [`Debouncer`] accepts raw values (one per keystroke, for example) and
//! publishes a derived value only once the raw value has stopped changing for
//! the configured quiet period.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Publishes the latest raw value after it has been stable for `window`.
///
/// The timer task runs on the tokio runtime that was current when the
/// debouncer was created and stops when the debouncer is dropped. A value
/// still waiting for its quiet period at that point is discarded.
#[derive(Debug)]
pub struct Debouncer<T> {
    raw: watch::Sender<T>,
    debounced: watch::Receiver<T>,
    window: Duration,
    task: JoinHandle<()>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Creates a debouncer whose raw and debounced values both start at `initial`.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn new(initial: T, window: Duration) -> Self {
        let (raw_tx, raw_rx) = watch::channel(initial.clone());
        let (debounced_tx, debounced_rx) = watch::channel(initial);
        let task = tokio::spawn(run_quiet_period_timer(raw_rx, debounced_tx, window));

        Self {
            raw: raw_tx,
            debounced: debounced_rx,
            window,
            task,
        }
    }

    /// Records a new raw value and restarts the quiet period.
    ///
    /// Setting the value it already holds does not restart the timer.
    pub fn set(&self, value: T) {
        self.raw.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });
    }

    /// Latest raw value, debounced or not.
    pub fn current(&self) -> T {
        self.raw.borrow().clone()
    }

    /// Latest published (debounced) value.
    pub fn debounced(&self) -> T {
        self.debounced.borrow().clone()
    }

    /// Receiver notified every time a new debounced value is published.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.debounced.clone()
    }

    /// Quiet period this debouncer waits for.
    pub fn window(&self) -> Duration {
        self.window
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_quiet_period_timer<T>(
    mut raw: watch::Receiver<T>,
    debounced: watch::Sender<T>,
    window: Duration,
) where
    T: Clone + PartialEq,
{
    while raw.changed().await.is_ok() {
        loop {
            tokio::select! {
                () = tokio::time::sleep(window) => break,
                changed = raw.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }

        let value = raw.borrow_and_update().clone();
        let published = debounced.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        });

        if published {
            tracing::trace!(window_ms = window.as_millis() as u64, "Debounced value published");
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::{Instant, sleep};

    use super::*;

    const WINDOW: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_changes_publish_only_final_value() {
        let debouncer = Debouncer::new(String::new(), WINDOW);
        let mut rx = debouncer.subscribe();
        let started = Instant::now();

        debouncer.set("bat".to_string());
        sleep(Duration::from_millis(200)).await;
        debouncer.set("batman".to_string());

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "batman");
        assert!(started.elapsed() >= Duration::from_millis(700));

        sleep(WINDOW * 4).await;
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_published_after_quiet_period() {
        let debouncer = Debouncer::new(0u32, WINDOW);

        debouncer.set(7);
        assert_eq!(debouncer.current(), 7);
        assert_eq!(debouncer.debounced(), 0);

        sleep(Duration::from_millis(499)).await;
        assert_eq!(debouncer.debounced(), 0);

        sleep(Duration::from_millis(2)).await;
        tokio::task::yield_now().await;
        assert_eq!(debouncer.debounced(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returning_to_published_value_is_not_republished() {
        let debouncer = Debouncer::new("x".to_string(), WINDOW);
        let mut rx = debouncer.subscribe();

        debouncer.set("y".to_string());
        debouncer.set("x".to_string());

        sleep(WINDOW * 2).await;
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), "x");
    }

    #[tokio::test(start_paused = true)]
    async fn test_separated_changes_each_publish() {
        let debouncer = Debouncer::new(String::new(), WINDOW);
        let mut rx = debouncer.subscribe();

        debouncer.set("alien".to_string());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "alien");

        debouncer.set("aliens".to_string());
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), "aliens");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_value() {
        let debouncer = Debouncer::new(1u8, WINDOW);
        let mut rx = debouncer.subscribe();

        debouncer.set(2);
        drop(debouncer);

        assert!(rx.changed().await.is_err());
        assert_eq!(*rx.borrow(), 1);
    }
}
