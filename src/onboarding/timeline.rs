//! Offset timeline: a list of `(offset, entry)` pairs driven by one task.
//!
//! Entries fire in offset order relative to the moment the timeline is
//! spawned. Equal offsets keep their insertion order. Cancelling stops every
//! pending entry at once; a cancelled timeline never fires again. An entry
//! whose handler is already running is left to finish.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

/// High bit of the shared state word marks cancellation; the rest counts
/// entries that have been claimed for firing.
const CANCELLED: usize = 1 << (usize::BITS - 1);

/// Unstarted schedule.
#[derive(Debug)]
pub struct Timeline<E> {
    entries: Vec<(Duration, E)>,
}

impl<E> Default for Timeline<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E: Send + 'static> Timeline<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn at(mut self, offset: Duration, entry: E) -> Self {
        self.push(offset, entry);
        self
    }

    pub fn push(&mut self, offset: Duration, entry: E) {
        self.entries.push((offset, entry));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in firing order.
    pub fn entries(&self) -> Vec<&(Duration, E)> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by_key(|(offset, _)| *offset);
        sorted
    }

    /// Start the clock. `handler` runs once per entry, in order, on a single
    /// spawned task. Must be called within a tokio runtime.
    pub fn spawn<F, Fut>(self, mut handler: F) -> TimelineHandle
    where
        F: FnMut(E) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut entries = self.entries;
        entries.sort_by_key(|(offset, _)| *offset);
        let scheduled = entries.len();
        let shared = Arc::new(Shared {
            state: AtomicUsize::new(0),
            cancel: Notify::new(),
        });
        let start = Instant::now();

        let task_shared = Arc::clone(&shared);
        let task = tokio::spawn(async move {
            for (offset, entry) in entries {
                tokio::select! {
                    _ = sleep_until(start + offset) => {}
                    _ = task_shared.cancel.notified() => return,
                }
                if !task_shared.claim() {
                    return;
                }
                handler(entry).await;
            }
        });

        TimelineHandle {
            scheduled,
            shared,
            task,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: AtomicUsize,
    cancel: Notify,
}

impl Shared {
    /// Count the next entry as fired unless the timeline was cancelled.
    fn claim(&self) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                if s & CANCELLED != 0 { None } else { Some(s + 1) }
            })
            .is_ok()
    }
}

/// Owner of a running timeline. Dropping the handle cancels it.
#[derive(Debug)]
pub struct TimelineHandle {
    scheduled: usize,
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl TimelineHandle {
    /// Number of entries the timeline started with.
    pub fn scheduled(&self) -> usize {
        self.scheduled
    }

    /// Number of entries that have fired (or are firing).
    pub fn fired(&self) -> usize {
        self.shared.state.load(Ordering::Acquire) & !CANCELLED
    }

    pub fn is_cancelled(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) & CANCELLED != 0
    }

    /// The task has exited: every entry fired, or it was cancelled and
    /// the entry in flight returned.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel every pending entry and return how many were cancelled.
    /// Calling it again returns 0.
    pub fn cancel(&mut self) -> usize {
        let previous = self.shared.state.fetch_or(CANCELLED, Ordering::AcqRel);
        if previous & CANCELLED != 0 {
            return 0;
        }
        // Stored as a permit if the task is mid-handler.
        self.shared.cancel.notify_one();
        self.scheduled - (previous & !CANCELLED)
    }
}

impl Drop for TimelineHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder() -> (
        Log,
        impl FnMut(&'static str) -> std::future::Ready<()> + Send + 'static,
    ) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |entry| {
            sink.lock().unwrap().push(entry);
            std::future::ready(())
        })
    }

    #[tokio::test]
    async fn fires_in_offset_order() {
        let (log, handler) = recorder();
        let handle = Timeline::new()
            .at(ms(30), "c")
            .at(ms(0), "a")
            .at(ms(10), "b1")
            .at(ms(10), "b2")
            .spawn(handler);
        assert_eq!(handle.scheduled(), 4);

        tokio::time::timeout(ms(2000), async {
            while !handle.is_finished() {
                tokio::time::sleep(ms(5)).await;
            }
        })
        .await
        .unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a", "b1", "b2", "c"]);
        assert_eq!(handle.fired(), 4);
    }

    #[tokio::test]
    async fn cancel_stops_pending_entries() {
        let (log, handler) = recorder();
        let mut handle = Timeline::new()
            .at(ms(0), "now")
            .at(ms(200), "later")
            .at(ms(300), "much later")
            .spawn(handler);

        tokio::time::sleep(ms(50)).await;
        let cancelled = handle.cancel();
        assert_eq!(cancelled, 2);
        assert_eq!(handle.fired() + cancelled, handle.scheduled());
        assert_eq!(handle.cancel(), 0);

        tokio::time::sleep(ms(400)).await;
        assert_eq!(*log.lock().unwrap(), vec!["now"]);
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn cancel_lets_running_entry_finish() {
        let log: Log = Arc::default();
        let sink = Arc::clone(&log);
        let mut handle = Timeline::new()
            .at(ms(0), "slow")
            .at(ms(50), "next")
            .spawn(move |entry| {
                let sink = Arc::clone(&sink);
                async move {
                    tokio::time::sleep(ms(100)).await;
                    sink.lock().unwrap().push(entry);
                }
            });

        tokio::time::sleep(ms(20)).await;
        assert_eq!(handle.cancel(), 1);
        assert_eq!(handle.fired(), 1);

        tokio::time::sleep(ms(250)).await;
        assert_eq!(*log.lock().unwrap(), vec!["slow"]);
        assert!(handle.is_finished());
    }

    #[tokio::test]
    async fn drop_cancels() {
        let (log, handler) = recorder();
        let handle = Timeline::new().at(ms(50), "never").spawn(handler);
        drop(handle);
        tokio::time::sleep(ms(150)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn entries_are_sorted() {
        let timeline = Timeline::new().at(ms(5), 2).at(ms(1), 1);
        let offsets: Vec<_> = timeline.entries().iter().map(|(o, _)| *o).collect();
        assert_eq!(offsets, vec![ms(1), ms(5)]);
        assert_eq!(timeline.len(), 2);
    }
}
