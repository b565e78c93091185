//! Snapshot bus shared by the AgroVision state components.
//!
//! Every mutation produces a new immutable snapshot tagged with a sequential
//! revision. Readers either take the current snapshot or subscribe and await
//! the next one. Internally it uses `tokio::sync::watch`, so a subscriber that
//! falls behind skips straight to the latest snapshot instead of replaying
//! intermediate ones; the state is the message.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Sequential identifier assigned to each published snapshot.
pub type Revision = u64;

/// Immutable view of a state value at a given revision.
pub struct Snapshot<T> {
    revision: Revision,
    value: Arc<T>,
}

impl<T> Snapshot<T> {
    /// Revision at which this snapshot was published. The initial state is revision 0.
    #[must_use]
    pub const fn revision(&self) -> Revision {
        self.revision
    }

    /// Borrow the snapshot value.
    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            revision: self.revision,
            value: Arc::clone(&self.value),
        }
    }
}

impl<T> Deref for Snapshot<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Snapshot")
            .field("revision", &self.revision)
            .field("value", &self.value)
            .finish()
    }
}

/// Single-writer-at-a-time state cell that publishes immutable snapshots.
///
/// Mutations run against a private copy of the current value which replaces
/// the published snapshot only once the closure returns, so readers never
/// observe a half-applied change. Closures passed to [`SnapshotBus::publish`]
/// and [`SnapshotBus::publish_if`] run while the writer lock is held and must
/// not call back into the same bus.
pub struct SnapshotBus<T> {
    sender: Arc<watch::Sender<Snapshot<T>>>,
}

impl<T> Clone for SnapshotBus<T> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
        }
    }
}

impl<T: Clone> SnapshotBus<T> {
    /// Construct a bus holding `initial` at revision 0.
    #[must_use]
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(Snapshot {
            revision: 0,
            value: Arc::new(initial),
        });
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot<T> {
        self.sender.borrow().clone()
    }

    /// Revision of the current snapshot.
    #[must_use]
    pub fn revision(&self) -> Revision {
        self.sender.borrow().revision
    }

    /// Apply `mutate` and publish the result as a new revision.
    pub fn publish(&self, mutate: impl FnOnce(&mut T)) -> Revision {
        self.publish_if(|value| {
            mutate(value);
            true
        })
        .unwrap_or_else(|| self.revision())
    }

    /// Apply `mutate` and publish only when it reports a change.
    ///
    /// When the closure returns `false` its edits are discarded, the revision
    /// stays put and subscribers are not woken.
    pub fn publish_if(&self, mutate: impl FnOnce(&mut T) -> bool) -> Option<Revision> {
        let mut published = None;
        self.sender.send_if_modified(|snapshot| {
            let mut next = T::clone(&snapshot.value);
            if !mutate(&mut next) {
                return false;
            }
            snapshot.revision += 1;
            snapshot.value = Arc::new(next);
            published = Some(snapshot.revision);
            true
        });
        published
    }

    /// Subscribe to future snapshots.
    #[must_use]
    pub fn subscribe(&self) -> SnapshotStream<T> {
        SnapshotStream {
            receiver: self.sender.subscribe(),
        }
    }
}

impl<T: Clone + Default> Default for SnapshotBus<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for SnapshotBus<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SnapshotBus")
            .field("current", &*self.sender.borrow())
            .finish()
    }
}

/// Subscription handle yielding snapshots newer than the last one seen.
pub struct SnapshotStream<T> {
    receiver: watch::Receiver<Snapshot<T>>,
}

impl<T> SnapshotStream<T> {
    /// Snapshot currently published, without marking it as seen.
    #[must_use]
    pub fn current(&self) -> Snapshot<T> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next unseen snapshot. Returns `None` once every bus handle is dropped.
    pub async fn next(&mut self) -> Option<Snapshot<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Whether a snapshot newer than the last one seen is waiting.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }
}

impl<T: Send + Sync + 'static> SnapshotStream<T> {
    /// Convert into a `Stream` that yields the current snapshot first, then every change.
    #[must_use]
    pub fn into_stream(self) -> WatchStream<Snapshot<T>> {
        WatchStream::new(self.receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use tokio::task;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    const RECV_TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn revisions_are_sequential() {
        let bus = SnapshotBus::new(Vec::<u32>::new());
        assert_eq!(bus.revision(), 0);
        assert_eq!(bus.publish(|items| items.push(1)), 1);
        assert_eq!(bus.publish(|items| items.push(2)), 2);
        assert_eq!(bus.snapshot().value(), &vec![1, 2]);
    }

    #[test]
    fn declined_mutations_are_discarded() {
        let bus = SnapshotBus::new(vec![1_u32]);
        let outcome = bus.publish_if(|items| {
            items.push(99);
            false
        });
        assert_eq!(outcome, None);
        assert_eq!(bus.revision(), 0);
        assert_eq!(bus.snapshot().value(), &vec![1]);
    }

    #[test]
    fn held_snapshots_do_not_change() {
        let bus = SnapshotBus::new(String::from("before"));
        let held = bus.snapshot();
        bus.publish(|value| value.push_str(" and after"));
        assert_eq!(held.value(), "before");
        assert_eq!(held.revision(), 0);
        assert_eq!(bus.snapshot().value(), "before and after");
    }

    #[tokio::test]
    async fn subscribers_see_latest_snapshot() {
        let bus = SnapshotBus::new(0_u32);
        let mut stream = bus.subscribe();
        assert!(!stream.has_changed());

        bus.publish(|value| *value = 1);
        bus.publish(|value| *value = 2);
        assert!(stream.has_changed());

        let next = timeout(RECV_TIMEOUT, stream.next())
            .await
            .expect("subscriber timed out")
            .expect("bus closed");
        assert_eq!(next.revision(), 2);
        assert_eq!(*next, 2);
        assert!(!stream.has_changed());
    }

    #[tokio::test]
    async fn stream_ends_when_bus_dropped() {
        let bus = SnapshotBus::new(0_u32);
        let mut stream = bus.subscribe();
        drop(bus);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn watch_stream_yields_current_then_changes() {
        let bus = SnapshotBus::new(5_u32);
        let mut stream = bus.subscribe().into_stream();
        let first = stream.next().await.expect("initial snapshot");
        assert_eq!(*first, 5);
        bus.publish(|value| *value = 6);
        let second = timeout(RECV_TIMEOUT, stream.next())
            .await
            .expect("stream timed out")
            .expect("stream ended");
        assert_eq!(*second, 6);
    }

    #[tokio::test]
    async fn concurrent_writers_never_lose_updates() {
        let bus = SnapshotBus::new(HashSet::<u32>::new());
        let mut writers = Vec::new();
        for worker in 0..4_u32 {
            let bus = bus.clone();
            writers.push(task::spawn(async move {
                for i in 0..50 {
                    bus.publish(|set| {
                        set.insert(worker * 1_000 + i);
                    });
                    task::yield_now().await;
                }
            }));
        }
        for writer in writers {
            writer.await.expect("writer task panicked");
        }
        assert_eq!(bus.snapshot().len(), 200);
        assert_eq!(bus.revision(), 200);
    }
}
