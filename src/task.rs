//! Background task plumbing
//!
//! Async results are handed back to the frame loop through a shared slot:
//! the dialog owns a [`PendingSlot`], the spawned future holds a
//! [`SlotWriter`]. The writer only keeps a weak reference, so once the dialog
//! drops its slot (closed, cancelled, replaced) a late result is discarded
//! instead of being applied to state that no longer exists.

use std::future::Future;
use std::sync::{Arc, Mutex, Weak};

/// Owner side of a one-shot result slot.
pub struct PendingSlot<T> {
    slot: Arc<Mutex<Option<T>>>,
}

/// Producer side of a one-shot result slot.
pub struct SlotWriter<T> {
    slot: Weak<Mutex<Option<T>>>,
}

impl<T> PendingSlot<T> {
    pub fn new() -> (Self, SlotWriter<T>) {
        let slot = Arc::new(Mutex::new(None));
        let writer = SlotWriter {
            slot: Arc::downgrade(&slot),
        };
        (Self { slot }, writer)
    }

    /// Take the delivered value, if it has arrived.
    pub fn take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take()
    }
}

impl<T> SlotWriter<T> {
    /// Store `value` for the owner. Returns `false` when the owner is gone
    /// and the value was dropped.
    pub fn deliver(self, value: T) -> bool {
        match self.slot.upgrade() {
            Some(slot) => {
                *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(value);
                true
            }
            None => {
                tracing::debug!("owner closed before result arrived; discarding");
                false
            }
        }
    }
}

/// Spawn `fut` on `handle` and return the slot its output will land in.
pub fn spawn_pending<T, F>(handle: &tokio::runtime::Handle, fut: F) -> PendingSlot<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    let (slot, writer) = PendingSlot::new();
    handle.spawn(async move {
        writer.deliver(fut.await);
    });
    slot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_value_is_taken_once() {
        let (slot, writer) = PendingSlot::new();
        assert!(slot.take().is_none());
        assert!(writer.deliver(7));
        assert_eq!(slot.take(), Some(7));
        assert_eq!(slot.take(), None);
    }

    #[test]
    fn delivery_after_owner_dropped_is_discarded() {
        let (slot, writer) = PendingSlot::<u32>::new();
        drop(slot);
        assert!(!writer.deliver(7));
    }

    #[tokio::test]
    async fn spawn_pending_fills_slot() {
        let slot = spawn_pending(&tokio::runtime::Handle::current(), async { "done" });
        let mut value = None;
        for _ in 0..100 {
            value = slot.take();
            if value.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(value, Some("done"));
    }
}
