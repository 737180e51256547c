use crate::errors::BridgeError;
use schema::RawFrame;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct SlotState {
    frame: Option<RawFrame>,
    closed: bool,
    published: u64,
    skipped: u64,
}

/// Single-frame mailbox between the capture producer and the detection worker.
///
/// Publishing never blocks and never queues: a frame that has not been taken
/// yet is replaced by the newer one and counted as skipped. The consumer
/// therefore always sees the freshest frame and the backlog is bounded to one.
#[derive(Debug, Default)]
pub struct FrameSlot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SlotState> {
        // The state is plain counters and an Option, always left consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `frame` as the latest one. Returns `true` when it replaced a
    /// frame the consumer never took.
    pub fn publish(&self, frame: RawFrame) -> Result<bool, BridgeError> {
        let mut state = self.lock();
        if state.closed {
            return Err(BridgeError::Closed);
        }

        state.published += 1;
        let replaced = state.frame.replace(frame);
        if let Some(_old) = &replaced {
            state.skipped += 1;
            #[cfg(feature = "tracing")]
            tracing::trace!(
                frame_number = _old.frame_number(),
                skipped = state.skipped,
                "Dropped unprocessed frame in favour of newer one"
            );
        }
        drop(state);

        self.ready.notify_one();
        Ok(replaced.is_some())
    }

    /// Block until a frame is available and take it.
    ///
    /// Returns `None` once the slot is closed; a frame still pending at close
    /// time is discarded.
    pub fn take_latest(&self) -> Option<RawFrame> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Some(frame) = state.frame.take() {
                return Some(frame);
            }
            state = self
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Like `take_latest` but gives up after `timeout`.
    pub fn take_timeout(&self, timeout: Duration) -> Option<RawFrame> {
        let state = self.lock();
        let (mut state, _) = self
            .ready
            .wait_timeout_while(state, timeout, |s| !s.closed && s.frame.is_none())
            .unwrap_or_else(PoisonError::into_inner);

        if state.closed {
            return None;
        }
        state.frame.take()
    }

    pub fn try_take(&self) -> Option<RawFrame> {
        let mut state = self.lock();
        if state.closed {
            return None;
        }
        state.frame.take()
    }

    /// Close the slot and wake every waiting consumer. Idempotent.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.frame = None;
        drop(state);
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn has_pending(&self) -> bool {
        self.lock().frame.is_some()
    }

    pub fn published(&self) -> u64 {
        self.lock().published
    }

    /// Frames replaced before a consumer took them.
    pub fn skipped(&self) -> u64 {
        self.lock().skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(n: u64) -> RawFrame {
        RawFrame::solid(1, 1, [n as u8, 0, 0]).with_sequence(n, 0)
    }

    #[test]
    fn test_publish_replaces_pending_frame() {
        let slot = FrameSlot::new();

        assert!(!slot.publish(frame(1)).unwrap());
        assert!(slot.publish(frame(2)).unwrap());
        assert!(slot.publish(frame(3)).unwrap());

        assert_eq!(slot.published(), 3);
        assert_eq!(slot.skipped(), 2);
        assert_eq!(slot.try_take().map(|f| f.frame_number()), Some(3));
        assert!(slot.try_take().is_none());
    }

    #[test]
    fn test_publish_after_take_is_not_skipped() {
        let slot = FrameSlot::new();

        slot.publish(frame(1)).unwrap();
        assert_eq!(slot.try_take().map(|f| f.frame_number()), Some(1));
        assert!(!slot.publish(frame(2)).unwrap());
        assert_eq!(slot.skipped(), 0);
    }

    #[test]
    fn test_closed_slot_rejects_publish() {
        let slot = FrameSlot::new();
        slot.publish(frame(1)).unwrap();
        slot.close();
        slot.close();

        assert!(slot.is_closed());
        assert!(!slot.has_pending());
        assert_eq!(slot.publish(frame(2)), Err(BridgeError::Closed));
        assert!(slot.take_latest().is_none());
    }

    #[test]
    fn test_take_timeout_without_frame() {
        let slot = FrameSlot::new();
        assert!(slot.take_timeout(Duration::from_millis(10)).is_none());

        slot.publish(frame(4)).unwrap();
        assert_eq!(
            slot.take_timeout(Duration::from_millis(10))
                .map(|f| f.frame_number()),
            Some(4)
        );
    }
}
