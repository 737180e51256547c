use bridge::{BridgeError, FrameSlot};
use schema::RawFrame;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Producer side of the frame slot: stamps frames with a sequence number and
/// capture time before publishing them.
pub struct FrameSink {
    slot: Arc<FrameSlot>,
    sequence: u64,
}

impl FrameSink {
    pub fn new(slot: Arc<FrameSlot>) -> Self {
        Self { slot, sequence: 0 }
    }

    /// Publish `frame`. Returns `true` when an unanalyzed frame was dropped.
    pub fn write(&mut self, frame: RawFrame) -> Result<bool, BridgeError> {
        self.sequence += 1;
        let timestamp_ns = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        self.slot
            .publish(frame.with_sequence(self.sequence, timestamp_ns))
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_stamps_sequence() {
        let slot = Arc::new(FrameSlot::new());
        let mut sink = FrameSink::new(Arc::clone(&slot));

        assert!(!sink.write(RawFrame::solid(1, 1, [0, 0, 0])).unwrap());
        assert!(sink.write(RawFrame::solid(1, 1, [0, 0, 0])).unwrap());

        let frame = slot.try_take().unwrap();
        assert_eq!(frame.frame_number(), 2);
        assert!(frame.timestamp_ns() > 0);
        assert_eq!(sink.sequence(), 2);
    }

    #[test]
    fn test_write_to_closed_slot_fails() {
        let slot = Arc::new(FrameSlot::new());
        slot.close();

        let mut sink = FrameSink::new(slot);
        assert_eq!(
            sink.write(RawFrame::solid(1, 1, [0, 0, 0])),
            Err(BridgeError::Closed)
        );
    }
}
