pub mod errors;
pub mod frame_slot;

pub use errors::BridgeError;
pub use frame_slot::FrameSlot;
