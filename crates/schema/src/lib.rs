mod detection;
mod frame;

pub use detection::DetectionResult;
pub use frame::{RGB_CHANNELS, RawFrame, SchemaError};
