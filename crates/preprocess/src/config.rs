/// Square input edge of the bundled MobileNet classifier.
pub const DEFAULT_INPUT_EDGE: u32 = 224;
