/// A single ranked classification: a label from the vocabulary and its
/// dequantized confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub label: String,
    pub confidence: f32,
}

impl DetectionResult {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }

    /// Confidence as a whole percentage, truncated (0.999 -> 99).
    pub fn percent(&self) -> u32 {
        (self.confidence * 100.0) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_truncates() {
        assert_eq!(DetectionResult::new("cat", 1.0).percent(), 100);
        assert_eq!(DetectionResult::new("tree", 90.0 / 255.0).percent(), 35);
        assert_eq!(DetectionResult::new("car", 0.999).percent(), 99);
    }
}
