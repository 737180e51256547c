use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BridgeError {
    #[error("Frame slot is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_formatting() {
        assert_eq!(
            BridgeError::Closed.to_string(),
            "Frame slot is closed",
            "Closed should display correct message"
        );
    }
}
