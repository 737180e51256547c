use crate::error::LoadError;
use std::fs;
use std::path::Path;

/// Ordered class names; entry `i` names model output position `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Vec<String>,
}

impl LabelVocabulary {
    /// Load a newline-delimited label file.
    ///
    /// Blank lines inside the file are kept as empty labels so that indices
    /// stay aligned with the model output; trailing blank lines are dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| LoadError::io(path, e))?;

        let vocabulary = Self::from_lines(contents.lines());
        if vocabulary.is_empty() {
            return Err(LoadError::EmptyLabels(path.to_path_buf()));
        }

        tracing::info!(
            path = %path.display(),
            labels = vocabulary.len(),
            "Label vocabulary loaded"
        );
        Ok(vocabulary)
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut labels: Vec<String> = lines
            .into_iter()
            .map(|line| line.as_ref().trim_end_matches('\r').to_string())
            .collect();

        while labels.last().is_some_and(|l| l.trim().is_empty()) {
            labels.pop();
        }

        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn label_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_keeps_index_order() {
        let file = label_file("cat\ndog\ncar\ntree\n");

        let labels = LabelVocabulary::load(file.path()).unwrap();

        assert_eq!(labels.len(), 4);
        assert_eq!(labels.get(0), Some("cat"));
        assert_eq!(labels.get(3), Some("tree"));
        assert_eq!(labels.get(4), None);
        assert_eq!(
            labels.iter().collect::<Vec<_>>(),
            vec!["cat", "dog", "car", "tree"]
        );
    }

    #[test]
    fn test_load_handles_crlf_and_trailing_blank_lines() {
        let file = label_file("background\r\ntench\r\ngoldfish\r\n\r\n\n");

        let labels = LabelVocabulary::load(file.path()).unwrap();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(1), Some("tench"));
    }

    #[test]
    fn test_interior_blank_line_keeps_alignment() {
        let labels = LabelVocabulary::from_lines(["a", "", "c"]);
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(1), Some(""));
        assert_eq!(labels.get(2), Some("c"));
    }

    #[test]
    fn test_labels_with_spaces_are_preserved() {
        let labels = LabelVocabulary::from_lines(["great white shark", "tiger shark"]);
        assert_eq!(labels.get(0), Some("great white shark"));
    }

    #[test]
    fn test_empty_file_is_load_error() {
        let file = label_file("\n\n");

        let err = LabelVocabulary::load(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyLabels(_)));
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LabelVocabulary::load(dir.path().join("labels.txt")).unwrap_err();

        match err {
            LoadError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("Expected Io variant, got {other:?}"),
        }
    }
}
