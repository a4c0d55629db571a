//! Error types for loading, saving and parsing language models.

use std::path::PathBuf;

/// Errors from model file operations.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// The training corpus or model file does not exist.
    #[error("file not found: {}", path.display())]
    ModelFileNotFound {
        /// The path that could not be opened.
        path: PathBuf,
    },

    /// The model file violates the header/block/sentinel structure.
    #[error("malformed model at line {line}: {reason}")]
    MalformedModel {
        /// 1-based line number of the offending line.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// A bigram or trigram line references an id outside the vocabulary.
    #[error("malformed model at line {line}: unknown word id {id}")]
    UnknownWordReference {
        /// 1-based line number of the offending line.
        line: usize,
        /// The id that was referenced.
        id: i64,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ModelError {
    pub(crate) fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedModel {
            line,
            reason: reason.into(),
        }
    }

    /// Map an open failure to `ModelFileNotFound` when the file is missing.
    pub(crate) fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::ModelFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io(err)
        }
    }

    /// True for every structural problem in a model file.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedModel { .. } | Self::UnknownWordReference { .. }
        )
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_open_not_found() {
        let err = ModelError::from_open(
            io::Error::new(io::ErrorKind::NotFound, "gone"),
            std::path::Path::new("model.txt"),
        );
        assert!(matches!(err, ModelError::ModelFileNotFound { .. }));
        assert_eq!(err.to_string(), "file not found: model.txt");
    }

    #[test]
    fn test_unknown_reference_is_malformed() {
        let err = ModelError::UnknownWordReference { line: 4, id: 9 };
        assert!(err.is_malformed());
        assert!(!ModelError::Io(io::Error::other("x")).is_malformed());
    }
}
