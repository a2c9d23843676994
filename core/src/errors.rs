use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the classification pipeline and its collaborators.
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Pixel buffer shorter than the geometry it is supposed to describe.
    #[error("invalid input: expected at least {expected} bytes, got {actual}")]
    InvalidInput { expected: usize, actual: usize },

    #[error("empty input: no scores to decode")]
    EmptyInput,

    /// Arg-max landed past the end of the label table.
    #[error("class index {index} out of range for a table of {len} labels")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("label file {path:?} could not be read")]
    LabelsUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Label table shorter than the model output. Configuration problem.
    #[error("label table has {labels} entries but the model predicts {classes} classes")]
    LabelCountMismatch { labels: usize, classes: usize },

    #[error("image file {0:?} does not exist")]
    ImageNotFound(PathBuf),

    #[error("failed to decode image {path:?}: {reason}")]
    Image { path: PathBuf, reason: String },

    #[error("failed to load model {path:?}")]
    ModelLoad {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("evaluation failed")]
    Evaluation(#[source] anyhow::Error),
}

impl RecognitionError {
    pub fn model_load(path: impl Into<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        RecognitionError::ModelLoad { path: path.into(), source: source.into() }
    }

    pub fn evaluation(source: impl Into<anyhow::Error>) -> Self {
        RecognitionError::Evaluation(source.into())
    }
}

pub type RecognitionResult<T> = Result<T, RecognitionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_reports_sizes() {
        let err = RecognitionError::InvalidInput { expected: 150528, actual: 12 };
        let msg = err.to_string();
        assert!(msg.contains("150528"));
        assert!(msg.contains("12"));
    }

    #[test]
    fn model_load_keeps_cause() {
        let err = RecognitionError::model_load("resnet18.onnx", anyhow::anyhow!("bad protobuf"));
        assert!(err.to_string().contains("resnet18.onnx"));
        let cause = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(cause.as_deref(), Some("bad protobuf"));
    }

    #[test]
    fn labels_unreadable_from_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = RecognitionError::LabelsUnreadable { path: "labels.txt".into(), source: io };
        assert!(matches!(err, RecognitionError::LabelsUnreadable { .. }));
        assert!(err.to_string().contains("labels.txt"));
    }
}
