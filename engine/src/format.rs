use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Serialization formats tract can load a classifier from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModelFormat {
    Onnx,
    Nnef,
}

impl ModelFormat {
    /// Guess from the file name. NNEF models come as directories or tarballs,
    /// anything else is assumed to be ONNX.
    pub fn guess(path: &Path) -> ModelFormat {
        let name = path.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
        if path.is_dir()
            || name.ends_with(".nnef")
            || name.ends_with(".tgz")
            || name.ends_with(".tar")
            || name.ends_with(".tar.gz")
        {
            ModelFormat::Nnef
        } else {
            ModelFormat::Onnx
        }
    }
}

impl FromStr for ModelFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<ModelFormat> {
        match &*s.to_lowercase() {
            "onnx" => Ok(ModelFormat::Onnx),
            "nnef" => Ok(ModelFormat::Nnef),
            _ => anyhow::bail!("Unknown model format {s:?} (onnx or nnef)"),
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelFormat::Onnx => write!(f, "onnx"),
            ModelFormat::Nnef => write!(f, "nnef"),
        }
    }
}

/// Which model output carries the class scores.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum OutputSelection {
    /// The last declared output. Classifiers exported with auxiliary outputs
    /// list the raw class scores last.
    #[default]
    Last,
    Named(String),
}
