use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::errors::{RecognitionError, RecognitionResult};

/// Ordered class names, index-aligned with the model output.
///
/// Cloning is cheap: clones share the same immutable storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelTable(Arc<[String]>);

impl LabelTable {
    /// Parse a label list, one class per line.
    ///
    /// ImageNet distributions prefix every line with an identifier
    /// (`n01440764 tench` or `0 tench`): the label is whatever follows the
    /// first space, or the whole line when there is none. Empty lines are
    /// skipped; a line holding only spaces still takes a slot so later
    /// labels stay aligned with the model output.
    pub fn parse(text: &str) -> LabelTable {
        text.lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .map(|line| line.split_once(' ').map(|(_, label)| label).unwrap_or(line).to_string())
            .collect()
    }

    /// Read and parse a label file. A missing or unreadable file is an error,
    /// never an empty table.
    pub fn load(path: impl AsRef<Path>) -> RecognitionResult<LabelTable> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|source| RecognitionError::LabelsUnreadable { path: path.to_owned(), source })?;
        let table = LabelTable::parse(&text);
        debug!("Loaded {} labels from {:?}", table.len(), path);
        Ok(table)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl FromIterator<String> for LabelTable {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        LabelTable(iter.into_iter().collect())
    }
}
