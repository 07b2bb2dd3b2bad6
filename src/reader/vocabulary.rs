use crate::matrix_utils::{duplicated, get_reader_from_path};
use anyhow::Context;
use std::io::BufRead;
use std::path::Path;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The ordered list of trait-value labels that defines the columns of a presence/absence matrix.
///
/// Each non-blank line of the source becomes one label, with surrounding whitespace removed.
/// Labels are kept in input order and are **not** deduplicated: a label listed twice yields
/// two identical columns in the resulting matrix.
///
/// # Examples
///
/// ```rust
/// use traitmatrix::reader::Vocabulary;
///
/// let vocab = Vocabulary::from_reader(std::io::Cursor::new("A\n\n  B \nC\n")).unwrap();
/// assert_eq!(vocab.labels(), ["A", "B", "C"]);
/// ```
pub struct Vocabulary {
    labels: Vec<String>,
}

impl Vocabulary {
    pub fn new(labels: Vec<String>) -> Vocabulary {
        Vocabulary { labels }
    }

    /// Reads a vocabulary from a plain or gzipped text file.
    pub fn from_path<T: AsRef<Path>>(file_path: T) -> anyhow::Result<Vocabulary> {
        let file_path = file_path.as_ref();
        let rdr = get_reader_from_path(file_path)
            .with_context(|| format!("Could not read the vocabulary {:?}", file_path))?;
        let vocab = Vocabulary::from_reader(rdr)
            .with_context(|| format!("Could not read the vocabulary {:?}", file_path))?;
        info!(
            "read {} trait values from {:?}",
            vocab.len(),
            file_path.as_os_str()
        );
        Ok(vocab)
    }

    /// Reads a vocabulary from any buffered reader, one label per line.
    pub fn from_reader<R: BufRead>(rdr: R) -> anyhow::Result<Vocabulary> {
        let mut labels = Vec::new();
        for l in rdr.lines() {
            let line = l?;
            let label = line.trim();
            if !label.is_empty() {
                labels.push(label.to_string());
            }
        }

        let dups = duplicated(&labels);
        if !dups.is_empty() {
            warn!(
                "The vocabulary contains duplicated values -- {:?}. Each occurrence will become its own column.",
                dups
            );
        }
        Ok(Vocabulary { labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.labels.iter()
    }
}

impl<'a> IntoIterator for &'a Vocabulary {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}
