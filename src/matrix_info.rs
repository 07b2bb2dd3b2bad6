use crate::matrix_utils::{quote_field, ENTITY_COLUMN, MATRIX_SEPARATOR, TRAIT_COLUMN};
use crate::options::{BuildOptions, RowOrder};
use crate::reader::{Observations, Vocabulary};
use anyhow::Context;
use polars::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// A binary presence/absence matrix of entities (rows) by trait values (columns).
///
/// The matrix is held in a polars [DataFrame] whose first column contains the entity
/// identifiers and whose remaining columns hold one `UInt8` (0 or 1) column per vocabulary
/// label, in vocabulary order. Because a vocabulary may list the same label more than once,
/// the data frame columns carry unique internal names; the real column labels are kept in
/// `labels` and are the ones written to the CSV header.
///
/// ### Fields
///
/// * `df`: the entity column followed by the cell columns.
/// * `entities`: the row labels, in row order.
/// * `labels`: the column labels, in column order, duplicates included.
/// * `n_discarded`: the number of observation lines dropped for having too few fields.
#[derive(Clone)]
pub struct PresenceMatrix {
    df: DataFrame,
    entities: Vec<String>,
    labels: Vec<String>,
    n_discarded: usize,
}

impl PresenceMatrix {
    /// Builds a presence/absence matrix from a vocabulary and a set of observations.
    ///
    /// A cell is 1 if and only if at least one observation pairs the row's entity with the
    /// column's label, and 0 otherwise. Rows follow `options.row_order`.
    ///
    /// ### Example
    ///
    /// ```rust
    /// use std::io::Cursor;
    /// use traitmatrix::{options::{BuildOptions, ColumnSpec}, reader::{Observations, Vocabulary}, PresenceMatrix};
    ///
    /// let vocab = Vocabulary::from_reader(Cursor::new("A\nB\nC\n")).unwrap();
    /// let table = "x\tg1\t.\t.\t.\t.\t.\t.\tA\nx\tg2\t.\t.\t.\t.\t.\t.\tB\n";
    /// let obs = Observations::from_reader(Cursor::new(table), &ColumnSpec::default()).unwrap();
    /// let pm = PresenceMatrix::build(&vocab, obs, &BuildOptions::default()).unwrap();
    /// assert_eq!(pm.get("g1", "A"), Some(true));
    /// assert_eq!(pm.get("g2", "A"), Some(false));
    /// ```
    pub fn build(
        vocabulary: &Vocabulary,
        observations: Observations,
        options: &BuildOptions,
    ) -> anyhow::Result<PresenceMatrix> {
        let n_discarded = observations.n_discarded;
        let n_records = observations.len();
        let entities = ordered_entities(&observations.entity, options.row_order);

        // keep only the records whose trait is listed in the vocabulary
        let pairs = observations.into_df()?;
        let vocab_s = Series::new(TRAIT_COLUMN, vocabulary.labels());
        let pairs = pairs.filter(&is_in(pairs.column(TRAIT_COLUMN)?, &vocab_s)?)?;
        debug!(
            "{} of {} records carry a trait from the vocabulary, over {} entities",
            pairs.height(),
            n_records,
            entities.len()
        );

        let row_of: HashMap<&str, usize> = entities
            .iter()
            .enumerate()
            .map(|(i, e)| (e.as_str(), i))
            .collect();
        // a label listed more than once maps to every one of its columns
        let mut cols_of: HashMap<&str, Vec<usize>> = HashMap::with_capacity(vocabulary.len());
        for (j, label) in vocabulary.iter().enumerate() {
            cols_of.entry(label.as_str()).or_default().push(j);
        }

        let mut cells: Vec<Vec<u8>> = vec![vec![0u8; entities.len()]; vocabulary.len()];
        let pair_entities = pairs.column(ENTITY_COLUMN)?.str()?;
        let pair_traits = pairs.column(TRAIT_COLUMN)?.str()?;
        for (e, t) in pair_entities.into_iter().zip(pair_traits.into_iter()) {
            if let (Some(e), Some(t)) = (e, t) {
                if let (Some(&i), Some(js)) = (row_of.get(e), cols_of.get(t)) {
                    for &j in js {
                        cells[j][i] = 1;
                    }
                }
            }
        }

        let n_unobserved = cells.iter().filter(|c| !c.contains(&1)).count();
        if n_unobserved > 0 {
            debug!(
                "{} of {} trait values were not observed in any entity",
                n_unobserved,
                vocabulary.len()
            );
        }

        let mut taken: HashSet<String> = HashSet::with_capacity(vocabulary.len() + 1);
        taken.insert(ENTITY_COLUMN.to_string());

        let mut columns = Vec::with_capacity(vocabulary.len() + 1);
        columns.push(Series::new(ENTITY_COLUMN, entities.as_slice()));
        for (label, col) in vocabulary.iter().zip(cells) {
            columns.push(Series::new(&unique_name(label, &mut taken), col));
        }

        let df = DataFrame::new(columns)?;
        Ok(PresenceMatrix {
            df,
            entities,
            labels: vocabulary.labels().to_vec(),
            n_discarded,
        })
    }

    /// Reads the vocabulary and the observation table from the given paths and builds the matrix.
    ///
    /// Either file may be gzip compressed. Nothing is written by this function, so a failure
    /// to read either input leaves no partial output behind.
    pub fn from_paths<T: AsRef<Path>, U: AsRef<Path>>(
        vocabulary_path: T,
        observation_path: U,
        options: &BuildOptions,
    ) -> anyhow::Result<PresenceMatrix> {
        let vocabulary = Vocabulary::from_path(vocabulary_path)?;
        if vocabulary.is_empty() {
            warn!("The vocabulary is empty. The output will only contain the entity column.");
        }
        let observations = Observations::from_path(observation_path, &options.columns)?;
        if observations.is_empty() {
            warn!("No observation record has the required number of fields. The output will only contain the header line.");
        }
        PresenceMatrix::build(&vocabulary, observations, options)
    }
}

// get struct fields
impl PresenceMatrix {
    /// The underlying [DataFrame]: the entity column followed by one column per label.
    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// The number of observation lines dropped for having too few fields.
    pub fn n_discarded(&self) -> usize {
        self.n_discarded
    }

    pub fn n_rows(&self) -> usize {
        self.entities.len()
    }

    pub fn n_cols(&self) -> usize {
        self.labels.len()
    }

    /// Looks up a single cell. If `label` occurs more than once in the vocabulary the first
    /// such column is used. Returns [None] if the entity or the label is unknown.
    pub fn get(&self, entity: &str, label: &str) -> Option<bool> {
        let row = self.entities.iter().position(|e| e == entity)?;
        let col = self.labels.iter().position(|l| l == label)?;
        // column 0 holds the entities
        let cells = self.df.select_at_idx(col + 1)?.u8().ok()?;
        cells.get(row).map(|v| v == 1)
    }

    /// Returns the cells of one row as 0/1 values, in column order.
    pub fn row(&self, entity: &str) -> Option<Vec<u8>> {
        let row = self.entities.iter().position(|e| e == entity)?;
        self.df
            .get_columns()
            .iter()
            .skip(1)
            .map(|s| s.u8().ok().and_then(|ca| ca.get(row)))
            .collect()
    }
}

// write functions
impl PresenceMatrix {
    /// Writes the matrix as comma-separated text to `file_path`, replacing any existing file.
    ///
    /// The first line is the header `,<label1>,<label2>,...`; every following line is
    /// `<entity>,<0|1>,<0|1>,...`. The parent directory is created if it does not exist.
    ///
    /// ### Errors
    ///
    /// This function may return an error if:
    /// * The output directory cannot be created.
    /// * The output file cannot be created or written.
    pub fn write_csv<T: AsRef<Path>>(&self, file_path: T) -> anyhow::Result<()> {
        let file_path = file_path.as_ref();

        // create the folder if it doesn't exist
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Could not create the parent directory of the output file {:?}",
                        file_path.as_os_str()
                    )
                })?;
            }
        }

        let file = fs::File::create(file_path)
            .with_context(|| format!("Could not create the output file {:?}", file_path))?;
        let mut file = BufWriter::with_capacity(4194304, file);
        self.write_csv_to(&mut file)
            .with_context(|| format!("Could not write the output file {:?}", file_path))?;
        file.flush()?;

        info!(
            "wrote a {} x {} matrix to {:?}",
            self.n_rows(),
            self.n_cols(),
            file_path.as_os_str()
        );
        Ok(())
    }

    /// Writes the matrix as comma-separated text to any writer.
    pub fn write_csv_to<W: Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        let sep = MATRIX_SEPARATOR as char;
        let mut header = String::new();
        for l in self.labels.iter() {
            header.push(sep);
            header.push_str(&quote_field(l, MATRIX_SEPARATOR));
        }
        writeln!(writer, "{}", header)?;

        if self.df.height() > 0 {
            let mut out_df = self.df.clone();
            CsvWriter::new(writer)
                .include_header(false)
                .with_separator(MATRIX_SEPARATOR)
                .finish(&mut out_df)?;
        }
        Ok(())
    }
}

/// Returns the distinct entities in `entity`, ordered by `row_order`.
fn ordered_entities(entity: &[String], row_order: RowOrder) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entities: Vec<String> = entity
        .iter()
        .filter(|e| seen.insert(e.as_str()))
        .cloned()
        .collect();
    if row_order == RowOrder::Lexical {
        entities.sort_unstable();
    }
    entities
}

/// Returns `label` if it is not yet in `taken`, otherwise `label` with the smallest
/// numeric suffix that makes it unique. The returned name is added to `taken`.
fn unique_name(label: &str, taken: &mut HashSet<String>) -> String {
    let mut name = label.to_string();
    let mut n = 1usize;
    while taken.contains(&name) {
        name = format!("{}.{}", label, n);
        n += 1;
    }
    taken.insert(name.clone());
    name
}
