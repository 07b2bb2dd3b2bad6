use crate::matrix_utils::{get_reader_from_path, ENTITY_COLUMN, OBSERVATION_SEPARATOR, TRAIT_COLUMN};
use crate::options::ColumnSpec;
use anyhow::Context;
use polars::prelude::*;
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
/// The `(entity, trait)` pairs extracted from an observation table.
///
/// The pairs are stored column-wise so they can be moved into a polars [DataFrame]
/// without copying. Lines that have too few tab-separated fields for the
/// [ColumnSpec] in use are not stored; they are counted in `n_discarded`.
///
/// # Fields
///
/// * `entity`: the entity identifier of each accepted record.
/// * `trait_value`: the trait value of each accepted record.
/// * `n_lines`: the number of lines read, accepted or not.
/// * `n_discarded`: the number of lines rejected for having too few fields.
pub struct Observations {
    pub entity: Vec<String>,
    pub trait_value: Vec<String>,
    pub n_lines: usize,
    pub n_discarded: usize,
}

impl Observations {
    /// Reads an observation table from a plain or gzipped file.
    ///
    /// ### Errors
    ///
    /// Returns an error naming the file if it cannot be opened or read. Records with
    /// too few fields are never an error.
    pub fn from_path<T: AsRef<Path>>(file_path: T, columns: &ColumnSpec) -> anyhow::Result<Observations> {
        let file_path = file_path.as_ref();
        let rdr = get_reader_from_path(file_path)
            .with_context(|| format!("Could not read the observation table {:?}", file_path))?;
        let obs = Observations::from_reader(rdr, columns)
            .with_context(|| format!("Could not read the observation table {:?}", file_path))?;
        info!(
            "read {} records from {:?}",
            obs.len(),
            file_path.as_os_str()
        );
        Ok(obs)
    }

    /// Reads an observation table from any buffered reader.
    pub fn from_reader<R: BufRead>(rdr: R, columns: &ColumnSpec) -> anyhow::Result<Observations> {
        let mut obs = Observations::default();

        for l in rdr.lines() {
            let line = l?;
            obs.n_lines += 1;
            let fields: Vec<&str> = line.trim().split(OBSERVATION_SEPARATOR).collect();
            match columns.extract(&fields) {
                Some((entity, trait_value)) => obs.push(entity, trait_value),
                None => obs.n_discarded += 1,
            }
        }

        if obs.n_discarded > 0 {
            debug!(
                "discarded {} of {} lines with fewer than {} fields",
                obs.n_discarded,
                obs.n_lines,
                columns.min_fields()
            );
        }
        Ok(obs)
    }

    pub fn push(&mut self, entity: &str, trait_value: &str) {
        self.entity.push(entity.to_string());
        self.trait_value.push(trait_value.to_string());
    }

    /// The number of accepted records.
    pub fn len(&self) -> usize {
        self.entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entity.is_empty()
    }

    /// Moves the accepted records into a two-column [DataFrame] (`entity`, `trait`).
    pub fn into_df(self) -> anyhow::Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new(ENTITY_COLUMN, self.entity),
            Series::new(TRAIT_COLUMN, self.trait_value),
        ])?;
        Ok(df)
    }
}
