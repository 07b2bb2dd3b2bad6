//! traitmatrix turns a tab-delimited genome/trait annotation table into a presence/absence
//! matrix. Rows are the distinct genomes (entities) found in the table, columns are the
//! trait values listed in a vocabulary file, and each cell records whether the genome was
//! annotated with that trait. The matrix is built in a [Polars](https://pola.rs/) data frame
//! and written as CSV.

pub mod matrix_info;
pub mod matrix_utils;
pub mod options;
pub mod reader;
pub use matrix_info::PresenceMatrix;
pub use options::{BuildOptions, ColumnSpec, RowOrder};
