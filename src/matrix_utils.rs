use anyhow::Context;
use flate2::bufread::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::info;

/// Type alias for a line reader that can read from either
/// a compressed or an uncompressed text file.
pub type TextReader = Box<dyn BufRead>;

/// The name of the entity column in the observation and matrix data frames.
pub(crate) const ENTITY_COLUMN: &str = "entity";
/// The name of the trait column in the observation data frame.
pub(crate) const TRAIT_COLUMN: &str = "trait";

/// The field separator of the observation table.
pub const OBSERVATION_SEPARATOR: char = '\t';
/// The field separator of the output matrix.
pub const MATRIX_SEPARATOR: u8 = b',';

/// Tests if the stream underlying the [BufReader] `reader` is gzipped or not by examining the
/// first 2 bytes for the magic header.  This function *requires*, but does not check, that
/// none of the stream has yet been consumed (i.e. that no read calls have yet been issued
/// to `reader`). It will fill the buffer to examine the first two bytes, but will not consume
/// them.
///
/// If the first 2 bytes could be succesfully read, this returns
/// [Ok]`(true)` if the file is a gzipped file
/// [Ok]`(false)` if it is not a gzipped file
///
/// If the first 2 bytes could not be succesfully read, then this
/// returns the relevant [std::io::Error].
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    if src.get(..2) == Some(&GZIP_MAGIC_NUMBER) {
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Creates a [TextReader] from the provided path. This function will automatically
/// determine if the provided path points to a gzip compressed or an uncompressed text
/// file, and will return the appropriate reader accordingly.
///
/// It returns [Ok]`(`[TextReader]`)` on success and an [anyhow::Error] naming the
/// path on failure.
pub fn get_reader_from_path<T: AsRef<Path>>(p: T) -> anyhow::Result<TextReader> {
    let p = p.as_ref();
    let file = File::open(p).with_context(|| format!("Could not open the file {:?}", p))?;
    get_reader_from_reader(file).with_context(|| format!("Could not read the file {:?}", p))
}

/// Creates a [TextReader] from the provided reader, transparently decompressing
/// gzipped input.
///
/// **Note** : It is intended that this function *take ownership* of the underlying reader, which
/// is the reason behind the `'static` lifetime bound.
pub fn get_reader_from_reader(r: impl Read + 'static) -> anyhow::Result<TextReader> {
    let mut inner_rdr = BufReader::new(r);
    if is_gzipped(&mut inner_rdr)? {
        info!("auto-detected gzipped file - reading via decompression");
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(inner_rdr))))
    } else {
        Ok(Box::new(inner_rdr))
    }
}

/// Quotes a single CSV field the way polars' `CsvWriter` quotes string cells: a field
/// is quoted if it is empty or contains the separator, a double quote or a line break.
/// Inner quotes are doubled.
pub fn quote_field(field: &str, separator: u8) -> String {
    let sep = separator as char;
    if field.is_empty() || field.contains(|c: char| c == sep || c == '"' || c == '\n' || c == '\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Returns the labels that occur more than once in `labels`, in order of their
/// second occurrence.
pub fn duplicated<T: AsRef<str>>(labels: &[T]) -> Vec<String> {
    let mut seen = std::collections::HashSet::with_capacity(labels.len());
    let mut dups: Vec<String> = Vec::new();
    for l in labels.iter() {
        let l = l.as_ref();
        if !seen.insert(l) && !dups.iter().any(|d| d == l) {
            dups.push(l.to_owned());
        }
    }
    dups
}
