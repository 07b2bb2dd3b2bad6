use anyhow::bail;
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// The 0-based positions of the fields used from each observation record.
///
/// An observation record is a tab-separated line of the input table. Only two of its
/// fields are used: the entity (e.g. the genome identifier) and the trait value.
/// A record is accepted only if it has enough fields to contain both of them, see
/// [ColumnSpec::min_fields].
///
/// # Default
///
/// The default layout reads the entity from field 1 and the trait from field 8, so a
/// record needs at least 9 fields.
///
/// # Examples
///
/// ```rust
/// use traitmatrix::options::ColumnSpec;
///
/// let spec = ColumnSpec::default();
/// assert_eq!(spec.min_fields(), 9);
///
/// let custom = ColumnSpec::new(0, 2).unwrap();
/// assert_eq!(custom.min_fields(), 3);
/// ```
pub struct ColumnSpec {
    pub entity_column_index: usize,
    pub trait_column_index: usize,
}

impl Default for ColumnSpec {
    fn default() -> ColumnSpec {
        ColumnSpec {
            entity_column_index: 1,
            trait_column_index: 8,
        }
    }
}

impl ColumnSpec {
    /// Creates a new [ColumnSpec]. Returns an error if both indices point at the same field.
    pub fn new(entity_column_index: usize, trait_column_index: usize) -> anyhow::Result<ColumnSpec> {
        if entity_column_index == trait_column_index {
            bail!(
                "The entity and trait columns must be different fields; both were set to {}.",
                entity_column_index
            )
        }
        Ok(ColumnSpec {
            entity_column_index,
            trait_column_index,
        })
    }

    /// The minimum number of fields a record must have to be accepted.
    pub fn min_fields(&self) -> usize {
        self.entity_column_index.max(self.trait_column_index) + 1
    }

    /// Extracts the `(entity, trait)` pair from the split fields of a record,
    /// or [None] if the record is too short.
    pub fn extract<'a>(&self, fields: &[&'a str]) -> Option<(&'a str, &'a str)> {
        if fields.len() < self.min_fields() {
            return None;
        }
        Some((
            fields[self.entity_column_index],
            fields[self.trait_column_index],
        ))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// The order in which the distinct entities become matrix rows.
///
/// * `FirstSeen` - rows follow the order in which each entity first appears in the observation table.
/// * `Lexical` - rows are sorted by the byte-wise order of the entity identifiers.
pub enum RowOrder {
    #[default]
    FirstSeen,
    Lexical,
}

impl std::str::FromStr for RowOrder {
    type Err = anyhow::Error;

    /// Converts from a [&str] to an appropriate [RowOrder] type.
    /// The result is an error variant if there is no corresponding type for
    /// the input argument `s`.
    fn from_str(s: &str) -> anyhow::Result<RowOrder> {
        let ro = match s.to_lowercase().as_str() {
            "first-seen" | "first_seen" | "input" => RowOrder::FirstSeen,
            "lexical" | "sorted" => RowOrder::Lexical,
            _ => bail!("Cannot parse the row order {:?}; expected \"first-seen\" or \"lexical\".", s),
        };
        Ok(ro)
    }
}

impl std::fmt::Display for RowOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowOrder::FirstSeen => write!(f, "first-seen"),
            RowOrder::Lexical => write!(f, "lexical"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Configuration for building a [PresenceMatrix](crate::PresenceMatrix).
///
/// # Fields
///
/// * `columns`: which observation fields hold the entity and the trait value.
/// * `row_order`: the ordering policy for the matrix rows.
pub struct BuildOptions {
    pub columns: ColumnSpec,
    pub row_order: RowOrder,
}

impl BuildOptions {
    pub fn new(columns: ColumnSpec, row_order: RowOrder) -> BuildOptions {
        if columns.min_fields() > 64 {
            warn!(
                "Records need at least {} fields to be accepted. Most annotation tables have far fewer columns; please check --entity-column and --trait-column.",
                columns.min_fields()
            );
        }
        BuildOptions { columns, row_order }
    }
}
