//! Type definitions for source catalog objects
//!
//! Every descriptor is built from catalog rows for a single generation pass
//! and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// A table row from the source catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableDescriptor {
    #[serde(default)]
    pub owner: String,
    pub name: String,
    pub tablespace: Option<String>,
    pub status: Option<String>,
    /// Initial extent in KB
    pub initial_extent_kb: Option<u64>,
    /// Next extent in KB
    pub next_extent_kb: Option<u64>,
    #[serde(default)]
    pub partitioned: bool,
    #[serde(default)]
    pub read_only: bool,
    pub avg_row_len: Option<u64>,
}

impl TableDescriptor {
    /// Create a non-partitioned table with no storage metadata
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            owner: owner.to_string(),
            name: name.to_string(),
            tablespace: None,
            status: None,
            initial_extent_kb: None,
            next_extent_kb: None,
            partitioned: false,
            read_only: false,
            avg_row_len: None,
        }
    }

    pub fn tablespace(mut self, tablespace: &str) -> Self {
        self.tablespace = Some(tablespace.to_string());
        self
    }

    pub fn extents(mut self, initial_kb: u64, next_kb: u64) -> Self {
        self.initial_extent_kb = Some(initial_kb);
        self.next_extent_kb = Some(next_kb);
        self
    }

    pub fn partitioned(mut self, partitioned: bool) -> Self {
        self.partitioned = partitioned;
        self
    }
}

/// A column row from the source catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub table: String,
    pub name: String,
    pub data_type: String,
    #[serde(default)]
    pub length: u32,
    pub precision: Option<u32>,
    pub scale: Option<i32>,
    pub avg_length: Option<u32>,
    pub char_length: Option<u32>,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    pub default: Option<String>,
    /// Position within the table; unique per table and drives output order
    #[serde(default)]
    pub ordinal: u32,
}

fn default_nullable() -> bool {
    true
}

impl ColumnDescriptor {
    /// Create a nullable column with the given name and source type
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            owner: String::new(),
            table: String::new(),
            name: name.to_string(),
            data_type: data_type.to_string(),
            length: 0,
            precision: None,
            scale: None,
            avg_length: None,
            char_length: None,
            nullable: true,
            default: None,
            ordinal: 0,
        }
    }

    /// Set the owning table
    pub fn of(mut self, owner: &str, table: &str) -> Self {
        self.owner = owner.to_string();
        self.table = table.to_string();
        self
    }

    pub fn length(mut self, length: u32) -> Self {
        self.length = length;
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: i32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set a default value for the column
    pub fn default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn ordinal(mut self, ordinal: u32) -> Self {
        self.ordinal = ordinal;
        self
    }
}

/// One record of the type override list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeOverrideEntry {
    pub owner: String,
    pub table: String,
    pub column: String,
    pub target_type: String,
}

/// Constraint kinds the catalog can be asked for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    Check,
    Unique,
    Primary,
    Foreign,
}

/// A constraint row, columns already in position order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstraintDescriptor {
    pub name: String,
    #[serde(default)]
    pub table: String,
    #[serde(flatten)]
    pub kind: ConstraintKind,
}

/// Kind-specific constraint payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ConstraintKind {
    Check {
        predicate: String,
    },
    Unique {
        columns: Vec<String>,
    },
    Primary {
        columns: Vec<String>,
    },
    Foreign {
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
    },
}

impl ConstraintDescriptor {
    pub fn check(name: &str, table: &str, predicate: &str) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            kind: ConstraintKind::Check {
                predicate: predicate.to_string(),
            },
        }
    }

    pub fn unique(name: &str, table: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            kind: ConstraintKind::Unique {
                columns: to_strings(columns),
            },
        }
    }

    pub fn primary(name: &str, table: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            kind: ConstraintKind::Primary {
                columns: to_strings(columns),
            },
        }
    }

    pub fn foreign(
        name: &str,
        table: &str,
        columns: &[&str],
        ref_table: &str,
        ref_columns: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            table: table.to_string(),
            kind: ConstraintKind::Foreign {
                columns: to_strings(columns),
                ref_table: ref_table.to_string(),
                ref_columns: to_strings(ref_columns),
            },
        }
    }

    pub fn constraint_type(&self) -> ConstraintType {
        match self.kind {
            ConstraintKind::Check { .. } => ConstraintType::Check,
            ConstraintKind::Unique { .. } => ConstraintType::Unique,
            ConstraintKind::Primary { .. } => ConstraintType::Primary,
            ConstraintKind::Foreign { .. } => ConstraintType::Foreign,
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// One key of an index: a column or a function-based expression
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexColumn {
    pub column: String,
    /// Expression text for function-based keys, emitted verbatim
    pub expression: Option<String>,
    #[serde(default)]
    pub descending: bool,
}

impl IndexColumn {
    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            expression: None,
            descending: false,
        }
    }

    pub fn desc(column: &str) -> Self {
        Self {
            descending: true,
            ..Self::asc(column)
        }
    }
}

/// An index row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexDescriptor {
    pub name: String,
    #[serde(default)]
    pub table: String,
    #[serde(default)]
    pub unique: bool,
    pub tablespace: Option<String>,
    #[serde(default)]
    pub partitioned: bool,
    pub columns: Vec<IndexColumn>,
}

/// Object kinds that can carry partitioning
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Table,
    Index,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Table => write!(f, "TABLE"),
            ObjectKind::Index => write!(f, "INDEX"),
        }
    }
}

/// Partitioning strategy of a table or index
///
/// Deserializes from the catalog's PARTITIONING_TYPE text in any case.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum PartitionStrategy {
    List,
    Hash,
    None,
}

impl PartitionStrategy {
    /// Map the catalog's PARTITIONING_TYPE text; unsupported kinds become `None`
    pub fn from_catalog(partitioning_type: &str) -> Self {
        match partitioning_type.trim().to_uppercase().as_str() {
            "LIST" => PartitionStrategy::List,
            "HASH" => PartitionStrategy::Hash,
            _ => PartitionStrategy::None,
        }
    }
}

impl From<String> for PartitionStrategy {
    fn from(partitioning_type: String) -> Self {
        Self::from_catalog(&partitioning_type)
    }
}

/// One partition in stored position order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionEntry {
    pub name: String,
    pub tablespace: Option<String>,
    /// Boundary value list for list partitions
    pub boundary: Option<String>,
}

impl PartitionEntry {
    pub fn new(name: &str, tablespace: &str, boundary: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            tablespace: Some(tablespace.to_string()),
            boundary: boundary.map(|b| b.to_string()),
        }
    }
}

/// Partitioning metadata of a table or index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PartitionDescriptor {
    pub object_name: String,
    pub object_kind: ObjectKind,
    pub strategy: PartitionStrategy,
    pub partitions: Vec<PartitionEntry>,
}

/// A partition descriptor together with its key columns
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionScheme {
    pub descriptor: PartitionDescriptor,
    pub key_columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceDescriptor {
    pub name: String,
    pub increment_by: i64,
    /// Kept as text: catalog bounds can exceed 64-bit integers
    pub min_value: String,
    pub max_value: String,
    #[serde(default)]
    pub cycle: bool,
    #[serde(default)]
    pub order: bool,
    #[serde(default)]
    pub cache_size: u64,
    pub last_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SynonymDescriptor {
    pub name: String,
    pub table_owner: String,
    pub table_name: String,
    pub db_link: Option<String>,
}

/// A stored procedure or function with its full source text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcedureDescriptor {
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewDescriptor {
    pub name: String,
    pub text: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriggerDescriptor {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Trigger header as stored by the catalog (name, timing, event, table)
    pub description: String,
    pub body: String,
}

fn default_enabled() -> bool {
    true
}
