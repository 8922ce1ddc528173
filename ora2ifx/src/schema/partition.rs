//! Partition scheme translation
//!
//! Turns Oracle list/hash partitioning into an Informix `fragment by` clause.
//!
//! Hash partitioning carries no boundary semantics the target can use, so two
//! known key columns map to fixed layouts from [`HASH_LAYOUTS`]. Any other hash
//! key is handled differently per object kind:
//!
//! * tables get no fragmentation clause at all;
//! * indexes get one `values (???)` placeholder partition per source partition.
//!
//! The asymmetry is inherited from the legacy converter and kept as is; both
//! cases are reported as anomalies.

use crate::schema::types::{ObjectKind, PartitionDescriptor, PartitionScheme, PartitionStrategy};
use crate::utils::naming::{join_columns, lower_ident};

/// Boundary marker for partitions whose bounds could not be derived
pub const UNRESOLVED_BOUNDARY: &str = "???";

/// Boundary of one partition in a fixed layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedBoundary {
    /// Fragmentation expression, `partition p (expr) in dbs`
    Expression(&'static str),
    /// Value list, `partition p values (v1,v2) in dbs`
    Values(&'static str),
    /// Catch-all partition, `partition p remainder in dbs`
    Remainder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPartition {
    pub name: &'static str,
    pub tablespace: &'static str,
    pub boundary: FixedBoundary,
}

/// A pre-baked fragmentation layout selected by hash key column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashLayout {
    pub key_column: &'static str,
    /// Text following `fragment by`
    pub scheme: &'static str,
    pub partitions: &'static [FixedPartition],
}

const fn expression(name: &'static str, tablespace: &'static str, expr: &'static str) -> FixedPartition {
    FixedPartition {
        name,
        tablespace,
        boundary: FixedBoundary::Expression(expr),
    }
}

const fn values(name: &'static str, tablespace: &'static str, list: &'static str) -> FixedPartition {
    FixedPartition {
        name,
        tablespace,
        boundary: FixedBoundary::Values(list),
    }
}

/// Six device-code ranges
pub const DEVICE_LAYOUT: HashLayout = HashLayout {
    key_column: "DEVICENUM",
    scheme: "expression",
    partitions: &[
        expression("p_device_part_1", "statdbs1", "devicenum < 'N'"),
        expression("p_device_part_2", "statdbs2", "devicenum >= 'N' and devicenum < 'NR03'"),
        expression("p_device_part_3", "statdbs3", "devicenum >= 'NR03' and devicenum < 'P'"),
        expression("p_device_part_4", "statdbs4", "devicenum >= 'P' and devicenum < 'PL03'"),
        expression("p_device_part_5", "statdbs5", "devicenum >= 'PL03'"),
        expression("p_device_part_n", "statdbs6", "devicenum is NULL"),
    ],
};

/// Five five-year buckets on the generation year, a NULL partition and a remainder
pub const GENDATE_LAYOUT: HashLayout = HashLayout {
    key_column: "GENDATETIME",
    scheme: "list (gendatetime[1,4])",
    partitions: &[
        values("p_gendate_part_1", "statdbs6", "'2029','2024','2019'"),
        values("p_gendate_part_2", "statdbs5", "'2028','2023','2018'"),
        values("p_gendate_part_3", "statdbs4", "'2027','2022','2017'"),
        values("p_gendate_part_4", "statdbs3", "'2026','2021','2016'"),
        values("p_gendate_part_5", "statdbs2", "'2025','2020','2015'"),
        values("p_gendate_part_n", "statdbs1", "NULL"),
        FixedPartition {
            name: "p_gendate_part_r",
            tablespace: "statdbs1",
            boundary: FixedBoundary::Remainder,
        },
    ],
};

/// Fixed layouts for hash-partitioned objects, keyed by partition key column
pub const HASH_LAYOUTS: &[HashLayout] = &[DEVICE_LAYOUT, GENDATE_LAYOUT];

/// Find the fixed layout for a single-column hash key
pub fn hash_layout(key_columns: &[String]) -> Option<&'static HashLayout> {
    match key_columns {
        [key] => HASH_LAYOUTS
            .iter()
            .find(|layout| layout.key_column.eq_ignore_ascii_case(key.trim())),
        _ => None,
    }
}

/// Outcome of translating one object's partitioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionTranslation {
    NotPartitioned,
    Clause(String),
    /// Hash-partitioned table on an unrecognised key; emitted as nothing
    UnsupportedTableHash { key: String },
    /// Hash-partitioned index on an unrecognised key; placeholder partitions
    IndexHashPlaceholder { key: String, clause: String },
    /// List partitioning where some partitions carry no boundary values
    ListBoundaryPlaceholder {
        partitions: Vec<String>,
        clause: String,
    },
}

impl PartitionTranslation {
    pub fn as_str(&self) -> &str {
        match self {
            PartitionTranslation::NotPartitioned
            | PartitionTranslation::UnsupportedTableHash { .. } => "",
            PartitionTranslation::Clause(clause)
            | PartitionTranslation::IndexHashPlaceholder { clause, .. }
            | PartitionTranslation::ListBoundaryPlaceholder { clause, .. } => clause.as_str(),
        }
    }

    pub fn into_ddl(self) -> String {
        match self {
            PartitionTranslation::NotPartitioned
            | PartitionTranslation::UnsupportedTableHash { .. } => String::new(),
            PartitionTranslation::Clause(clause)
            | PartitionTranslation::IndexHashPlaceholder { clause, .. }
            | PartitionTranslation::ListBoundaryPlaceholder { clause, .. } => clause,
        }
    }

    /// Whether the clause needs manual follow-up
    pub fn is_unresolved(&self) -> bool {
        matches!(
            self,
            PartitionTranslation::UnsupportedTableHash { .. }
                | PartitionTranslation::IndexHashPlaceholder { .. }
                | PartitionTranslation::ListBoundaryPlaceholder { .. }
        )
    }
}

/// Translate partitioning metadata to a fragmentation clause; empty when not partitioned
pub fn translate(descriptor: &PartitionDescriptor, key_columns: &[String]) -> String {
    translate_partitioning(descriptor, key_columns).into_ddl()
}

/// Translate a descriptor bundled with its key columns
pub fn translate_scheme(scheme: &PartitionScheme) -> PartitionTranslation {
    translate_partitioning(&scheme.descriptor, &scheme.key_columns)
}

pub fn translate_partitioning(
    descriptor: &PartitionDescriptor,
    key_columns: &[String],
) -> PartitionTranslation {
    match descriptor.strategy {
        PartitionStrategy::None => PartitionTranslation::NotPartitioned,
        PartitionStrategy::List => list_clause(descriptor, key_columns),
        PartitionStrategy::Hash => {
            if let Some(layout) = hash_layout(key_columns) {
                return PartitionTranslation::Clause(layout_clause(layout));
            }

            let key = key_columns.join(",");
            match descriptor.object_kind {
                ObjectKind::Table => {
                    tracing::warn!(
                        table = %descriptor.object_name,
                        key = %key,
                        "Hash partitioning on unrecognised key, table left unfragmented"
                    );
                    PartitionTranslation::UnsupportedTableHash { key }
                }
                ObjectKind::Index => {
                    tracing::warn!(
                        index = %descriptor.object_name,
                        key = %key,
                        "Hash partitioning on unrecognised key, emitting placeholder partitions"
                    );
                    PartitionTranslation::IndexHashPlaceholder {
                        clause: placeholder_clause(descriptor, key_columns),
                        key,
                    }
                }
            }
        }
    }
}

fn list_clause(descriptor: &PartitionDescriptor, key_columns: &[String]) -> PartitionTranslation {
    if descriptor.partitions.is_empty() {
        return PartitionTranslation::NotPartitioned;
    }

    let mut unbounded = Vec::new();
    let lines: Vec<String> = descriptor
        .partitions
        .iter()
        .map(|partition| {
            let boundary = match partition.boundary.as_deref().map(str::trim) {
                Some(boundary) if !boundary.is_empty() => boundary,
                _ => {
                    unbounded.push(partition.name.clone());
                    UNRESOLVED_BOUNDARY
                }
            };
            format!(
                "partition {} values ({}){}",
                lower_ident(&partition.name),
                boundary,
                placement(partition.tablespace.as_deref())
            )
        })
        .collect();

    let sql = clause(
        &format!("list ( {} )", join_columns(key_columns)),
        lines.into_iter(),
    );
    if unbounded.is_empty() {
        return PartitionTranslation::Clause(sql);
    }

    tracing::warn!(
        object = %descriptor.object_name,
        partitions = ?unbounded,
        "List partitions without boundary values, emitting placeholders"
    );
    PartitionTranslation::ListBoundaryPlaceholder {
        partitions: unbounded,
        clause: sql,
    }
}

fn layout_clause(layout: &HashLayout) -> String {
    let lines = layout.partitions.iter().map(|partition| {
        let placement = placement(Some(partition.tablespace));
        match partition.boundary {
            FixedBoundary::Expression(expr) => {
                format!("partition {} ({}){}", partition.name, expr, placement)
            }
            FixedBoundary::Values(list) => {
                format!("partition {} values ({}){}", partition.name, list, placement)
            }
            FixedBoundary::Remainder => format!("partition {} remainder{}", partition.name, placement),
        }
    });

    clause(layout.scheme, lines)
}

fn placeholder_clause(descriptor: &PartitionDescriptor, key_columns: &[String]) -> String {
    let lines = descriptor.partitions.iter().map(|partition| {
        format!(
            "partition {} values ({}){}",
            lower_ident(&partition.name),
            UNRESOLVED_BOUNDARY,
            placement(partition.tablespace.as_deref())
        )
    });

    clause(&format!("hash ( {} )", join_columns(key_columns)), lines)
}

fn placement(tablespace: Option<&str>) -> String {
    match tablespace {
        Some(tablespace) => format!(" in {}", lower_ident(tablespace)),
        None => String::new(),
    }
}

/// `  fragment by <scheme>` followed by one partition per line, comma-led after the first
fn clause(scheme: &str, lines: impl Iterator<Item = String>) -> String {
    let mut sql = format!("  fragment by {}\n", scheme);
    for (idx, line) in lines.enumerate() {
        sql.push_str(if idx == 0 { "    " } else { "   ," });
        sql.push_str(&line);
        sql.push('\n');
    }
    sql
}
