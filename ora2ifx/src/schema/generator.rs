//! Informix DDL generator
//!
//! Assembles one `create table` block per table followed by the schema-level
//! object blocks. Each table block is built in isolation: a catalog failure
//! drops that block and is recorded in the report, other blocks still emit.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::config::StorageConfig;
use crate::error::Result;
use crate::schema::formatter::{format_fragments, format_objects, FragmentContext, FragmentKind, ObjectDdl};
use crate::schema::overrides::TypeOverrideTable;
use crate::schema::partition::{translate_partitioning, PartitionTranslation};
use crate::schema::typemap::resolve_in_table;
use crate::schema::types::{ColumnDescriptor, IndexDescriptor, ObjectKind, TableDescriptor};
use crate::utils::naming::{lower_ident, object_path, quoted_owner_name};

/// Something in the output that needs manual follow-up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Anomaly {
    /// `OWNER.TABLE[.COLUMN]` or `OWNER.INDEX`
    pub object: String,
    #[serde(flatten)]
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnomalyKind {
    /// Column type emitted as a placeholder
    UnresolvedType { source_type: String },
    /// Hash-partitioned table left without a fragmentation clause
    UnsupportedTablePartition { key: String },
    /// Hash-partitioned index emitted with placeholder boundaries
    IndexPartitionPlaceholder { key: String },
    /// List partitions emitted with placeholder boundaries
    ListBoundaryPlaceholder { partitions: Vec<String> },
}

impl AnomalyKind {
    /// The anomaly a partition translation carries, if any
    pub fn of_partitioning(translation: &PartitionTranslation) -> Option<Self> {
        match translation {
            PartitionTranslation::NotPartitioned | PartitionTranslation::Clause(_) => None,
            PartitionTranslation::UnsupportedTableHash { key } => {
                Some(AnomalyKind::UnsupportedTablePartition { key: key.clone() })
            }
            PartitionTranslation::IndexHashPlaceholder { key, .. } => {
                Some(AnomalyKind::IndexPartitionPlaceholder { key: key.clone() })
            }
            PartitionTranslation::ListBoundaryPlaceholder { partitions, .. } => {
                Some(AnomalyKind::ListBoundaryPlaceholder {
                    partitions: partitions.clone(),
                })
            }
        }
    }
}

/// An object whose block was omitted because catalog access failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub object: String,
    pub message: String,
}

/// Out-of-band list of everything needing attention after a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    pub anomalies: Vec<Anomaly>,
    pub failures: Vec<Failure>,
}

impl GenerationReport {
    /// True when nothing was unresolved and nothing failed
    pub fn is_clean(&self) -> bool {
        self.anomalies.is_empty() && self.failures.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// DDL of one table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableScript {
    pub ddl: String,
    pub anomalies: Vec<Anomaly>,
}

/// DDL of a whole schema with its report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaScript {
    pub ddl: String,
    pub report: GenerationReport,
}

/// Schema DDL generator over a catalog
pub struct SchemaGenerator<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    overrides: &'a TypeOverrideTable,
    storage: StorageConfig,
}

impl<'a, C: Catalog + ?Sized> SchemaGenerator<'a, C> {
    /// Create a generator with default extent sizing
    pub fn new(catalog: &'a C, overrides: &'a TypeOverrideTable) -> Self {
        Self {
            catalog,
            overrides,
            storage: StorageConfig::default(),
        }
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Generate every table of the schema, then its schema-level objects
    ///
    /// Only a failure to list the schema's tables is returned as an error.
    pub async fn generate_schema(&self, owner: &str) -> Result<SchemaScript> {
        let tables = self.catalog.tables(owner).await?;
        tracing::info!(owner = %owner, tables = tables.len(), "Generating schema");

        let mut script = SchemaScript::default();
        for table in &tables {
            match self.generate_table(owner, table).await {
                Ok(table_script) => {
                    script.ddl.push_str(&table_script.ddl);
                    script.ddl.push('\n');
                    script.report.anomalies.extend(table_script.anomalies);
                }
                Err(e) => {
                    let object = object_path(&[owner, &table.name]);
                    tracing::error!(table = %object, error = %e, "Table skipped");
                    script.report.failures.push(Failure {
                        object,
                        message: e.to_string(),
                    });
                }
            }
        }

        append_objects(&mut script, owner, "SEQUENCES", self.catalog.sequences(owner).await);
        append_objects(&mut script, owner, "SYNONYMS", self.catalog.synonyms(owner).await);
        append_objects(&mut script, owner, "PROCEDURES", self.catalog.procedures(owner).await);
        append_objects(&mut script, owner, "VIEWS", self.catalog.views(owner).await);
        append_objects(&mut script, owner, "TRIGGERS", self.catalog.triggers(owner).await);

        tracing::info!(
            owner = %owner,
            anomalies = script.report.anomalies.len(),
            failures = script.report.failures.len(),
            "Schema generated"
        );
        Ok(script)
    }

    /// Generate one table block; any catalog failure fails the whole block
    pub async fn generate_table(&self, owner: &str, table: &TableDescriptor) -> Result<TableScript> {
        let name = table.name.as_str();
        let mut anomalies = Vec::new();

        let columns = self.catalog.columns(owner, name).await?;
        let mut ddl = format!("create table {}\n  (\n", quoted_owner_name(owner, name));
        ddl.push_str(&self.column_block(owner, name, &columns, &mut anomalies));
        ddl.push_str("  )\n");

        if table.partitioned {
            let translation = self.translate(owner, ObjectKind::Table, name).await?;
            if let Some(kind) = AnomalyKind::of_partitioning(&translation) {
                anomalies.push(Anomaly {
                    object: object_path(&[owner, name]),
                    kind,
                });
            }
            ddl.push_str(translation.as_str());
        } else if let Some(tablespace) = &table.tablespace {
            ddl.push_str(&format!("  in {}\n", lower_ident(tablespace)));
        }
        ddl.push_str(&format!(
            "  extent size {} next size {} lock mode row;\n",
            self.storage.extent_size(table.initial_extent_kb),
            self.storage.extent_size(table.next_extent_kb)
        ));

        let indexes = self.catalog.indexes(owner, name).await?;
        let index_partitions = self.index_partitions(owner, &indexes, &mut anomalies).await?;
        let ctx = FragmentContext::new(owner, name, &index_partitions);

        for kind in FragmentKind::TABLE_ORDER {
            let block = match kind.constraint_type() {
                Some(constraint_type) => {
                    let rows = self.catalog.constraints(owner, name, constraint_type).await?;
                    format_fragments(&ctx, kind, &rows)
                }
                None => format_fragments(&ctx, kind, &indexes),
            };
            tracing::trace!(table = %name, block = kind.label(), bytes = block.len(), "Block formatted");
            ddl.push_str(&block);
            ddl.push('\n');
        }

        tracing::info!(
            owner = %owner,
            table = %name,
            columns = columns.len(),
            indexes = indexes.len(),
            "Table generated"
        );
        Ok(TableScript { ddl, anomalies })
    }

    fn column_block(
        &self,
        owner: &str,
        table: &str,
        columns: &[ColumnDescriptor],
        anomalies: &mut Vec<Anomaly>,
    ) -> String {
        let width = columns
            .iter()
            .map(|column| lower_ident(&column.name).chars().count())
            .max()
            .unwrap_or(0);

        let mut block = String::new();
        for (idx, column) in columns.iter().enumerate() {
            let target = resolve_in_table(owner, table, column, self.overrides);
            if target.is_unresolved() {
                tracing::warn!(
                    table = %table,
                    column = %column.name,
                    source_type = %column.data_type,
                    "Unresolved column type"
                );
                anomalies.push(Anomaly {
                    object: object_path(&[owner, table, &column.name]),
                    kind: AnomalyKind::UnresolvedType {
                        source_type: column.data_type.clone(),
                    },
                });
            } else {
                tracing::debug!(table = %table, column = %column.name, resolved = %target, "Column resolved");
            }

            block.push_str(if idx == 0 { "     " } else { "    ," });
            block.push_str(&format!(
                "{:<width$} {}",
                lower_ident(&column.name),
                target.as_str(),
                width = width
            ));
            if let Some(default) = column.default.as_deref().map(str::trim) {
                if !default.is_empty() {
                    block.push_str(&format!(" default {}", default));
                }
            }
            if !column.nullable {
                block.push_str(" not null");
            }
            block.push('\n');
        }
        block
    }

    async fn translate(&self, owner: &str, kind: ObjectKind, name: &str) -> Result<PartitionTranslation> {
        tracing::debug!(owner = %owner, kind = %kind, object = %name, "Translating partitioning");
        let descriptor = self.catalog.partitioning(owner, kind, name).await?;
        let key_columns = self.catalog.partition_key_columns(owner, kind, name).await?;
        Ok(translate_partitioning(&descriptor, &key_columns))
    }

    async fn index_partitions(
        &self,
        owner: &str,
        indexes: &[IndexDescriptor],
        anomalies: &mut Vec<Anomaly>,
    ) -> Result<HashMap<String, PartitionTranslation>> {
        let mut translations = HashMap::new();
        for index in indexes.iter().filter(|index| index.partitioned) {
            let translation = self.translate(owner, ObjectKind::Index, &index.name).await?;
            if let Some(kind) = AnomalyKind::of_partitioning(&translation) {
                anomalies.push(Anomaly {
                    object: object_path(&[owner, &index.name]),
                    kind,
                });
            }
            translations.insert(index.name.to_uppercase(), translation);
        }
        Ok(translations)
    }
}

fn append_objects<T: ObjectDdl>(
    script: &mut SchemaScript,
    owner: &str,
    label: &str,
    rows: Result<Vec<T>>,
) {
    match rows {
        Ok(rows) => {
            tracing::debug!(owner = %owner, objects = label, count = rows.len(), "Schema objects formatted");
            script.ddl.push_str(&format_objects(owner, &rows));
            script.ddl.push('\n');
        }
        Err(e) => {
            let object = object_path(&[owner, label]);
            tracing::error!(objects = %object, error = %e, "Schema objects skipped");
            script.report.failures.push(Failure {
                object,
                message: e.to_string(),
            });
        }
    }
}
