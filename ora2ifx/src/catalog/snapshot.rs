//! File-backed catalog
//!
//! A snapshot is an offline dump of the catalog rows for one or more schemas,
//! stored as JSON or YAML. Lookups are case-insensitive and rows come back in
//! the order the catalog views would deliver them.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::schema::types::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintKind, ConstraintType, IndexDescriptor,
    ObjectKind, PartitionDescriptor, PartitionEntry, PartitionStrategy, ProcedureDescriptor,
    SequenceDescriptor, SynonymDescriptor, TableDescriptor, TriggerDescriptor, ViewDescriptor,
};
use crate::utils::naming::object_path;

/// Root of a snapshot file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaSnapshot>,
}

/// All rows of one schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub tables: Vec<TableSnapshot>,
    #[serde(default)]
    pub sequences: Vec<SequenceDescriptor>,
    #[serde(default)]
    pub synonyms: Vec<SynonymDescriptor>,
    #[serde(default)]
    pub procedures: Vec<ProcedureDescriptor>,
    #[serde(default)]
    pub views: Vec<ViewDescriptor>,
    #[serde(default)]
    pub triggers: Vec<TriggerDescriptor>,
}

/// A table row together with everything hanging off it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    #[serde(flatten)]
    pub table: TableDescriptor,
    #[serde(default)]
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDescriptor>,
    #[serde(default)]
    pub indexes: Vec<IndexDescriptor>,
    pub partitioning: Option<PartitionSnapshot>,
    /// Partitioning of the table's indexes, keyed by index name
    #[serde(default)]
    pub index_partitions: IndexMap<String, PartitionSnapshot>,
}

impl TableSnapshot {
    pub fn new(table: TableDescriptor) -> Self {
        Self {
            table,
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            partitioning: None,
            index_partitions: IndexMap::new(),
        }
    }
}

/// Partitioning rows of one table or index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionSnapshot {
    pub strategy: PartitionStrategy,
    #[serde(default)]
    pub key_columns: Vec<String>,
    #[serde(default)]
    pub partitions: Vec<PartitionEntry>,
}

impl PartitionSnapshot {
    fn descriptor(&self, kind: ObjectKind, name: &str) -> PartitionDescriptor {
        PartitionDescriptor {
            object_name: name.to_uppercase(),
            object_kind: kind,
            strategy: self.strategy,
            partitions: self.partitions.clone(),
        }
    }
}

fn unpartitioned(kind: ObjectKind, name: &str) -> PartitionDescriptor {
    PartitionDescriptor {
        object_name: name.to_uppercase(),
        object_kind: kind,
        strategy: PartitionStrategy::None,
        partitions: Vec::new(),
    }
}

/// Catalog served from a loaded snapshot
#[derive(Debug, Clone, Default)]
pub struct SnapshotCatalog {
    schemas: HashMap<String, SchemaSnapshot>,
}

impl SnapshotCatalog {
    /// Index a snapshot by upper-cased owner and fill in owner/table on every row
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let schemas = snapshot
            .schemas
            .into_iter()
            .map(|(owner, mut schema)| {
                let owner = owner.trim().to_uppercase();
                for entry in &mut schema.tables {
                    if entry.table.owner.is_empty() {
                        entry.table.owner = owner.clone();
                    }
                    let table_name = entry.table.name.clone();
                    for column in &mut entry.columns {
                        column.owner = owner.clone();
                        column.table = table_name.clone();
                    }
                    for constraint in &mut entry.constraints {
                        constraint.table = table_name.clone();
                    }
                    for index in &mut entry.indexes {
                        index.table = table_name.clone();
                    }
                }
                (owner, schema)
            })
            .collect();

        Self { schemas }
    }

    /// Load a snapshot file, choosing the format by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read catalog snapshot {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        let catalog = match extension.as_deref() {
            Some("json") => Self::from_json(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            _ => {
                return Err(Error::ConfigError(format!(
                    "Unsupported catalog snapshot format: {} (expected .json, .yaml or .yml)",
                    path.display()
                )))
            }
        };

        tracing::info!(
            path = %path.display(),
            schemas = catalog.schemas.len(),
            "Loaded catalog snapshot"
        );
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_json::from_str(content)?;
        Ok(Self::new(snapshot))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot = serde_yaml::from_str(content)?;
        Ok(Self::new(snapshot))
    }

    fn schema(&self, owner: &str) -> Result<&SchemaSnapshot> {
        self.schemas
            .get(&owner.trim().to_uppercase())
            .ok_or_else(|| Error::catalog(owner, "schema not found in catalog snapshot"))
    }

    fn table(&self, owner: &str, table: &str) -> Result<&TableSnapshot> {
        self.schema(owner)?
            .tables
            .iter()
            .find(|entry| entry.table.name.eq_ignore_ascii_case(table.trim()))
            .ok_or_else(|| {
                Error::catalog(object_path(&[owner, table]), "table not found in catalog snapshot")
            })
    }

    /// The partitioning entry of an object, `None` when it exists but is not partitioned
    fn partition_entry(
        &self,
        owner: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Option<&PartitionSnapshot>> {
        match kind {
            ObjectKind::Table => Ok(self.table(owner, name)?.partitioning.as_ref()),
            ObjectKind::Index => {
                let name = name.trim();
                let owning_table = self
                    .schema(owner)?
                    .tables
                    .iter()
                    .find(|entry| {
                        entry
                            .indexes
                            .iter()
                            .any(|index| index.name.eq_ignore_ascii_case(name))
                    })
                    .ok_or_else(|| {
                        Error::catalog(
                            object_path(&[owner, name]),
                            format!("{} not found in catalog snapshot", kind),
                        )
                    })?;

                Ok(owning_table
                    .index_partitions
                    .iter()
                    .find(|(index, _)| index.eq_ignore_ascii_case(name))
                    .map(|(_, partitioning)| partitioning))
            }
        }
    }
}

fn is_not_null_check(constraint: &ConstraintDescriptor) -> bool {
    match &constraint.kind {
        ConstraintKind::Check { predicate } => {
            predicate.trim().to_uppercase().ends_with("IS NOT NULL")
        }
        _ => false,
    }
}

#[async_trait]
impl Catalog for SnapshotCatalog {
    async fn tables(&self, owner: &str) -> Result<Vec<TableDescriptor>> {
        let mut tables: Vec<TableDescriptor> = self
            .schema(owner)?
            .tables
            .iter()
            .map(|entry| entry.table.clone())
            .collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tables)
    }

    async fn columns(&self, owner: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        let mut columns = self.table(owner, table)?.columns.clone();
        columns.sort_by_key(|column| column.ordinal);
        Ok(columns)
    }

    async fn constraints(
        &self,
        owner: &str,
        table: &str,
        constraint_type: ConstraintType,
    ) -> Result<Vec<ConstraintDescriptor>> {
        let mut constraints: Vec<ConstraintDescriptor> = self
            .table(owner, table)?
            .constraints
            .iter()
            .filter(|constraint| constraint.constraint_type() == constraint_type)
            .filter(|constraint| !is_not_null_check(constraint))
            .cloned()
            .collect();
        constraints.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(constraints)
    }

    async fn indexes(&self, owner: &str, table: &str) -> Result<Vec<IndexDescriptor>> {
        let entry = self.table(owner, table)?;
        let unique_names: Vec<&str> = entry
            .constraints
            .iter()
            .filter(|constraint| constraint.constraint_type() == ConstraintType::Unique)
            .map(|constraint| constraint.name.as_str())
            .collect();

        let mut indexes: Vec<IndexDescriptor> = entry
            .indexes
            .iter()
            .filter(|index| {
                !unique_names
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(&index.name))
            })
            .cloned()
            .collect();
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(indexes)
    }

    async fn partitioning(
        &self,
        owner: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<PartitionDescriptor> {
        Ok(match self.partition_entry(owner, kind, name)? {
            Some(partitioning) => partitioning.descriptor(kind, name),
            None => unpartitioned(kind, name),
        })
    }

    async fn partition_key_columns(
        &self,
        owner: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Vec<String>> {
        Ok(self
            .partition_entry(owner, kind, name)?
            .map(|partitioning| partitioning.key_columns.clone())
            .unwrap_or_default())
    }

    async fn sequences(&self, owner: &str) -> Result<Vec<SequenceDescriptor>> {
        Ok(self.schema(owner)?.sequences.clone())
    }

    async fn synonyms(&self, owner: &str) -> Result<Vec<SynonymDescriptor>> {
        Ok(self.schema(owner)?.synonyms.clone())
    }

    async fn procedures(&self, owner: &str) -> Result<Vec<ProcedureDescriptor>> {
        Ok(self.schema(owner)?.procedures.clone())
    }

    async fn views(&self, owner: &str) -> Result<Vec<ViewDescriptor>> {
        Ok(self.schema(owner)?.views.clone())
    }

    async fn triggers(&self, owner: &str) -> Result<Vec<TriggerDescriptor>> {
        Ok(self.schema(owner)?.triggers.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SNAPSHOT: &str = r#"{
  "schemas": {
    "hr": {
      "tables": [
        {
          "name": "EMPLOYEES",
          "tablespace": "USERS",
          "initial_extent_kb": 64,
          "next_extent_kb": 16,
          "columns": [
            { "name": "NAME", "data_type": "VARCHAR2", "length": 40, "ordinal": 2 },
            { "name": "EMP_ID", "data_type": "NUMBER", "precision": 9, "scale": 0, "nullable": false, "ordinal": 1 }
          ],
          "constraints": [
            { "name": "SYS_C001", "kind": "check", "predicate": "\"EMP_ID\" IS NOT NULL" },
            { "name": "CK_NAME", "kind": "check", "predicate": "NAME <> 'x'" },
            { "name": "UQ_NAME", "kind": "unique", "columns": ["NAME"] },
            { "name": "PK_EMP", "kind": "primary", "columns": ["EMP_ID"] }
          ],
          "indexes": [
            { "name": "UQ_NAME", "unique": true, "columns": [ { "column": "NAME" } ] },
            { "name": "IX_NAME", "tablespace": "IDX", "columns": [ { "column": "NAME", "descending": true } ] }
          ]
        },
        {
          "name": "AUDIT_LOG",
          "partitioned": true,
          "columns": [],
          "partitioning": {
            "strategy": "hash",
            "key_columns": ["DEVICENUM"],
            "partitions": [ { "name": "SYS_P1", "tablespace": "DATA1" } ]
          },
          "indexes": [
            { "name": "IX_AUDIT", "partitioned": true, "columns": [ { "column": "DEVICENUM" } ] }
          ],
          "index_partitions": {
            "IX_AUDIT": {
              "strategy": "list",
              "key_columns": ["KIND"],
              "partitions": [ { "name": "P1", "tablespace": "DATA1", "boundary": "'A'" } ]
            }
          }
        }
      ],
      "sequences": [
        { "name": "EMP_SEQ", "increment_by": 1, "min_value": "1", "max_value": "999", "cache_size": 20, "last_number": "41" }
      ]
    }
  }
}"#;

    fn catalog() -> SnapshotCatalog {
        SnapshotCatalog::from_json(SNAPSHOT).unwrap()
    }

    #[tokio::test]
    async fn test_tables_sorted_and_owner_filled() {
        let tables = catalog().tables("HR").await.unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["AUDIT_LOG", "EMPLOYEES"]);
        assert_eq!(tables[1].owner, "HR");
        assert_eq!(tables[1].next_extent_kb, Some(16));
    }

    #[tokio::test]
    async fn test_columns_ordered_by_ordinal() {
        let columns = catalog().columns("hr", "employees").await.unwrap();
        assert_eq!(columns[0].name, "EMP_ID");
        assert_eq!(columns[0].table, "EMPLOYEES");
        assert!(!columns[0].nullable);
        assert!(columns[1].nullable);
    }

    #[tokio::test]
    async fn test_not_null_checks_are_excluded() {
        let checks = catalog()
            .constraints("HR", "EMPLOYEES", ConstraintType::Check)
            .await
            .unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].name, "CK_NAME");
    }

    #[tokio::test]
    async fn test_indexes_backing_unique_constraints_are_excluded() {
        let indexes = catalog().indexes("HR", "EMPLOYEES").await.unwrap();
        let names: Vec<&str> = indexes.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["IX_NAME"]);
        assert!(indexes[0].columns[0].descending);
    }

    #[tokio::test]
    async fn test_partitioning_of_tables_and_indexes() {
        let catalog = catalog();

        let table = catalog
            .partitioning("HR", ObjectKind::Table, "audit_log")
            .await
            .unwrap();
        assert_eq!(table.strategy, PartitionStrategy::Hash);
        assert_eq!(table.object_name, "AUDIT_LOG");
        assert_eq!(
            catalog
                .partition_key_columns("HR", ObjectKind::Table, "AUDIT_LOG")
                .await
                .unwrap(),
            vec!["DEVICENUM".to_string()]
        );

        let index = catalog
            .partitioning("HR", ObjectKind::Index, "IX_AUDIT")
            .await
            .unwrap();
        assert_eq!(index.strategy, PartitionStrategy::List);
        assert_eq!(index.partitions[0].boundary.as_deref(), Some("'A'"));

        let plain = catalog
            .partitioning("HR", ObjectKind::Table, "EMPLOYEES")
            .await
            .unwrap();
        assert_eq!(plain.strategy, PartitionStrategy::None);
        assert!(plain.partitions.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_objects_are_catalog_errors() {
        let catalog = catalog();

        let err = catalog.columns("HR", "MISSING").await.unwrap_err();
        assert!(matches!(err, Error::CatalogError { ref object, .. } if object == "HR.MISSING"));

        let err = catalog.tables("SCOTT").await.unwrap_err();
        assert!(matches!(err, Error::CatalogError { .. }));

        let err = catalog
            .partitioning("HR", ObjectKind::Index, "IX_NOPE")
            .await
            .unwrap_err();
        assert!(
            matches!(err, Error::CatalogError { ref message, .. } if message == "INDEX not found in catalog snapshot")
        );
    }

    #[tokio::test]
    async fn test_strategy_accepts_catalog_partitioning_type() {
        let yaml = "\
schemas:
  HR:
    tables:
      - name: EVENTS
        partitioned: true
        partitioning: { strategy: LIST, key_columns: [KIND] }
      - name: READINGS
        partitioned: true
        partitioning: { strategy: RANGE, key_columns: [TAKEN_AT] }
";
        let catalog = SnapshotCatalog::from_yaml(yaml).unwrap();

        let events = catalog.partitioning("HR", ObjectKind::Table, "EVENTS").await.unwrap();
        assert_eq!(events.strategy, PartitionStrategy::List);
        let readings = catalog.partitioning("HR", ObjectKind::Table, "READINGS").await.unwrap();
        assert_eq!(readings.strategy, PartitionStrategy::None);
    }

    #[tokio::test]
    async fn test_schema_objects() {
        let sequences = catalog().sequences("HR").await.unwrap();
        assert_eq!(sequences.len(), 1);
        assert_eq!(sequences[0].last_number, "41");
        assert!(catalog().views("HR").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_yaml_snapshot() {
        let yaml = "\
schemas:
  SCOTT:
    tables:
      - name: DEPT
        columns:
          - name: DEPTNO
            data_type: NUMBER
            precision: 2
            scale: 0
            ordinal: 1
";
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let catalog = SnapshotCatalog::load(file.path()).unwrap();
        let columns = catalog.columns("scott", "dept").await.unwrap();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].precision, Some(2));
        assert_eq!(columns[0].owner, "SCOTT");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        let err = SnapshotCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }
}
