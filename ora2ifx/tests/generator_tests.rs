//! End-to-end tests for schema generation over in-memory catalog snapshots

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rstest::*;

use ora2ifx::catalog::snapshot::{PartitionSnapshot, SchemaSnapshot, TableSnapshot};
use ora2ifx::catalog::{Catalog, CatalogSnapshot, SnapshotCatalog};
use ora2ifx::schema::types::*;
use ora2ifx::schema::{AnomalyKind, SchemaGenerator, TypeOverrideTable};
use ora2ifx::{Error, Result};

fn table_with(name: &str, columns: Vec<ColumnDescriptor>) -> TableSnapshot {
    let mut table = TableSnapshot::new(TableDescriptor::new("HR", name));
    table.columns = columns;
    table
}

fn catalog_of(schema: SchemaSnapshot) -> SnapshotCatalog {
    let mut snapshot = CatalogSnapshot::default();
    snapshot.schemas.insert("HR".to_string(), schema);
    SnapshotCatalog::new(snapshot)
}

fn hash_partitioning(key: &str, count: usize) -> PartitionSnapshot {
    PartitionSnapshot {
        strategy: PartitionStrategy::Hash,
        key_columns: vec![key.to_string()],
        partitions: (1..=count)
            .map(|i| PartitionEntry::new(&format!("SYS_P{}", i), &format!("DATA{}", i), None))
            .collect(),
    }
}

#[fixture]
fn items_table() -> TableSnapshot {
    let mut table = table_with(
        "ITEMS",
        vec![
            ColumnDescriptor::new("NAME", "VARCHAR2").length(4000).ordinal(1),
            ColumnDescriptor::new("QTY", "NUMBER").precision(5).scale(0).ordinal(2),
        ],
    );
    table.constraints = vec![ConstraintDescriptor::primary("PK_ITEMS", "ITEMS", &["NAME"])];
    table
}

#[fixture]
fn hr_schema(items_table: TableSnapshot) -> SchemaSnapshot {
    let mut employees = table_with(
        "EMPLOYEES",
        vec![
            ColumnDescriptor::new("EMP_ID", "NUMBER").precision(9).scale(0).nullable(false).ordinal(1),
            ColumnDescriptor::new("HIRED", "DATE").ordinal(2),
            ColumnDescriptor::new("NOTE", "CLOB").ordinal(3),
        ],
    );
    employees.table = employees.table.tablespace("USERS").extents(256, 128);
    employees.constraints = vec![
        ConstraintDescriptor::primary("PK_EMP", "EMPLOYEES", &["EMP_ID"]),
        ConstraintDescriptor::foreign("FK_ITEM", "EMPLOYEES", &["EMP_ID"], "ITEMS", &["QTY"]),
    ];

    SchemaSnapshot {
        tables: vec![items_table, employees],
        sequences: vec![SequenceDescriptor {
            name: "EMP_SEQ".to_string(),
            increment_by: 1,
            min_value: "1".to_string(),
            max_value: "999999".to_string(),
            cycle: true,
            order: false,
            cache_size: 0,
            last_number: "42".to_string(),
        }],
        synonyms: vec![SynonymDescriptor {
            name: "STAFF".to_string(),
            table_owner: "HR".to_string(),
            table_name: "EMPLOYEES".to_string(),
            db_link: None,
        }],
        views: vec![ViewDescriptor {
            name: "EMP_V".to_string(),
            text: "select emp_id from employees".to_string(),
            columns: vec!["EMP_ID".to_string()],
        }],
        ..Default::default()
    }
}

#[rstest]
#[tokio::test]
async fn test_single_table_end_to_end(items_table: TableSnapshot) {
    let descriptor = items_table.table.clone();
    let catalog = catalog_of(SchemaSnapshot {
        tables: vec![items_table],
        ..Default::default()
    });
    let overrides = TypeOverrideTable::new();

    let script = SchemaGenerator::new(&catalog, &overrides)
        .generate_table("HR", &descriptor)
        .await
        .unwrap();

    assert_eq!(
        script.ddl,
        "create table \"hr\".items\n  (\n\
         \x20    name lvarchar(4000)\n\
         \x20   ,qty  integer\n\
         \x20 )\n\
         \x20 extent size 64 next size 64 lock mode row;\n\
         \n\n\
         alter table hr.items add constraint pk_items primary key ( name );\n\
         \n\n\n"
    );
    assert!(!script.ddl.contains("fragment by"));
    assert!(script.anomalies.is_empty());
}

#[rstest]
#[tokio::test]
async fn test_generation_is_idempotent(hr_schema: SchemaSnapshot) {
    let catalog = catalog_of(hr_schema);
    let overrides = TypeOverrideTable::new();
    let generator = SchemaGenerator::new(&catalog, &overrides);

    let first = generator.generate_schema("HR").await.unwrap();
    let second = generator.generate_schema("hr").await.unwrap();

    assert_eq!(first, second);
    assert!(first.report.is_clean());
}

#[rstest]
#[tokio::test]
async fn test_schema_layout(hr_schema: SchemaSnapshot) {
    let catalog = catalog_of(hr_schema);
    let overrides = TypeOverrideTable::new();

    let ddl = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("HR")
        .await
        .unwrap()
        .ddl;

    // Tables by name, then schema objects in fixed order
    let employees = ddl.find("create table \"hr\".employees").unwrap();
    let items = ddl.find("create table \"hr\".items").unwrap();
    let sequence = ddl.find("create sequence hr.emp_seq").unwrap();
    let synonym = ddl.find("create synonym hr.staff for hr.employees;").unwrap();
    let view = ddl.find("create or replace view hr.emp_v").unwrap();
    assert!(employees < items && items < sequence && sequence < synonym && synonym < view);

    assert!(ddl.contains("  in users\n  extent size 256 next size 128 lock mode row;\n"));
    assert!(ddl.contains("     emp_id integer not null\n"));
    assert!(ddl.contains("    ,hired  datetime year to second\n"));
    assert!(ddl.contains("    ,note   clob\n"));
    assert!(ddl.contains(
        "alter table hr.employees add constraint fk_item foreign key ( emp_id ) references items ( qty );\n"
    ));
    assert!(ddl.contains("maxvalue 999999 minvalue 1 cycle nocache noorder;\n"));
    assert!(ddl.contains("alter sequence hr.emp_seq restart with 42;\n"));
}

#[rstest]
#[tokio::test]
async fn test_override_wins_over_rules(hr_schema: SchemaSnapshot) {
    let catalog = catalog_of(hr_schema);
    let overrides: TypeOverrideTable = vec![TypeOverrideEntry {
        owner: "hr".to_string(),
        table: "items".to_string(),
        column: "name".to_string(),
        target_type: "varchar(200,20)".to_string(),
    }]
    .into_iter()
    .collect();

    let ddl = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("HR")
        .await
        .unwrap()
        .ddl;

    assert!(ddl.contains("     name varchar(200,20)\n"));
    assert!(!ddl.contains("lvarchar(4000)"));
}

#[rstest]
#[case::device("DEVICENUM", 6, "fragment by expression")]
#[case::gendate("GENDATETIME", 7, "fragment by list (gendatetime[1,4])")]
#[tokio::test]
async fn test_known_hash_keys_use_fixed_layouts(
    #[case] key: &str,
    #[case] partitions: usize,
    #[case] header: &str,
) {
    let mut table = table_with("STATS", vec![ColumnDescriptor::new(key, "VARCHAR2").length(20).ordinal(1)]);
    table.table = table.table.partitioned(true);
    table.partitioning = Some(hash_partitioning(key, 16));
    let descriptor = table.table.clone();
    let catalog = catalog_of(SchemaSnapshot {
        tables: vec![table],
        ..Default::default()
    });
    let overrides = TypeOverrideTable::new();

    let script = SchemaGenerator::new(&catalog, &overrides)
        .generate_table("HR", &descriptor)
        .await
        .unwrap();

    assert!(script.ddl.contains(header));
    assert_eq!(script.ddl.matches("partition p_").count(), partitions);
    assert!(!script.ddl.contains("sys_p"));
    assert!(script.anomalies.is_empty());
}

#[tokio::test]
async fn test_unknown_hash_key_differs_for_tables_and_indexes() {
    let mut table = table_with(
        "ORDERS",
        vec![ColumnDescriptor::new("CUSTOMER_ID", "NUMBER").precision(10).scale(0).ordinal(1)],
    );
    table.table = table.table.partitioned(true);
    table.partitioning = Some(hash_partitioning("CUSTOMER_ID", 4));
    table.indexes = vec![IndexDescriptor {
        name: "IX_ORDERS_CUST".to_string(),
        table: "ORDERS".to_string(),
        unique: false,
        tablespace: None,
        partitioned: true,
        columns: vec![IndexColumn::asc("CUSTOMER_ID")],
    }];
    table
        .index_partitions
        .insert("IX_ORDERS_CUST".to_string(), hash_partitioning("CUSTOMER_ID", 3));

    let catalog = catalog_of(SchemaSnapshot {
        tables: vec![table],
        ..Default::default()
    });
    let overrides = TypeOverrideTable::new();

    let script = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("HR")
        .await
        .unwrap();

    // Table: no clause at all; index: one placeholder per source partition
    assert_eq!(script.ddl.matches("fragment by").count(), 1);
    assert!(script.ddl.contains(
        "create index hr.ix_orders_cust on hr.orders ( customer_id )\n  fragment by hash ( customer_id )\n"
    ));
    assert_eq!(script.ddl.matches("values (???)").count(), 3);

    let kinds: Vec<(&str, &AnomalyKind)> = script
        .report
        .anomalies
        .iter()
        .map(|a| (a.object.as_str(), &a.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (
                "HR.ORDERS",
                &AnomalyKind::UnsupportedTablePartition {
                    key: "CUSTOMER_ID".to_string()
                }
            ),
            (
                "HR.IX_ORDERS_CUST",
                &AnomalyKind::IndexPartitionPlaceholder {
                    key: "CUSTOMER_ID".to_string()
                }
            ),
        ]
    );
}

#[tokio::test]
async fn test_list_partition_without_boundary_is_reported() {
    let mut table = table_with("EVENTS", vec![ColumnDescriptor::new("KIND", "CHAR").length(1).ordinal(1)]);
    table.table = table.table.partitioned(true);
    table.partitioning = Some(PartitionSnapshot {
        strategy: PartitionStrategy::List,
        key_columns: vec!["KIND".to_string()],
        partitions: vec![
            PartitionEntry::new("P1", "D1", None),
            PartitionEntry::new("P2", "D2", Some("'B'")),
        ],
    });
    let catalog = catalog_of(SchemaSnapshot {
        tables: vec![table],
        ..Default::default()
    });
    let overrides = TypeOverrideTable::new();

    let script = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("HR")
        .await
        .unwrap();

    assert!(script.ddl.contains("  fragment by list ( kind )
    partition p1 values (???) in d1
"));
    assert!(script.ddl.contains("   ,partition p2 values ('B') in d2
"));
    assert_eq!(script.report.anomalies.len(), 1);
    assert_eq!(script.report.anomalies[0].object, "HR.EVENTS");
    assert_eq!(
        script.report.anomalies[0].kind,
        AnomalyKind::ListBoundaryPlaceholder {
            partitions: vec!["P1".to_string()]
        }
    );
}

/// Delegates to a snapshot but fails selected lookups
struct FailingCatalog {
    inner: SnapshotCatalog,
    broken_table: &'static str,
}

#[async_trait]
impl Catalog for FailingCatalog {
    async fn tables(&self, owner: &str) -> Result<Vec<TableDescriptor>> {
        self.inner.tables(owner).await
    }

    async fn columns(&self, owner: &str, table: &str) -> Result<Vec<ColumnDescriptor>> {
        // Rows come back without owner or table, as a bare column query returns them
        let mut columns = self.inner.columns(owner, table).await?;
        for column in &mut columns {
            column.owner.clear();
            column.table.clear();
        }
        Ok(columns)
    }

    async fn constraints(
        &self,
        owner: &str,
        table: &str,
        constraint_type: ConstraintType,
    ) -> Result<Vec<ConstraintDescriptor>> {
        // Fails after the column block has been built
        if table.eq_ignore_ascii_case(self.broken_table) && constraint_type == ConstraintType::Foreign {
            return Err(Error::catalog(format!("{}.{}", owner, table), "connection reset"));
        }
        self.inner.constraints(owner, table, constraint_type).await
    }

    async fn indexes(&self, owner: &str, table: &str) -> Result<Vec<IndexDescriptor>> {
        self.inner.indexes(owner, table).await
    }

    async fn partitioning(&self, owner: &str, kind: ObjectKind, name: &str) -> Result<PartitionDescriptor> {
        self.inner.partitioning(owner, kind, name).await
    }

    async fn partition_key_columns(&self, owner: &str, kind: ObjectKind, name: &str) -> Result<Vec<String>> {
        self.inner.partition_key_columns(owner, kind, name).await
    }

    async fn sequences(&self, owner: &str) -> Result<Vec<SequenceDescriptor>> {
        self.inner.sequences(owner).await
    }

    async fn synonyms(&self, _owner: &str) -> Result<Vec<SynonymDescriptor>> {
        Err(Error::catalog("HR.SYNONYMS", "permission denied"))
    }

    async fn procedures(&self, owner: &str) -> Result<Vec<ProcedureDescriptor>> {
        self.inner.procedures(owner).await
    }

    async fn views(&self, owner: &str) -> Result<Vec<ViewDescriptor>> {
        self.inner.views(owner).await
    }

    async fn triggers(&self, owner: &str) -> Result<Vec<TriggerDescriptor>> {
        self.inner.triggers(owner).await
    }
}

#[rstest]
#[tokio::test]
async fn test_failures_are_isolated(hr_schema: SchemaSnapshot) {
    let catalog = FailingCatalog {
        inner: catalog_of(hr_schema),
        broken_table: "EMPLOYEES",
    };
    let overrides = TypeOverrideTable::new();

    let script = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("HR")
        .await
        .unwrap();

    // Nothing of the failed table leaks into the output
    assert!(!script.ddl.contains("employees\n  ("));
    assert!(!script.ddl.contains("pk_emp"));
    assert!(script.ddl.contains("create table \"hr\".items"));
    assert!(script.ddl.contains("create sequence hr.emp_seq"));
    assert!(script.ddl.contains("create or replace view hr.emp_v"));
    assert!(!script.ddl.contains("create synonym"));

    let failed: Vec<&str> = script.report.failures.iter().map(|f| f.object.as_str()).collect();
    assert_eq!(failed, vec!["HR.EMPLOYEES", "HR.SYNONYMS"]);
    assert!(script.report.failures[0].message.contains("connection reset"));
}

#[tokio::test]
async fn test_unknown_owner_is_fatal() {
    let catalog = catalog_of(SchemaSnapshot::default());
    let overrides = TypeOverrideTable::new();

    let err = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("SCOTT")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CatalogError { .. }));
}

#[rstest]
#[tokio::test]
async fn test_override_keys_on_the_generated_table(hr_schema: SchemaSnapshot) {
    let catalog = FailingCatalog {
        inner: catalog_of(hr_schema),
        broken_table: "NONE",
    };
    let overrides: TypeOverrideTable = vec![TypeOverrideEntry {
        owner: "HR".to_string(),
        table: "ITEMS".to_string(),
        column: "QTY".to_string(),
        target_type: "smallint".to_string(),
    }]
    .into_iter()
    .collect();

    let ddl = SchemaGenerator::new(&catalog, &overrides)
        .generate_schema("HR")
        .await
        .unwrap()
        .ddl;

    assert!(ddl.contains("    ,qty  smallint\n"));
}
