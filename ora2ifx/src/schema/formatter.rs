//! DDL fragment formatting
//!
//! Table-level rows (constraints and indexes) implement [`DdlFragment`];
//! schema-level rows (sequences, synonyms, procedures, views, triggers)
//! implement [`ObjectDdl`]. Each row renders to one self-contained statement
//! and a block is the concatenation of its rows in catalog order.

use std::collections::HashMap;

use crate::schema::partition::PartitionTranslation;
use crate::schema::types::{
    ConstraintDescriptor, ConstraintKind, ConstraintType, IndexColumn, IndexDescriptor,
    ProcedureDescriptor, SequenceDescriptor, SynonymDescriptor, TriggerDescriptor, ViewDescriptor,
};
use crate::utils::naming::{join_columns, lower_ident, qualified_name};

/// Table-level blocks in the order they follow the `create table` statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Check,
    Unique,
    Primary,
    Index,
    ForeignKey,
}

impl FragmentKind {
    pub const TABLE_ORDER: [FragmentKind; 5] = [
        FragmentKind::Check,
        FragmentKind::Unique,
        FragmentKind::Primary,
        FragmentKind::Index,
        FragmentKind::ForeignKey,
    ];

    /// Catalog constraint type backing this block, `None` for indexes
    pub fn constraint_type(self) -> Option<ConstraintType> {
        match self {
            FragmentKind::Check => Some(ConstraintType::Check),
            FragmentKind::Unique => Some(ConstraintType::Unique),
            FragmentKind::Primary => Some(ConstraintType::Primary),
            FragmentKind::ForeignKey => Some(ConstraintType::Foreign),
            FragmentKind::Index => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FragmentKind::Check => "check constraints",
            FragmentKind::Unique => "unique constraints",
            FragmentKind::Primary => "primary key",
            FragmentKind::Index => "indexes",
            FragmentKind::ForeignKey => "foreign keys",
        }
    }
}

/// What a table-level fragment needs besides its own row
#[derive(Debug, Clone, Copy)]
pub struct FragmentContext<'a> {
    pub owner: &'a str,
    pub table: &'a str,
    /// Translated fragmentation of partitioned indexes, keyed by upper-cased index name
    pub index_partitions: &'a HashMap<String, PartitionTranslation>,
}

impl<'a> FragmentContext<'a> {
    pub fn new(
        owner: &'a str,
        table: &'a str,
        index_partitions: &'a HashMap<String, PartitionTranslation>,
    ) -> Self {
        Self {
            owner,
            table,
            index_partitions,
        }
    }

    fn qualified_table(&self) -> String {
        qualified_name(self.owner, self.table)
    }
}

/// A row that renders to one statement attached to a table
pub trait DdlFragment {
    fn fragment_kind(&self) -> FragmentKind;

    fn to_ddl(&self, ctx: &FragmentContext<'_>) -> String;
}

/// Render the rows of one block kind in order; empty when there are none
pub fn format_fragments<T: DdlFragment>(
    ctx: &FragmentContext<'_>,
    kind: FragmentKind,
    rows: &[T],
) -> String {
    rows.iter()
        .filter(|row| row.fragment_kind() == kind)
        .map(|row| row.to_ddl(ctx))
        .collect()
}

impl DdlFragment for ConstraintDescriptor {
    fn fragment_kind(&self) -> FragmentKind {
        match self.kind {
            ConstraintKind::Check { .. } => FragmentKind::Check,
            ConstraintKind::Unique { .. } => FragmentKind::Unique,
            ConstraintKind::Primary { .. } => FragmentKind::Primary,
            ConstraintKind::Foreign { .. } => FragmentKind::ForeignKey,
        }
    }

    fn to_ddl(&self, ctx: &FragmentContext<'_>) -> String {
        let prefix = format!(
            "alter table {} add constraint {}",
            ctx.qualified_table(),
            lower_ident(&self.name)
        );

        match &self.kind {
            ConstraintKind::Check { predicate } => {
                format!("{} check ( {} );\n", prefix, predicate.trim())
            }
            ConstraintKind::Unique { columns } => {
                format!("{} unique ( {} );\n", prefix, join_columns(columns))
            }
            ConstraintKind::Primary { columns } => {
                format!("{} primary key ( {} );\n", prefix, join_columns(columns))
            }
            ConstraintKind::Foreign {
                columns,
                ref_table,
                ref_columns,
            } => {
                let mut sql = format!(
                    "{} foreign key ( {} ) references {}",
                    prefix,
                    join_columns(columns),
                    lower_ident(ref_table)
                );
                // Same-named referenced columns are implied
                if columns.join(",") != ref_columns.join(",") {
                    sql.push_str(&format!(" ( {} )", join_columns(ref_columns)));
                }
                sql.push_str(";\n");
                sql
            }
        }
    }
}

fn index_key(column: &IndexColumn) -> String {
    let key = match &column.expression {
        Some(expression) => expression.trim().to_string(),
        None => lower_ident(&column.column),
    };
    if column.descending {
        format!("{} desc", key)
    } else {
        key
    }
}

impl DdlFragment for IndexDescriptor {
    fn fragment_kind(&self) -> FragmentKind {
        FragmentKind::Index
    }

    fn to_ddl(&self, ctx: &FragmentContext<'_>) -> String {
        let keys: Vec<String> = self.columns.iter().map(index_key).collect();
        let mut sql = format!(
            "create {}index {} on {} ( {} )",
            if self.unique { "unique " } else { "" },
            qualified_name(ctx.owner, &self.name),
            ctx.qualified_table(),
            keys.join(",")
        );

        if !self.partitioned {
            if let Some(tablespace) = &self.tablespace {
                sql.push_str(&format!("\n  in {}", lower_ident(tablespace)));
            }
        } else {
            let clause = ctx
                .index_partitions
                .get(&self.name.to_uppercase())
                .map(PartitionTranslation::as_str)
                .unwrap_or("");
            if !clause.is_empty() {
                sql.push('\n');
                sql.push_str(clause.trim_end_matches('\n'));
            }
        }

        sql.push_str(";\n");
        sql
    }
}

/// A schema-level row that renders to one standalone statement block
pub trait ObjectDdl {
    fn to_ddl(&self, owner: &str) -> String;
}

/// Render every object in order; empty when there are no rows
pub fn format_objects<T: ObjectDdl>(owner: &str, rows: &[T]) -> String {
    rows.iter().map(|row| row.to_ddl(owner)).collect()
}

impl ObjectDdl for SequenceDescriptor {
    fn to_ddl(&self, owner: &str) -> String {
        let name = qualified_name(owner, &self.name);
        let cache = if self.cache_size == 0 {
            "nocache".to_string()
        } else {
            format!("cache {}", self.cache_size)
        };

        format!(
            "create sequence {} increment by {} maxvalue {} minvalue {} {} {} {};\n\
             alter sequence {} restart with {};\n",
            name,
            self.increment_by,
            self.max_value.trim(),
            self.min_value.trim(),
            if self.cycle { "cycle" } else { "nocycle" },
            cache,
            if self.order { "order" } else { "noorder" },
            name,
            self.last_number.trim()
        )
    }
}

impl ObjectDdl for SynonymDescriptor {
    fn to_ddl(&self, owner: &str) -> String {
        if let Some(link) = &self.db_link {
            tracing::debug!(synonym = %self.name, db_link = %link, "Database link dropped from synonym");
        }
        format!(
            "create synonym {} for {};\n",
            qualified_name(owner, &self.name),
            qualified_name(&self.table_owner, &self.table_name)
        )
    }
}

impl ObjectDdl for ProcedureDescriptor {
    fn to_ddl(&self, _owner: &str) -> String {
        format!("create or replace {}\n\n", self.source.trim())
    }
}

impl ObjectDdl for ViewDescriptor {
    fn to_ddl(&self, owner: &str) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|column| format!("\"{}\"", column))
            .collect();

        format!(
            "create or replace view {} ({}) as\n{};\n\n",
            qualified_name(owner, &self.name),
            columns.join(","),
            self.text.trim().trim_end_matches(';')
        )
    }
}

impl ObjectDdl for TriggerDescriptor {
    fn to_ddl(&self, owner: &str) -> String {
        let mut sql = format!(
            "create or replace trigger {}.{}{}\n\n",
            lower_ident(owner),
            self.description,
            self.body.trim_end()
        );
        if !self.enabled {
            sql.push_str(&format!("set triggers {} disabled;\n\n", lower_ident(&self.name)));
        }
        sql
    }
}
