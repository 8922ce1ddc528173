//! Source catalog access
//!
//! The generator reads Oracle catalog rows only through the [`Catalog`] trait.
//! Implementations deliver rows already filtered and ordered the way the
//! catalog views return them; an `Err` marks a failed access for one object.

pub mod snapshot;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::types::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintType, IndexDescriptor, ObjectKind,
    PartitionDescriptor, ProcedureDescriptor, SequenceDescriptor, SynonymDescriptor,
    TableDescriptor, TriggerDescriptor, ViewDescriptor,
};

pub use snapshot::{CatalogSnapshot, SnapshotCatalog};

/// Catalog-access boundary
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Tables of a schema, ordered by name
    async fn tables(&self, owner: &str) -> Result<Vec<TableDescriptor>>;

    /// Columns of a table, ordered by ordinal position
    async fn columns(&self, owner: &str, table: &str) -> Result<Vec<ColumnDescriptor>>;

    /// Constraints of one kind, ordered by name; `IS NOT NULL` checks excluded
    async fn constraints(
        &self,
        owner: &str,
        table: &str,
        constraint_type: ConstraintType,
    ) -> Result<Vec<ConstraintDescriptor>>;

    /// Indexes of a table, excluding those backing a unique constraint
    async fn indexes(&self, owner: &str, table: &str) -> Result<Vec<IndexDescriptor>>;

    /// Partitioning metadata; strategy `None` when the object is not partitioned
    async fn partitioning(
        &self,
        owner: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<PartitionDescriptor>;

    /// Partition key columns in key position order
    async fn partition_key_columns(
        &self,
        owner: &str,
        kind: ObjectKind,
        name: &str,
    ) -> Result<Vec<String>>;

    async fn sequences(&self, owner: &str) -> Result<Vec<SequenceDescriptor>>;

    async fn synonyms(&self, owner: &str) -> Result<Vec<SynonymDescriptor>>;

    async fn procedures(&self, owner: &str) -> Result<Vec<ProcedureDescriptor>>;

    async fn views(&self, owner: &str) -> Result<Vec<ViewDescriptor>>;

    async fn triggers(&self, owner: &str) -> Result<Vec<TriggerDescriptor>>;
}
