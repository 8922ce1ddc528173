//! Schema module for ora2ifx
//!
//! This module handles type resolution, partition translation and DDL assembly.

pub mod formatter;
pub mod generator;
pub mod overrides;
pub mod partition;
pub mod typemap;
pub mod types;

// Re-export key types
pub use formatter::{DdlFragment, FragmentContext, FragmentKind, ObjectDdl};
pub use generator::{
    Anomaly, AnomalyKind, Failure, GenerationReport, SchemaGenerator, SchemaScript, TableScript,
};
pub use overrides::TypeOverrideTable;
pub use partition::{translate, translate_scheme, PartitionTranslation};
pub use typemap::{resolve, resolve_in_table, resolve_type, TargetType};
pub use types::{
    ColumnDescriptor, ConstraintDescriptor, ConstraintKind, ConstraintType, IndexColumn,
    IndexDescriptor, ObjectKind, PartitionDescriptor, PartitionEntry, PartitionScheme,
    PartitionStrategy, ProcedureDescriptor, SequenceDescriptor, SynonymDescriptor,
    TableDescriptor, TriggerDescriptor, TypeOverrideEntry, ViewDescriptor,
};
