//! ora2ifx: Informix DDL generation from Oracle catalog metadata
//!
//! ora2ifx reads the catalog rows of an Oracle schema (tables, columns,
//! constraints, indexes, partitioning and schema-level objects) and emits an
//! Informix DDL script, together with a report of every spot that needs manual
//! correction.

pub mod catalog;
pub mod config;
pub mod error;
pub mod schema;
pub mod utils;

// Re-export main types for easier access
pub use catalog::{Catalog, SnapshotCatalog};
pub use config::Config;
pub use error::{Error, Result};
pub use schema::generator::{GenerationReport, SchemaGenerator, SchemaScript};
pub use schema::overrides::TypeOverrideTable;

/// Initialize ora2ifx with the specified configuration file
pub fn init(config_path: &str) -> Result<Ora2IfxClient> {
    let config = config::load_from_file(config_path)?;
    Ora2IfxClient::new(config)
}

/// The main client: a loaded catalog snapshot plus the type override table
pub struct Ora2IfxClient {
    config: Config,
    catalog: SnapshotCatalog,
    overrides: TypeOverrideTable,
}

impl Ora2IfxClient {
    /// Load the catalog snapshot and override table named by the configuration
    pub fn new(config: Config) -> Result<Self> {
        let catalog_path = config.source.catalog.as_deref().ok_or_else(|| {
            Error::ConfigError("No catalog snapshot configured ([source] catalog)".to_string())
        })?;
        let catalog = SnapshotCatalog::load(catalog_path)?;
        let overrides = TypeOverrideTable::from_config(&config.type_mapping)?;

        Ok(Self {
            config,
            catalog,
            overrides,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn overrides(&self) -> &TypeOverrideTable {
        &self.overrides
    }

    /// Generate the DDL of one schema
    pub async fn generate_schema(&self, owner: &str) -> Result<SchemaScript> {
        SchemaGenerator::new(&self.catalog, &self.overrides)
            .with_storage(self.config.storage.clone())
            .generate_schema(owner)
            .await
    }

    /// Generate the DDL of the configured owner
    pub async fn generate(&self) -> Result<SchemaScript> {
        let owner = self.config.source.owner.as_deref().ok_or_else(|| {
            Error::ConfigError("No schema owner configured ([source] owner)".to_string())
        })?;
        self.generate_schema(owner).await
    }
}
