//! Column type overrides
//!
//! An operator-supplied list that forces the target type of named columns.
//! An override replaces the rule engine's output outright.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::TypeMappingConfig;
use crate::error::{Error, Result};
use crate::schema::types::TypeOverrideEntry;
use crate::utils::naming::column_key;

/// Forced target types keyed by upper-cased `OWNER:TABLE:COLUMN`
#[derive(Debug, Clone, Default)]
pub struct TypeOverrideTable {
    entries: HashMap<String, String>,
}

impl TypeOverrideTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a 4-field CSV file (owner, table, column, target type); the first record is a header
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            Error::OverrideError(format!("Failed to open {}: {}", path.display(), e))
        })?;
        let table = Self::from_reader(file)?;

        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            "Loaded type override table"
        );
        Ok(table)
    }

    /// Parse override records from any CSV source
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut table = Self::new();
        for (idx, record) in csv_reader.records().enumerate() {
            let record = record?;
            if record.len() != 4 {
                // +2: one for the header, one for 1-based numbering
                return Err(Error::OverrideError(format!(
                    "Record {} has {} fields, expected 4 (owner, table, column, target type)",
                    idx + 2,
                    record.len()
                )));
            }
            table.insert(TypeOverrideEntry {
                owner: record[0].to_string(),
                table: record[1].to_string(),
                column: record[2].to_string(),
                target_type: record[3].to_string(),
            });
        }

        Ok(table)
    }

    /// Build from the `[type_mapping]` config section: file first, inline entries after
    pub fn from_config(config: &TypeMappingConfig) -> Result<Self> {
        let mut table = match &config.override_file {
            Some(path) => Self::load(path)?,
            None => Self::new(),
        };

        for custom in config.custom.iter().flatten() {
            table.insert(TypeOverrideEntry {
                owner: custom.owner.clone(),
                table: custom.table.clone(),
                column: custom.column.clone(),
                target_type: custom.target_type.clone(),
            });
        }

        Ok(table)
    }

    /// Add an entry; a later entry for the same column replaces the earlier one
    pub fn insert(&mut self, entry: TypeOverrideEntry) {
        let key = column_key(&entry.owner, &entry.table, &entry.column);
        if let Some(previous) = self.entries.insert(key.clone(), entry.target_type) {
            tracing::debug!(column = %key, previous = %previous, "Type override replaced");
        }
    }

    /// Case-insensitive lookup of a forced type
    pub fn lookup(&self, owner: &str, table: &str, column: &str) -> Option<&str> {
        self.entries
            .get(&column_key(owner, table, column))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<TypeOverrideEntry> for TypeOverrideTable {
    fn from_iter<I: IntoIterator<Item = TypeOverrideEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        for entry in iter {
            table.insert(entry);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomTypeMapping;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const OVERRIDES: &str = "\
owner,table,column,newtype
HR,EMPLOYEES,NOTE,text
hr,employees,photo,byte
HR,EMPLOYEES,NOTE,lvarchar(2000)
";

    #[test]
    fn test_header_is_skipped() {
        let table = TypeOverrideTable::from_reader(OVERRIDES.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.lookup("owner", "table", "column").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let table = TypeOverrideTable::from_reader(OVERRIDES.as_bytes()).unwrap();
        assert_eq!(table.lookup("HR", "EMPLOYEES", "NOTE"), Some("lvarchar(2000)"));
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let table = TypeOverrideTable::from_reader(OVERRIDES.as_bytes()).unwrap();
        assert_eq!(table.lookup("Hr", "Employees", "PHOTO"), Some("byte"));
        assert_eq!(table.lookup("hr", "employees", "note"), Some("lvarchar(2000)"));
        assert_eq!(table.lookup("HR", "EMPLOYEES", "SALARY"), None);
    }

    #[test]
    fn test_wrong_field_count_is_rejected() {
        let data = "owner,table,column,newtype\nHR,EMPLOYEES,NOTE\n";
        let err = TypeOverrideTable::from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::OverrideError(msg) if msg.contains("Record 2")));
    }

    #[test]
    fn test_header_only_file_is_empty() {
        let table = TypeOverrideTable::from_reader("owner,table,column,newtype\n".as_bytes()).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_config_entries_apply_after_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(OVERRIDES.as_bytes()).unwrap();

        let config = TypeMappingConfig {
            override_file: Some(file.path().to_string_lossy().into_owned()),
            custom: Some(vec![CustomTypeMapping {
                owner: "hr".to_string(),
                table: "employees".to_string(),
                column: "note".to_string(),
                target_type: "clob".to_string(),
            }]),
        };

        let table = TypeOverrideTable::from_config(&config).unwrap();
        assert_eq!(table.lookup("HR", "EMPLOYEES", "NOTE"), Some("clob"));
        assert_eq!(table.lookup("HR", "EMPLOYEES", "PHOTO"), Some("byte"));
    }

    #[test]
    fn test_missing_file_is_override_error() {
        let err = TypeOverrideTable::load("/nonexistent/type_conv.csv").unwrap_err();
        assert!(matches!(err, Error::OverrideError(_)));
    }
}
