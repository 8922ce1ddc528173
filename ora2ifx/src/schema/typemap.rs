//! Scalar type rules
//!
//! Maps an Oracle column descriptor to an Informix column type. Resolution is
//! total: combinations no rule covers become a `<TYPE>(?)` placeholder so the
//! surrounding DDL still completes and the spot is visible for manual review.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::schema::overrides::TypeOverrideTable;
use crate::schema::types::ColumnDescriptor;

/// Variable-width character columns longer than this become `lvarchar`
pub const VARCHAR_MAX: u32 = 255;

/// National variable-width columns longer than this become `lvarchar`
pub const NVARCHAR_MAX: u32 = 122;

/// Largest fractional-seconds precision the target datetime accepts
pub const MAX_FRACTION: i32 = 5;

static SECOND_QUALIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)SECOND\s*\(\s*(\d+)\s*\)").expect("valid SECOND(n) pattern"));

/// Outcome of resolving one column type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// Produced by a rule, or the source name passed through unchanged
    Mapped(String),
    /// Forced by the override table
    Overridden(String),
    /// No rule covers the combination; carries the placeholder token
    Unresolved(String),
}

impl TargetType {
    pub fn as_str(&self) -> &str {
        match self {
            TargetType::Mapped(ddl) | TargetType::Overridden(ddl) | TargetType::Unresolved(ddl) => {
                ddl.as_str()
            }
        }
    }

    pub fn into_ddl(self) -> String {
        match self {
            TargetType::Mapped(ddl) | TargetType::Overridden(ddl) | TargetType::Unresolved(ddl) => ddl,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, TargetType::Unresolved(_))
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a column to its target type declaration
pub fn resolve(column: &ColumnDescriptor, overrides: &TypeOverrideTable) -> String {
    resolve_type(column, overrides).into_ddl()
}

/// Resolve a column, consulting the override table before any rule
///
/// Overrides are keyed by the owner and table recorded on the column.
pub fn resolve_type(column: &ColumnDescriptor, overrides: &TypeOverrideTable) -> TargetType {
    resolve_in_table(&column.owner, &column.table, column, overrides)
}

/// Resolve a column of the given table, keying the override lookup on `owner`/`table`
pub fn resolve_in_table(
    owner: &str,
    table: &str,
    column: &ColumnDescriptor,
    overrides: &TypeOverrideTable,
) -> TargetType {
    if let Some(forced) = overrides.lookup(owner, table, &column.name) {
        return TargetType::Overridden(forced.to_string());
    }
    resolve_rule(column)
}

/// Apply the type rules alone, ignoring overrides
pub fn resolve_rule(column: &ColumnDescriptor) -> TargetType {
    let type_name = column.data_type.trim();
    let upper = type_name.to_uppercase();

    if upper.starts_with("TIMESTAMP") {
        return timestamp_type(type_name, column.scale);
    }
    if upper.starts_with("INTERVAL") {
        return interval_type(type_name, column.scale);
    }

    match upper.as_str() {
        "NUMBER" | "NUMERIC" | "DECIMAL" => number_type(type_name, column.precision, column.scale),
        "CHAR" | "NCHAR" | "VARCHAR" | "VARCHAR2" | "NVARCHAR2" => char_type(&upper, column),
        "CLOB" | "NCLOB" | "LONG" | "BLOB" | "RAW" | "LONG RAW" | "BFILE" => lob_type(&upper),
        "FLOAT" | "BINARY_FLOAT" | "BINARY_DOUBLE" => float_type(&upper),
        "DATE" => mapped("datetime year to second"),
        "XMLTYPE" | "SYS.XMLTYPE" => mapped("lvarchar(8192)"),
        "MDSYS.SDO_GEOMETRY" | "SDO_GEOMETRY" => mapped("geometry"),
        _ => {
            tracing::debug!(data_type = type_name, "No type rule, passing source type through");
            mapped(type_name)
        }
    }
}

fn mapped(ddl: &str) -> TargetType {
    TargetType::Mapped(ddl.to_string())
}

fn unresolved(type_name: &str) -> TargetType {
    TargetType::Unresolved(format!("{}(?)", type_name))
}

fn number_type(type_name: &str, precision: Option<u32>, scale: Option<i32>) -> TargetType {
    match (precision, scale) {
        (None, Some(0)) => mapped("integer"),
        (None, None) => mapped("decimal(32)"),
        (precision, Some(scale)) if scale > 0 => {
            TargetType::Mapped(format!("decimal({},{})", precision.unwrap_or(32), scale))
        }
        (None, Some(_)) => unresolved(type_name),
        (Some(precision), scale) => match precision {
            0..=4 => mapped("smallint"),
            5..=9 => mapped("integer"),
            10..=18 => mapped("bigint"),
            // NUMBER(38) is Oracle's INTEGER; legacy output keeps it as integer, not bigint
            38 if scale.unwrap_or(0) == 0 => mapped("integer"),
            _ => unresolved(type_name),
        },
    }
}

fn char_type(upper: &str, column: &ColumnDescriptor) -> TargetType {
    let length = column.length;
    let avg_length = column.avg_length.filter(|avg| *avg > 1);

    match upper {
        "CHAR" | "NCHAR" => TargetType::Mapped(format!("{}({})", upper.to_lowercase(), length)),
        "VARCHAR" | "VARCHAR2" => {
            if length > VARCHAR_MAX {
                TargetType::Mapped(format!("lvarchar({})", length))
            } else if length == 1 {
                mapped("char(1)")
            } else {
                TargetType::Mapped(sized("varchar", length, avg_length))
            }
        }
        "NVARCHAR2" => {
            if length > NVARCHAR_MAX {
                TargetType::Mapped(format!("lvarchar({})", length))
            } else {
                TargetType::Mapped(sized("nvarchar", length, avg_length))
            }
        }
        _ => unresolved(&column.data_type),
    }
}

/// `name(length)` or `name(length,reserve)`
fn sized(name: &str, length: u32, reserve: Option<u32>) -> String {
    match reserve {
        Some(reserve) => format!("{}({},{})", name, length, reserve),
        None => format!("{}({})", name, length),
    }
}

fn lob_type(upper: &str) -> TargetType {
    match upper {
        "CLOB" | "NCLOB" => mapped("clob"),
        "BLOB" | "RAW" | "LONG RAW" | "BFILE" => mapped("blob"),
        "LONG" => mapped("text"),
        _ => unresolved(upper),
    }
}

fn float_type(upper: &str) -> TargetType {
    match upper {
        "FLOAT" | "BINARY_FLOAT" => mapped("float"),
        "BINARY_DOUBLE" => mapped("double"),
        _ => unresolved(upper),
    }
}

/// Fraction digits for a fractional-seconds scale, clamped to the target maximum
fn fraction_digits(scale: Option<i32>) -> Option<i32> {
    match scale {
        Some(scale @ 1..=5) => Some(scale),
        Some(6..=9) => Some(MAX_FRACTION),
        _ => None,
    }
}

fn timestamp_type(type_name: &str, scale: Option<i32>) -> TargetType {
    if scale == Some(0) {
        return mapped("datetime year to second");
    }
    match fraction_digits(scale) {
        Some(digits) => TargetType::Mapped(format!("datetime year to fraction({})", digits)),
        None => unresolved(type_name),
    }
}

fn interval_type(type_name: &str, scale: Option<i32>) -> TargetType {
    let upper = type_name.to_uppercase();

    if upper.starts_with("INTERVAL YEAR") {
        return TargetType::Mapped(type_name.to_lowercase());
    }
    if !upper.starts_with("INTERVAL DAY") {
        return unresolved(type_name);
    }
    if scale == Some(0) {
        return mapped(type_name);
    }

    let (Some(scale), Some(digits)) = (scale, fraction_digits(scale)) else {
        return unresolved(type_name);
    };

    // First qualifier carrying the column's scale; later ones stay as they are
    let target = SECOND_QUALIFIER
        .captures_iter(type_name)
        .find(|caps| caps[1].parse::<i32>().ok() == Some(scale))
        .and_then(|caps| caps.get(0));

    let rewritten = match target {
        Some(span) => format!(
            "{}fraction({}){}",
            &type_name[..span.start()],
            digits,
            &type_name[span.end()..]
        ),
        None => type_name.to_string(),
    };

    TargetType::Mapped(rewritten.to_lowercase())
}
