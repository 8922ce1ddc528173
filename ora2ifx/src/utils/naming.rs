//! Naming utilities for ora2ifx
//!
//! Oracle reports identifiers in upper case; generated DDL uses lower case.

/// Lower-case an identifier and strip surrounding whitespace
pub fn lower_ident(name: &str) -> String {
    name.trim().to_lowercase()
}

/// `owner.name`, both lower-cased
pub fn qualified_name(owner: &str, name: &str) -> String {
    format!("{}.{}", lower_ident(owner), lower_ident(name))
}

/// `"owner".name`, the form used in `create table` headers
pub fn quoted_owner_name(owner: &str, name: &str) -> String {
    format!("\"{}\".{}", lower_ident(owner), lower_ident(name))
}

/// Comma-join a column list, lower-casing each column
pub fn join_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| lower_ident(c))
        .collect::<Vec<_>>()
        .join(",")
}

/// Case-insensitive key for a column: `OWNER:TABLE:COLUMN`
pub fn column_key(owner: &str, table: &str, column: &str) -> String {
    [owner, table, column]
        .iter()
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(":")
        .to_uppercase()
}

/// Name used for an object in logs and reports: `OWNER.OBJECT[.PART]`
pub fn object_path(parts: &[&str]) -> String {
    parts.join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lower_ident() {
        assert_eq!(lower_ident("EMPLOYEES"), "employees");
        assert_eq!(lower_ident("  Emp_Id "), "emp_id");
    }

    #[test]
    fn test_qualified_names() {
        assert_eq!(qualified_name("HR", "EMPLOYEES"), "hr.employees");
        assert_eq!(quoted_owner_name("HR", "EMPLOYEES"), "\"hr\".employees");
    }

    #[test]
    fn test_join_columns() {
        let cols = vec!["EMP_ID".to_string(), "DEPT_ID".to_string()];
        assert_eq!(join_columns(&cols), "emp_id,dept_id");
        assert_eq!(join_columns(&[]), "");
    }

    #[test]
    fn test_column_key_is_case_insensitive() {
        assert_eq!(column_key("hr", "Emp", "note"), "HR:EMP:NOTE");
        assert_eq!(column_key("HR", "EMP", "NOTE"), column_key("hr", "emp", "note"));
    }
}
