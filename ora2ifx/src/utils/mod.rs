//! Utilities for ora2ifx
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod naming;

// Re-export key utility functions
pub use naming::{column_key, join_columns, lower_ident, qualified_name, quoted_owner_name};
