//! Schema description and its deterministic text rendering.
//!
//! The rendered text is what the model sees, so the same database always
//! renders byte-for-byte identically: tables sorted by name, columns in
//! ordinal order, foreign keys sorted.

use crate::database::DatabaseProvider;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write;

mod introspect;

pub use introspect::{introspect, EXCLUDED_TABLES};

/// Rendered when the database has no user tables
pub const EMPTY_SCHEMA_TEXT: &str = "The database contains no tables.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyRole {
    #[default]
    None,
    Primary,
    Unique,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescription {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub key: KeyRole,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ForeignKeyDescription {
    pub column: String,
    pub target_table: String,
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescription {
    pub name: String,
    pub columns: Vec<ColumnDescription>,
    pub foreign_keys: BTreeSet<ForeignKeyDescription>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaDescription {
    pub tables: Vec<TableDescription>,
}

impl SchemaDescription {
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Render as prompt text using the dialect's identifier quoting
    pub fn render(&self, provider: DatabaseProvider) -> String {
        if self.tables.is_empty() {
            return EMPTY_SCHEMA_TEXT.to_string();
        }

        let quote = |name: &str| provider.quote_identifier(name);
        let mut out = format!("Dialect: {}\n", provider.display_name());

        for table in &self.tables {
            // Writing to a String cannot fail
            let _ = writeln!(out, "\nTable {}:", quote(&table.name));
            for column in &table.columns {
                let _ = write!(out, "  {} {}", quote(&column.name), column.data_type);
                if !column.nullable {
                    out.push_str(" NOT NULL");
                }
                match column.key {
                    KeyRole::Primary => out.push_str(" PRIMARY KEY"),
                    KeyRole::Unique => out.push_str(" UNIQUE"),
                    KeyRole::None => {}
                }
                out.push('\n');
            }

            if !table.foreign_keys.is_empty() {
                out.push_str("  Foreign keys:\n");
                for fk in &table.foreign_keys {
                    let _ = writeln!(
                        out,
                        "    {} -> {}.{}",
                        quote(&fk.column),
                        quote(&fk.target_table),
                        quote(&fk.target_column)
                    );
                }
            }
        }

        out.trim_end().to_string()
    }
}
