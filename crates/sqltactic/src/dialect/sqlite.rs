use std::fs::OpenOptions;
use std::path::Path;

use super::{Dialect, DialectKind};
use crate::error::TacticResult;
use crate::ident::{QuoteStyle, quote, write_quoted};

/// SQLite.
///
/// Identity values are read with a separate `last_insert_rowid()` round trip
/// on the same connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite
    }

    fn table_name(&self, schema: Option<&str>, table: &str) -> String {
        let mut out = String::new();
        if let Some(schema) = schema {
            write_quoted(&mut out, schema, QuoteStyle::DoubleQuote);
            out.push('.');
        }
        write_quoted(&mut out, table, QuoteStyle::DoubleQuote);
        out
    }

    fn column_name(&self, name: &str) -> String {
        quote(name, QuoteStyle::DoubleQuote)
    }

    fn parameter_name(&self, name: &str) -> String {
        if name.starts_with('@') {
            name.to_string()
        } else {
            format!("@{name}")
        }
    }

    fn procedure_name(&self, schema: Option<&str>, name: &str) -> String {
        self.table_name(schema, name)
    }

    fn identity_function_name(&self) -> &'static str {
        "last_insert_rowid()"
    }

    fn can_create_native_database_file(&self) -> bool {
        true
    }

    /// SQLite treats a zero-length file as an empty database. An existing
    /// file is never overwritten.
    fn create_native_database_file(&self, path: &Path) -> TacticResult<()> {
        OpenOptions::new().write(true).create_new(true).open(path)?;
        tracing::debug!(
            target: "sqltactic.dialect",
            path = %path.display(),
            "created native database file"
        );
        Ok(())
    }

    fn use_batch_scope_identification_semantics(&self) -> bool {
        false
    }

    fn supports_procedures(&self) -> bool {
        false
    }
}
