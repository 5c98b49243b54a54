use super::odbc::qualified;
use super::{Dialect, DialectKind, UnitOfWork, apply_type_fixup};
use crate::ident::{QuoteStyle, quote};
use crate::param::TacticParameter;

/// SQL Server through its native client: named `@name` markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

const SQL_DB_TYPE_FIXUPS: &[(&str, &str)] = &[
    ("NTEXT", "NText"),
    ("TEXT", "Text"),
    ("IMAGE", "Image"),
    ("XML", "Xml"),
    ("TIMESTAMP", "Timestamp"),
];

/// Fixup key under which the native `SqlDbType` is recorded.
pub const SQL_DB_TYPE: &str = "SqlDbType";

impl Dialect for SqlServerDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::SqlServer
    }

    fn table_name(&self, schema: Option<&str>, table: &str) -> String {
        qualified(schema, table)
    }

    fn column_name(&self, name: &str) -> String {
        quote(name, QuoteStyle::Bracket)
    }

    fn parameter_name(&self, name: &str) -> String {
        if name.starts_with('@') {
            name.to_string()
        } else {
            format!("@{name}")
        }
    }

    fn procedure_name(&self, schema: Option<&str>, name: &str) -> String {
        qualified(schema, name)
    }

    fn identity_function_name(&self) -> &'static str {
        "SCOPE_IDENTITY()"
    }

    fn fixup_parameter(
        &self,
        _unit_of_work: &dyn UnitOfWork,
        parameter: &mut TacticParameter,
        original_column_type: Option<&str>,
    ) {
        apply_type_fixup(parameter, original_column_type, SQL_DB_TYPE, SQL_DB_TYPE_FIXUPS);
    }

    fn use_batch_scope_identification_semantics(&self) -> bool {
        true
    }
}
