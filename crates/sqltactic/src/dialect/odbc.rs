use super::{Dialect, DialectKind, UnitOfWork, apply_type_fixup};
use crate::ident::{QuoteStyle, quote, write_quoted};
use crate::param::TacticParameter;

/// SQL Server reached through ODBC.
///
/// ODBC binds parameters by position, so every marker is `?` and parameter
/// order in the command must match marker order in the text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OdbcDialect;

/// Source column types that need an explicit ODBC parameter type.
const ODBC_TYPE_FIXUPS: &[(&str, &str)] = &[
    ("NTEXT", "NText"),
    ("TEXT", "Text"),
    ("IMAGE", "Image"),
];

/// Fixup key under which the ODBC parameter type is recorded.
pub const ODBC_TYPE: &str = "OdbcType";

impl Dialect for OdbcDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Odbc
    }

    fn table_name(&self, schema: Option<&str>, table: &str) -> String {
        qualified(schema, table)
    }

    fn column_name(&self, name: &str) -> String {
        quote(name, QuoteStyle::Bracket)
    }

    fn parameter_name(&self, _name: &str) -> String {
        "?".to_string()
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
        apply_type_fixup(parameter, original_column_type, ODBC_TYPE, ODBC_TYPE_FIXUPS);
    }

    fn use_batch_scope_identification_semantics(&self) -> bool {
        true
    }
}

/// `[schema].[name]`, or `[name]` without a schema.
pub(super) fn qualified(schema: Option<&str>, name: &str) -> String {
    let mut out = String::new();
    if let Some(schema) = schema {
        write_quoted(&mut out, schema, QuoteStyle::Bracket);
        out.push('.');
    }
    write_quoted(&mut out, name, QuoteStyle::Bracket);
    out
}
