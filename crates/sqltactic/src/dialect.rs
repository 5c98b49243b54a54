//! SQL dialect strategies.
//!
//! A [`Dialect`] owns every syntax difference between backends: identifier
//! quoting, parameter markers, identity retrieval, and parameter type fixups.
//! Builders never format SQL identifiers themselves.
//!
//! Dialects are stateless `'static` values. Select one by tag:
//!
//! ```ignore
//! use sqltactic::DialectKind;
//!
//! let dialect = "odbc".parse::<DialectKind>()?.dialect();
//! assert_eq!(dialect.column_name("Id"), "[Id]");
//! assert_eq!(dialect.parameter_name("p0"), "?");
//! # Ok::<(), sqltactic::TacticError>(())
//! ```

mod odbc;
mod sql_server;
mod sqlite;

pub use odbc::{ODBC_TYPE, OdbcDialect};
pub use sql_server::{SQL_DB_TYPE, SqlServerDialect};
pub use sqlite::SqliteDialect;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::command::ExpectedRows;
use crate::error::{TacticError, TacticResult};
use crate::param::TacticParameter;

/// Opaque execution context supplied by the caller.
///
/// The engine never performs I/O through it; it only asks about executor
/// capabilities and hands it to [`Dialect::fixup_parameter`].
pub trait UnitOfWork {
    /// Whether the executor can run several statements in one round trip and
    /// read the result of the last one.
    fn supports_multiple_statements(&self) -> bool {
        true
    }
}

/// The default context: multi-statement batches are supported.
impl UnitOfWork for () {}

/// A unit of work described only by its capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorCapabilities {
    pub multiple_statements: bool,
}

impl ExecutorCapabilities {
    /// Executor that runs one statement per round trip.
    pub const fn single_statement() -> Self {
        Self {
            multiple_statements: false,
        }
    }
}

impl Default for ExecutorCapabilities {
    fn default() -> Self {
        Self {
            multiple_statements: true,
        }
    }
}

impl UnitOfWork for ExecutorCapabilities {
    fn supports_multiple_statements(&self) -> bool {
        self.multiple_statements
    }
}

/// Backend-specific SQL formatting and capabilities.
///
/// Formatters are pure: the same input always yields the same output.
pub trait Dialect: fmt::Debug + Send + Sync {
    fn kind(&self) -> DialectKind;

    /// Qualified, quoted table name.
    fn table_name(&self, schema: Option<&str>, table: &str) -> String;

    /// Quoted column name.
    fn column_name(&self, name: &str) -> String;

    /// Column name qualified by a table alias.
    fn aliased_column_name(&self, alias: &str, name: &str) -> String {
        format!("{}.{}", self.table_alias(alias), self.column_name(name))
    }

    /// Table alias as it appears in FROM and column references.
    fn table_alias(&self, alias: &str) -> String {
        alias.to_string()
    }

    /// Marker that stands for the parameter `name` in command text.
    fn parameter_name(&self, name: &str) -> String;

    /// Qualified, quoted procedure name.
    fn procedure_name(&self, schema: Option<&str>, name: &str) -> String;

    /// Expression that yields the last generated identity value.
    fn identity_function_name(&self) -> &'static str;

    /// Row-count contract for an operation.
    fn expected_records_affected(&self, is_nullipotent: bool) -> ExpectedRows {
        if is_nullipotent {
            ExpectedRows::Unchecked
        } else {
            ExpectedRows::Exactly(1)
        }
    }

    /// Adjust a parameter for this backend. Only `parameter.fixups` may change.
    fn fixup_parameter(
        &self,
        _unit_of_work: &dyn UnitOfWork,
        _parameter: &mut TacticParameter,
        _original_column_type: Option<&str>,
    ) {
    }

    /// Whether the backend stores a database in a single local file.
    fn can_create_native_database_file(&self) -> bool {
        false
    }

    /// Create an empty database file at `path`.
    fn create_native_database_file(&self, _path: &Path) -> TacticResult<()> {
        Err(TacticError::unsupported(
            "create_native_database_file",
            format!("{} is not a file-based backend", self.kind()),
        ))
    }

    /// `true`: a generated key is read by appending a statement to the insert.
    /// `false`: it needs a separate identify command.
    fn use_batch_scope_identification_semantics(&self) -> bool;

    /// Whether stored procedures can be executed.
    fn supports_procedures(&self) -> bool {
        true
    }
}

/// The closed set of supported dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectKind {
    /// SQL Server through ODBC: positional `?` markers.
    Odbc,
    /// SQL Server native client: named `@p` markers.
    #[serde(alias = "mssql")]
    SqlServer,
    /// SQLite: file-based, identity via a separate round trip.
    Sqlite,
}

static ODBC: OdbcDialect = OdbcDialect;
static SQL_SERVER: SqlServerDialect = SqlServerDialect;
static SQLITE: SqliteDialect = SqliteDialect;

impl DialectKind {
    pub const ALL: [DialectKind; 3] = [Self::Odbc, Self::SqlServer, Self::Sqlite];

    /// The shared strategy for this dialect.
    pub fn dialect(self) -> &'static dyn Dialect {
        match self {
            Self::Odbc => &ODBC,
            Self::SqlServer => &SQL_SERVER,
            Self::Sqlite => &SQLITE,
        }
    }

    pub const fn tag(self) -> &'static str {
        match self {
            Self::Odbc => "odbc",
            Self::SqlServer => "sqlserver",
            Self::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for DialectKind {
    type Err = TacticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        if tag.is_empty() {
            return Err(TacticError::missing("dialect tag"));
        }
        match tag.to_ascii_lowercase().as_str() {
            "odbc" => Ok(Self::Odbc),
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(TacticError::UnknownDialect(s.to_string())),
        }
    }
}

/// Look up a dialect by tag.
pub fn dialect_for(tag: &str) -> TacticResult<&'static dyn Dialect> {
    Ok(tag.parse::<DialectKind>()?.dialect())
}

/// Apply a `(source type, backend type)` table: records `key = backend type`
/// when `original` matches a source type, ignoring ASCII case.
pub(crate) fn apply_type_fixup(
    parameter: &mut TacticParameter,
    original: Option<&str>,
    key: &str,
    table: &[(&str, &str)],
) {
    let Some(original) = original else {
        return;
    };
    if let Some((_, backend)) = table
        .iter()
        .find(|(source, _)| source.eq_ignore_ascii_case(original.trim()))
    {
        parameter.set_fixup(key, *backend);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tags() {
        assert_eq!("odbc".parse::<DialectKind>().unwrap(), DialectKind::Odbc);
        assert_eq!("MSSQL".parse::<DialectKind>().unwrap(), DialectKind::SqlServer);
        assert_eq!(" sqlite ".parse::<DialectKind>().unwrap(), DialectKind::Sqlite);
    }

    #[test]
    fn unknown_and_empty_tags() {
        assert!(matches!(
            "oracle".parse::<DialectKind>(),
            Err(TacticError::UnknownDialect(t)) if t == "oracle"
        ));
        assert!(matches!(
            "".parse::<DialectKind>(),
            Err(TacticError::MissingArgument { .. })
        ));
    }

    #[test]
    fn deserializes_from_tags() {
        #[derive(Deserialize)]
        struct Doc {
            kinds: Vec<DialectKind>,
        }
        let doc: Doc = toml::from_str(r#"kinds = ["odbc", "mssql", "sqlserver", "sqlite"]"#).unwrap();
        assert_eq!(
            doc.kinds,
            [
                DialectKind::Odbc,
                DialectKind::SqlServer,
                DialectKind::SqlServer,
                DialectKind::Sqlite
            ]
        );
    }

    #[test]
    fn factory_returns_matching_kind() {
        for kind in DialectKind::ALL {
            assert_eq!(kind.dialect().kind(), kind);
            assert_eq!(dialect_for(kind.tag()).unwrap().kind(), kind);
        }
    }

    #[test]
    fn expected_rows_contract() {
        for kind in DialectKind::ALL {
            let d = kind.dialect();
            assert_eq!(d.expected_records_affected(true), ExpectedRows::Unchecked);
            assert_eq!(d.expected_records_affected(false), ExpectedRows::Exactly(1));
        }
    }

    #[test]
    fn unit_of_work_capabilities() {
        assert!(().supports_multiple_statements());
        assert!(ExecutorCapabilities::default().supports_multiple_statements());
        assert!(!ExecutorCapabilities::single_statement().supports_multiple_statements());
    }

    #[test]
    fn type_fixup_table_is_case_insensitive() {
        let mut p = TacticParameter::new("p0", "x");
        apply_type_fixup(&mut p, Some("ntext"), "Kind", &[("NTEXT", "NText")]);
        assert_eq!(p.fixup("Kind"), Some("NText"));

        let mut q = TacticParameter::new("p1", "x");
        apply_type_fixup(&mut q, Some("NVARCHAR"), "Kind", &[("NTEXT", "NText")]);
        apply_type_fixup(&mut q, None, "Kind", &[("NTEXT", "NText")]);
        assert!(q.fixups.is_empty());
    }
}
