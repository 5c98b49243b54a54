//! # sqltactic
//!
//! Dialect-abstracted SQL command synthesis.
//!
//! Given declarative mapping metadata and either a prototype model or a
//! structured filter, `sqltactic` produces a [`TacticCommand`]: command text,
//! bound parameters, the expected affected-row contract, and a callback that
//! copies result rows back into model instances. Executing the command is left
//! to the caller.
//!
//! ## Features
//!
//! - **Dialect strategies**: ODBC, native SQL Server and SQLite formatting behind one [`Dialect`] trait
//! - **Parameters only**: every literal is bound, symbols must resolve to mapped columns
//! - **Filter trees**: [`Expression`] with unary, binary and ternary nodes, plus [`Query`] sort specs
//! - **Stored procedures**: input/output parameter binding with separate result and output materializers
//! - **Config**: TOML-driven [`EngineConfig`]
//!
//! ## Example
//!
//! ```ignore
//! use sqltactic::{
//!     ColumnMapping, DialectKind, Expression, MappingRegistry, Query, TableMapping,
//!     TacticCommandBuilder,
//! };
//!
//! let registry = MappingRegistry::new().with_table::<Widget>(
//!     TableMapping::new("dbo", "Widgets")
//!         .column(ColumnMapping::new("Id", "Id").ordinal(0).identity())
//!         .column(ColumnMapping::new("Name", "Name").ordinal(1))
//!         .column(ColumnMapping::new("Price", "Price").ordinal(2)),
//! )?;
//!
//! let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
//!
//! let insert = builder.insert_one(&(), &widget)?;
//! // INSERT INTO [dbo].[Widgets] ([Name], [Price]) VALUES (?, ?); SELECT SCOPE_IDENTITY() AS [Id];
//!
//! let cheap = builder.select_all::<Widget>(
//!     &(),
//!     &Query::new()
//!         .filter(Expression::symbol("Price").lt(10i32))
//!         .asc("Name"),
//! )?;
//! ```
//!
//! ## Logging
//!
//! Events are emitted through `tracing` under the `sqltactic.*` targets
//! (`sqltactic.command` for every built command). No subscriber is installed.

pub mod builder;
pub mod command;
pub mod config;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod ident;
pub mod mapping;
pub mod model;
pub mod param;
pub mod value;

pub use builder::TacticCommandBuilder;
pub use command::{
    CommandBehavior, CommandKind, ExpectedRows, Materializer, ProcedureCommand, Row,
    TacticCommand,
};
pub use config::{CommandOptions, EngineConfig};
pub use dialect::{Dialect, DialectKind, ExecutorCapabilities, UnitOfWork, dialect_for};
pub use error::{PropertyError, TacticError, TacticResult};
pub use expr::{Expression, Query, SortDirection, SortOrder, SqlExpressionVisitor};
pub use mapping::{
    ColumnMapping, Mapping, MappingRegistry, ParameterDirection, ParameterMapping,
    ProcedureMapping, TableMapping,
};
pub use model::{Model, Record};
pub use param::{TacticParameter, TacticParameters};
pub use value::Value;
