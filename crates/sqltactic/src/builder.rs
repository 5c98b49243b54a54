//! Tactic command builder.
//!
//! [`TacticCommandBuilder`] turns mapping metadata plus a prototype model (or
//! a [`Query`]) into a [`TacticCommand`]. It never touches a connection: the
//! unit of work is only consulted for capabilities and handed to the dialect.
//!
//! # Example
//! ```ignore
//! use sqltactic::{DialectKind, MappingRegistry, Record, TacticCommandBuilder};
//!
//! let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
//! let probe = Record::new().with("Id", 7i64);
//! let cmd = builder.select_one::<Record>(&(), &probe)?;
//! // SELECT t0.[Id] AS [Id], ... FROM [dbo].[Widgets] t0 WHERE t0.[Id] = ? ORDER BY t0.[Id] ASC;
//! ```

use std::any::type_name;

use crate::command::{
    CommandBehavior, CommandKind, ExpectedRows, FieldBinding, ProcedureCommand, TacticCommand,
    materializer,
};
use crate::config::{CommandOptions, DEFAULT_TABLE_ALIAS, EngineConfig};
use crate::dialect::{Dialect, UnitOfWork};
use crate::error::{TacticError, TacticResult};
use crate::expr::{Query, SqlExpressionVisitor};
use crate::ident;
use crate::mapping::{ColumnMapping, MappingRegistry, ParameterMapping, TableMapping};
use crate::model::Model;
use crate::param::{TacticParameter, TacticParameters};
use crate::value::Value;

/// Builds commands for mapped types.
///
/// Cheap to construct and `Sync`; every build call allocates its own state,
/// so one builder can serve many threads.
#[derive(Debug, Clone)]
pub struct TacticCommandBuilder<'a> {
    dialect: &'a dyn Dialect,
    registry: &'a MappingRegistry,
    options: CommandOptions,
    table_alias: String,
}

/// Header shared by every command a builder produces.
struct Draft {
    operation: &'static str,
    text: String,
    parameters: TacticParameters,
    kind: CommandKind,
    behavior: CommandBehavior,
    is_nullipotent: bool,
    expected: ExpectedRows,
}

impl<'a> TacticCommandBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, registry: &'a MappingRegistry) -> Self {
        Self {
            dialect,
            registry,
            options: CommandOptions::default(),
            table_alias: DEFAULT_TABLE_ALIAS.to_string(),
        }
    }

    /// Builder configured from an [`EngineConfig`].
    pub fn from_config(config: &EngineConfig, registry: &'a MappingRegistry) -> TacticResult<Self> {
        config.validate()?;
        Self::new(config.dialect()?, registry)
            .with_options(config.command_options())
            .with_table_alias(&config.table_alias)
    }

    /// Stamp timeout and prepare settings onto produced commands.
    pub fn with_options(mut self, options: CommandOptions) -> Self {
        self.options = options;
        self
    }

    /// Alias for the mapped table in SELECT commands.
    pub fn with_table_alias(mut self, alias: &str) -> TacticResult<Self> {
        ident::validate_alias(alias)?;
        self.table_alias = alias.to_string();
        Ok(self)
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn options(&self) -> CommandOptions {
        self.options
    }

    pub fn table_alias(&self) -> &str {
        &self.table_alias
    }

    /// Command that reads back the identity generated by the last insert.
    ///
    /// `None` when `insert_one` already selects the key in the same batch
    /// (batch-scope dialect on a multi-statement unit of work), or when `T`
    /// has no server-generated key. Otherwise run this right after the insert
    /// inside the same transaction.
    pub fn identify<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
    ) -> TacticResult<Option<TacticCommand<T>>> {
        let mapping = self.registry.table::<T>()?;
        if self.dialect.use_batch_scope_identification_semantics()
            && unit_of_work.supports_multiple_statements()
        {
            return Ok(None);
        }
        let Some(identity) = mapping.identity_column() else {
            return Ok(None);
        };

        let text = format!("{};", self.identity_select(identity));
        let fields = vec![field_for(0, identity)];
        Ok(Some(self.finish(
            Draft {
                operation: "identify",
                text,
                parameters: TacticParameters::new(),
                kind: CommandKind::Text,
                behavior: CommandBehavior::SingleRow,
                is_nullipotent: true,
                expected: self.dialect.expected_records_affected(true),
            },
            fields,
        )))
    }

    /// Read the row whose key matches `prototype`.
    pub fn select_one<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        prototype: &T,
    ) -> TacticResult<TacticCommand<T>> {
        let mapping = self.registry.table::<T>()?;
        let keys = mapping.key_columns();
        if keys.is_empty() {
            return Err(TacticError::invalid_mapping::<T>("table has no columns"));
        }

        let alias = self.dialect.table_alias(&self.table_alias);
        let mut parameters = TacticParameters::new();
        let mut predicates = Vec::with_capacity(keys.len());
        let mut order = Vec::with_capacity(keys.len());
        for key in &keys {
            let column = self.dialect.aliased_column_name(&self.table_alias, &key.name);
            let marker = self.bind_column(unit_of_work, &mut parameters, key, prototype)?;
            predicates.push(format!("{column} = {marker}"));
            order.push(format!("{column} ASC"));
        }

        let text = format!(
            "SELECT {} FROM {} {alias} WHERE {} ORDER BY {};",
            self.select_list(mapping),
            self.table_name(mapping),
            predicates.join(" AND "),
            order.join(", ")
        );
        Ok(self.finish(
            Draft {
                operation: "select_one",
                text,
                parameters,
                kind: CommandKind::Text,
                behavior: CommandBehavior::SingleRow,
                is_nullipotent: true,
                expected: self.dialect.expected_records_affected(true),
            },
            row_fields(mapping.columns()),
        ))
    }

    /// Read every row matching `query`.
    ///
    /// WHERE and ORDER BY are emitted only when the query has a filter and a
    /// defined sort.
    pub fn select_all<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        query: &Query,
    ) -> TacticResult<TacticCommand<T>> {
        let mapping = self.registry.table::<T>()?;
        if mapping.columns().is_empty() {
            return Err(TacticError::invalid_mapping::<T>("table has no columns"));
        }

        let mut parameters = TacticParameters::new();
        let mut visitor = SqlExpressionVisitor::new(
            self.dialect,
            unit_of_work,
            mapping,
            &self.table_alias,
            &mut parameters,
        );
        let filter = visitor.visit(&query.filter)?;
        let sort = visitor.visit_sort(&query.sort)?;

        let mut text = format!(
            "SELECT {} FROM {} {}",
            self.select_list(mapping),
            self.table_name(mapping),
            self.dialect.table_alias(&self.table_alias)
        );
        if let Some(filter) = filter {
            text.push_str(" WHERE ");
            text.push_str(&filter);
        }
        if let Some(sort) = sort {
            text.push_str(" ORDER BY ");
            text.push_str(&sort);
        }
        text.push(';');

        Ok(self.finish(
            Draft {
                operation: "select_all",
                text,
                parameters,
                kind: CommandKind::Text,
                behavior: CommandBehavior::Default,
                is_nullipotent: true,
                expected: self.dialect.expected_records_affected(true),
            },
            row_fields(mapping.columns()),
        ))
    }

    /// Insert `model`.
    ///
    /// Server-generated key columns are left out. When the dialect reads
    /// identities in the same batch and the unit of work runs multi-statement
    /// batches, the generated key is selected back and materializes into the
    /// model's key property.
    pub fn insert_one<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        model: &T,
    ) -> TacticResult<TacticCommand<T>> {
        let mapping = self.registry.table::<T>()?;
        let mut parameters = TacticParameters::new();
        let mut columns = Vec::new();
        let mut markers = Vec::new();
        for column in mapping
            .columns()
            .iter()
            .filter(|c| !c.is_server_generated_primary_key)
        {
            columns.push(self.dialect.column_name(&column.name));
            markers.push(self.bind_column(unit_of_work, &mut parameters, column, model)?);
        }

        let mut text = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", self.table_name(mapping))
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({});",
                self.table_name(mapping),
                columns.join(", "),
                markers.join(", ")
            )
        };

        let mut fields = Vec::new();
        if self.dialect.use_batch_scope_identification_semantics()
            && unit_of_work.supports_multiple_statements()
            && let Some(identity) = mapping.identity_column()
        {
            text.push(' ');
            text.push_str(&self.identity_select(identity));
            text.push(';');
            fields.push(field_for(0, identity));
        }

        Ok(self.finish(
            Draft {
                operation: "insert_one",
                text,
                parameters,
                kind: CommandKind::Text,
                behavior: CommandBehavior::Default,
                is_nullipotent: false,
                expected: self.dialect.expected_records_affected(false),
            },
            fields,
        ))
    }

    /// Update the row identified by `model`'s key.
    pub fn update_one<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        model: &T,
    ) -> TacticResult<TacticCommand<T>> {
        let mapping = self.registry.table::<T>()?;
        let keys = mapping.key_columns();
        let updatable: Vec<&ColumnMapping> = mapping
            .columns()
            .iter()
            .filter(|c| !c.is_server_generated_primary_key)
            .filter(|c| !keys.iter().any(|k| k.name == c.name))
            .collect();
        if updatable.is_empty() {
            return Err(TacticError::unsupported(
                "update_one",
                format!("{} has no updatable columns", type_name::<T>()),
            ));
        }

        let mut parameters = TacticParameters::new();
        let mut assignments = Vec::with_capacity(updatable.len());
        for column in updatable {
            let marker = self.bind_column(unit_of_work, &mut parameters, column, model)?;
            assignments.push(format!("{} = {marker}", self.dialect.column_name(&column.name)));
        }
        let predicate = self.key_predicate(unit_of_work, &mut parameters, &keys, model)?;

        let text = format!(
            "UPDATE {} SET {} WHERE {predicate};",
            self.table_name(mapping),
            assignments.join(", ")
        );
        Ok(self.finish(
            Draft {
                operation: "update_one",
                text,
                parameters,
                kind: CommandKind::Text,
                behavior: CommandBehavior::Default,
                is_nullipotent: false,
                expected: self.dialect.expected_records_affected(false),
            },
            Vec::new(),
        ))
    }

    /// Delete the row identified by `model`'s key.
    pub fn delete_one<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        model: &T,
    ) -> TacticResult<TacticCommand<T>> {
        let mapping = self.registry.table::<T>()?;
        let keys = mapping.key_columns();
        if keys.is_empty() {
            return Err(TacticError::invalid_mapping::<T>("table has no columns"));
        }

        let mut parameters = TacticParameters::new();
        let predicate = self.key_predicate(unit_of_work, &mut parameters, &keys, model)?;
        let text = format!("DELETE FROM {} WHERE {predicate};", self.table_name(mapping));
        Ok(self.finish(
            Draft {
                operation: "delete_one",
                text,
                parameters,
                kind: CommandKind::Text,
                behavior: CommandBehavior::Default,
                is_nullipotent: false,
                expected: self.dialect.expected_records_affected(false),
            },
            Vec::new(),
        ))
    }

    /// Set-based insert. Not available.
    pub fn insert_all<T: Model>(
        &self,
        _unit_of_work: &dyn UnitOfWork,
        _query: &Query,
    ) -> TacticResult<TacticCommand<T>> {
        Err(TacticError::unsupported(
            "insert_all",
            "set-based inserts are not implemented",
        ))
    }

    /// Set-based update. Not available.
    pub fn update_all<T: Model>(
        &self,
        _unit_of_work: &dyn UnitOfWork,
        _query: &Query,
    ) -> TacticResult<TacticCommand<T>> {
        Err(TacticError::unsupported(
            "update_all",
            "set-based updates are not implemented",
        ))
    }

    /// Set-based delete. Not available.
    pub fn delete_all<T: Model>(
        &self,
        _unit_of_work: &dyn UnitOfWork,
        _query: &Query,
    ) -> TacticResult<TacticCommand<T>> {
        Err(TacticError::unsupported(
            "delete_all",
            "set-based deletes are not implemented",
        ))
    }

    /// Call the stored procedure mapped for `P`.
    ///
    /// Input parameters (`In`, `InOut`) are bound from `prototype` in ordinal
    /// order, followed by output parameters (`Out`, `InOut`, `Return`). A name
    /// bound twice keeps its first binding. Result rows materialize into `R`;
    /// output values into `O`.
    pub fn execute<P: Model, R: Model, O: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        prototype: &P,
    ) -> TacticResult<ProcedureCommand<R, O>> {
        let mapping = self.registry.procedure::<P>()?;
        if !self.dialect.supports_procedures() {
            return Err(TacticError::unsupported(
                "execute",
                format!("{} has no stored procedures", self.dialect.kind()),
            ));
        }

        let declared: Vec<&ParameterMapping> = mapping
            .input_parameters()
            .iter()
            .chain(mapping.output_parameters())
            .collect();
        let mut inputs: Vec<&ParameterMapping> =
            declared.iter().copied().filter(|p| p.direction.is_input()).collect();
        let mut outputs: Vec<&ParameterMapping> =
            declared.iter().copied().filter(|p| p.direction.is_output()).collect();
        inputs.sort_by_key(|p| p.ordinal);
        outputs.sort_by_key(|p| p.ordinal);

        let mut parameters = TacticParameters::new();
        for (param, is_input) in inputs
            .iter()
            .map(|p| (*p, true))
            .chain(outputs.iter().map(|p| (*p, false)))
        {
            let value = if is_input {
                prototype
                    .get_property(&param.property)
                    .map_err(|source| TacticError::binding::<P>(&param.property, source))?
            } else {
                Value::Null
            };
            let mut bound = TacticParameter::for_procedure(param, value);
            self.dialect
                .fixup_parameter(unit_of_work, &mut bound, param.db_type.as_deref());
            if !parameters.push_first(bound) {
                tracing::debug!(
                    target: "sqltactic.command",
                    procedure = %mapping.name,
                    parameter = %param.name,
                    "duplicate procedure parameter; keeping first binding"
                );
            }
        }

        let output_fields = outputs
            .iter()
            .enumerate()
            .map(|(index, p)| FieldBinding {
                index,
                key: p.name.clone(),
                property: p.property.clone(),
                anonymous: false,
            })
            .collect();

        let text = self
            .dialect
            .procedure_name(mapping.schema.as_deref(), &mapping.name);
        let command = self.finish(
            Draft {
                operation: "execute",
                text,
                parameters,
                kind: CommandKind::StoredProcedure,
                behavior: CommandBehavior::Default,
                is_nullipotent: mapping.is_nullipotent,
                expected: ExpectedRows::Unchecked,
            },
            row_fields(mapping.result_columns()),
        );
        Ok(ProcedureCommand {
            command,
            output_materializer: materializer::<O>(output_fields),
        })
    }

    fn table_name(&self, mapping: &TableMapping) -> String {
        self.dialect
            .table_name(mapping.schema.as_deref(), &mapping.table)
    }

    /// `t0.[A] AS [A], t0.[B] AS [B]`
    fn select_list(&self, mapping: &TableMapping) -> String {
        mapping
            .columns()
            .iter()
            .map(|c| {
                format!(
                    "{} AS {}",
                    self.dialect.aliased_column_name(&self.table_alias, &c.name),
                    self.dialect.column_name(&c.name)
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `SELECT <identity> AS [Key]` without the terminator.
    fn identity_select(&self, identity: &ColumnMapping) -> String {
        format!(
            "SELECT {} AS {}",
            self.dialect.identity_function_name(),
            self.dialect.column_name(&identity.name)
        )
    }

    /// `[K1] = ? AND [K2] = ?`, binding each key from `model`.
    fn key_predicate<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        parameters: &mut TacticParameters,
        keys: &[&ColumnMapping],
        model: &T,
    ) -> TacticResult<String> {
        let mut predicates = Vec::with_capacity(keys.len());
        for key in keys {
            let marker = self.bind_column(unit_of_work, parameters, key, model)?;
            predicates.push(format!("{} = {marker}", self.dialect.column_name(&key.name)));
        }
        Ok(predicates.join(" AND "))
    }

    /// Bind `column`'s property from `model` under a fresh key and return the
    /// marker for the command text.
    fn bind_column<T: Model>(
        &self,
        unit_of_work: &dyn UnitOfWork,
        parameters: &mut TacticParameters,
        column: &ColumnMapping,
        model: &T,
    ) -> TacticResult<String> {
        let value = model
            .get_property(&column.property)
            .map_err(|source| TacticError::binding::<T>(&column.property, source))?;
        let name = parameters.next_name();
        let mut parameter = TacticParameter::for_column(&name, column, value);
        self.dialect
            .fixup_parameter(unit_of_work, &mut parameter, column.db_type.as_deref());
        let marker = self.dialect.parameter_name(&name);
        parameters.push(parameter)?;
        Ok(marker)
    }

    fn finish<T: Model>(&self, draft: Draft, fields: Vec<FieldBinding>) -> TacticCommand<T> {
        tracing::debug!(
            target: "sqltactic.command",
            operation = draft.operation,
            model = type_name::<T>(),
            dialect = %self.dialect.kind(),
            param_count = draft.parameters.len(),
            sql = %draft.text,
            "built command"
        );
        TacticCommand {
            text: draft.text,
            parameters: draft.parameters,
            kind: draft.kind,
            behavior: draft.behavior,
            options: self.options,
            expected_affected_rows: draft.expected,
            is_nullipotent: draft.is_nullipotent,
            materializer: materializer::<T>(fields),
        }
    }
}

fn field_for(index: usize, column: &ColumnMapping) -> FieldBinding {
    FieldBinding {
        index,
        key: column.name.clone(),
        property: column.property.clone(),
        anonymous: column.is_anonymous,
    }
}

fn row_fields(columns: &[ColumnMapping]) -> Vec<FieldBinding> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| field_for(index, column))
        .collect()
}
