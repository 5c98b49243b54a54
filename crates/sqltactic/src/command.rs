//! Tactic commands: fully-formed descriptions of one database round trip.
//!
//! A command is built fresh per call, handed to an external executor, and
//! discarded. The executor runs [`TacticCommand::text`] with
//! [`TacticCommand::parameters`], checks the affected-row contract, and feeds
//! each result row back through [`TacticCommand::materialize`].

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CommandOptions;
use crate::error::{TacticError, TacticResult};
use crate::model::Model;
use crate::param::TacticParameters;
use crate::value::Value;

/// Row-count contract of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedRows {
    /// Reads and procedures: the count is not checked.
    Unchecked,
    /// A write must affect exactly this many rows.
    Exactly(u64),
}

impl ExpectedRows {
    /// Legacy encoding: `-1` for unchecked, otherwise the count.
    pub fn as_i64(self) -> i64 {
        match self {
            Self::Unchecked => -1,
            Self::Exactly(n) => i64::try_from(n).unwrap_or(i64::MAX),
        }
    }

    /// Whether `affected` satisfies the contract.
    pub fn is_satisfied_by(self, affected: u64) -> bool {
        match self {
            Self::Unchecked => true,
            Self::Exactly(n) => n == affected,
        }
    }
}

/// How the executor should interpret the command text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Text,
    StoredProcedure,
}

/// Hint about the expected result shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandBehavior {
    #[default]
    Default,
    SingleResult,
    SingleRow,
}

/// One result row, or the set of output parameter values after execution.
///
/// Cells are ordered; each can be read by position or by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell (consuming builder form).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.cells.push((name.into(), value.into()));
    }

    /// Cell at a position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).map(|(_, v)| v)
    }

    /// First cell with this name.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.cells.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

/// Copies one row into a model instance.
pub type Materializer<T> = Arc<dyn Fn(&mut T, &Row) -> TacticResult<()> + Send + Sync>;

/// Where one property is read from in a row.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FieldBinding {
    /// Position among the mapped columns; used for anonymous columns.
    pub index: usize,
    /// Name in the row; used for named columns.
    pub key: String,
    pub property: String,
    pub anonymous: bool,
}

/// Build a materializer over `fields`.
///
/// A field whose cell is missing from the row is skipped and the property is
/// left as it was. Accessor failures abort with
/// [`TacticError::PropertyBinding`].
pub(crate) fn materializer<T: Model>(fields: Vec<FieldBinding>) -> Materializer<T> {
    let fields: Arc<[FieldBinding]> = fields.into();
    Arc::new(move |target: &mut T, row: &Row| {
        for field in fields.iter() {
            let cell = if field.anonymous {
                row.get(field.index)
            } else {
                row.get_by_name(&field.key)
            };
            let Some(value) = cell else {
                tracing::trace!(
                    target: "sqltactic.materialize",
                    model = std::any::type_name::<T>(),
                    property = %field.property,
                    key = %field.key,
                    "result key missing; property left unset"
                );
                continue;
            };
            target
                .set_property(&field.property, value.clone())
                .map_err(|source| TacticError::binding::<T>(&field.property, source))?;
        }
        Ok(())
    })
}

/// A command against a mapped table (or a procedure's row-shaped result).
pub struct TacticCommand<T> {
    pub(crate) text: String,
    pub(crate) parameters: TacticParameters,
    pub(crate) kind: CommandKind,
    pub(crate) behavior: CommandBehavior,
    pub(crate) options: CommandOptions,
    pub(crate) expected_affected_rows: ExpectedRows,
    pub(crate) is_nullipotent: bool,
    pub(crate) materializer: Materializer<T>,
}

impl<T> TacticCommand<T> {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parameters(&self) -> &TacticParameters {
        &self.parameters
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn behavior(&self) -> CommandBehavior {
        self.behavior
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.options.timeout
    }

    pub fn prepare(&self) -> bool {
        self.options.prepare
    }

    pub fn expected_affected_rows(&self) -> ExpectedRows {
        self.expected_affected_rows
    }

    /// The command only reads.
    pub fn is_nullipotent(&self) -> bool {
        self.is_nullipotent
    }

    /// Copy one result row into `target`.
    pub fn materialize(&self, target: &mut T, row: &Row) -> TacticResult<()> {
        (self.materializer)(target, row)
    }

    /// Materialize one result row into a fresh model.
    pub fn materialize_new(&self, row: &Row) -> TacticResult<T>
    where
        T: Default,
    {
        let mut target = T::default();
        self.materialize(&mut target, row)?;
        Ok(target)
    }
}

impl<T> fmt::Debug for TacticCommand<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TacticCommand")
            .field("text", &self.text)
            .field("parameters", &self.parameters)
            .field("kind", &self.kind)
            .field("behavior", &self.behavior)
            .field("options", &self.options)
            .field("expected_affected_rows", &self.expected_affected_rows)
            .field("is_nullipotent", &self.is_nullipotent)
            .finish_non_exhaustive()
    }
}

/// A stored procedure call.
///
/// Result rows materialize into `R`; output and return parameters materialize
/// into `O` once execution completes.
pub struct ProcedureCommand<R, O> {
    pub(crate) command: TacticCommand<R>,
    pub(crate) output_materializer: Materializer<O>,
}

impl<R, O> ProcedureCommand<R, O> {
    /// The call itself: text, parameters and the result-row materializer.
    pub fn command(&self) -> &TacticCommand<R> {
        &self.command
    }

    pub fn text(&self) -> &str {
        self.command.text()
    }

    pub fn parameters(&self) -> &TacticParameters {
        self.command.parameters()
    }

    /// Copy one row of the result set into `target`.
    pub fn materialize(&self, target: &mut R, row: &Row) -> TacticResult<()> {
        self.command.materialize(target, row)
    }

    /// Copy output and return parameter values into `target`.
    pub fn materialize_output(&self, target: &mut O, outputs: &Row) -> TacticResult<()> {
        (self.output_materializer)(target, outputs)
    }

    /// Materialize output values into a fresh model.
    pub fn materialize_output_new(&self, outputs: &Row) -> TacticResult<O>
    where
        O: Default,
    {
        let mut target = O::default();
        self.materialize_output(&mut target, outputs)?;
        Ok(target)
    }
}

impl<R, O> fmt::Debug for ProcedureCommand<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureCommand")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}
