//! Declarative mapping between model types and tables or stored procedures.
//!
//! Mappings are plain data built once at startup and registered in a
//! [`MappingRegistry`]. Columns and parameters carry an ordinal; every command
//! emits them in ascending ordinal order.
//!
//! # Example
//! ```ignore
//! use sqltactic::mapping::{ColumnMapping, TableMapping};
//!
//! let widgets = TableMapping::new("dbo", "Widgets")
//!     .column(ColumnMapping::new("Id", "Id").ordinal(0).db_type("INT").identity())
//!     .column(ColumnMapping::new("Name", "Name").ordinal(1).db_type("NVARCHAR").size(100))
//!     .column(ColumnMapping::new("Price", "Price").ordinal(2).db_type("DECIMAL").precision(10).scale(2));
//! ```

mod registry;

pub use registry::{Mapping, MappingRegistry};

use crate::error::{TacticError, TacticResult};
use crate::ident;

/// How one model property maps to a table column or result-set column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    /// Column name in the database.
    pub name: String,
    /// Property on the model type.
    pub property: String,
    /// Database type as declared in the source schema (e.g. `NVARCHAR`).
    pub db_type: Option<String>,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub nullable: bool,
    /// Emission order.
    pub ordinal: i32,
    pub is_primary_key: bool,
    /// Identity column: the server assigns its value on insert.
    pub is_server_generated_primary_key: bool,
    /// Read positionally from result rows rather than by name.
    pub is_anonymous: bool,
}

impl ColumnMapping {
    /// Map `property` on the model to the column `name`.
    pub fn new(name: impl Into<String>, property: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            property: property.into(),
            db_type: None,
            size: None,
            precision: None,
            scale: None,
            nullable: false,
            ordinal: 0,
            is_primary_key: false,
            is_server_generated_primary_key: false,
            is_anonymous: false,
        }
    }

    pub fn ordinal(mut self, ordinal: i32) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn db_type(mut self, db_type: impl Into<String>) -> Self {
        self.db_type = Some(db_type.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark as (part of) the primary key.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    /// Mark as a server-generated primary key. Implies [`primary_key`](Self::primary_key).
    pub fn identity(mut self) -> Self {
        self.is_primary_key = true;
        self.is_server_generated_primary_key = true;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    fn validate(&self) -> TacticResult<()> {
        ident::validate(&self.name)?;
        ident::validate(&self.property)
    }
}

/// How a model type maps to a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableMapping {
    pub schema: Option<String>,
    pub table: String,
    pub(crate) columns: Vec<ColumnMapping>,
}

impl TableMapping {
    /// Create a table mapping. An empty schema means "none".
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        let schema = schema.into();
        Self {
            schema: (!schema.is_empty()).then_some(schema),
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Add a column.
    pub fn column(mut self, column: ColumnMapping) -> Self {
        self.columns.push(column);
        self
    }

    /// Columns in ascending ordinal order.
    pub fn columns(&self) -> &[ColumnMapping] {
        &self.columns
    }

    /// Columns that identify a row.
    ///
    /// When no column is marked as primary key, every column is part of the
    /// implicit key.
    pub fn key_columns(&self) -> Vec<&ColumnMapping> {
        let keys: Vec<_> = self.columns.iter().filter(|c| c.is_primary_key).collect();
        if keys.is_empty() {
            self.columns.iter().collect()
        } else {
            keys
        }
    }

    /// Whether any column is explicitly marked as primary key.
    pub fn has_explicit_key(&self) -> bool {
        self.columns.iter().any(|c| c.is_primary_key)
    }

    /// The server-generated key column, if any.
    pub fn identity_column(&self) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|c| c.is_server_generated_primary_key)
    }

    /// Look up a column by column name, then by property name.
    pub fn find_column(&self, symbol: &str) -> Option<&ColumnMapping> {
        self.columns
            .iter()
            .find(|c| c.name == symbol)
            .or_else(|| self.columns.iter().find(|c| c.property == symbol))
    }

    /// Validate names and put columns in ordinal order.
    pub(crate) fn normalize(&mut self) -> TacticResult<()> {
        if let Some(schema) = &self.schema {
            ident::validate(schema)?;
        }
        ident::validate(&self.table)?;
        for column in &self.columns {
            column.validate()?;
        }
        self.columns.sort_by_key(|c| c.ordinal);
        if self.columns.is_empty() {
            tracing::warn!(
                target: "sqltactic.mapping",
                table = %self.table,
                "table mapping has no columns"
            );
        }
        Ok(())
    }
}

/// Direction of a stored procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterDirection {
    In,
    Out,
    InOut,
    Return,
}

impl ParameterDirection {
    /// Whether the caller supplies a value.
    pub const fn is_input(self) -> bool {
        matches!(self, Self::In | Self::InOut)
    }

    /// Whether the server returns a value.
    pub const fn is_output(self) -> bool {
        matches!(self, Self::Out | Self::InOut | Self::Return)
    }
}

/// How a model property maps to a stored procedure parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterMapping {
    /// Parameter name as declared by the procedure.
    pub name: String,
    /// Property on the call model (inputs) or the return model (outputs).
    pub property: String,
    pub direction: ParameterDirection,
    pub db_type: Option<String>,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub nullable: bool,
    pub ordinal: i32,
}

impl ParameterMapping {
    pub fn new(
        name: impl Into<String>,
        property: impl Into<String>,
        direction: ParameterDirection,
    ) -> Self {
        Self {
            name: name.into(),
            property: property.into(),
            direction,
            db_type: None,
            size: None,
            precision: None,
            scale: None,
            nullable: false,
            ordinal: 0,
        }
    }

    pub fn ordinal(mut self, ordinal: i32) -> Self {
        self.ordinal = ordinal;
        self
    }

    pub fn db_type(mut self, db_type: impl Into<String>) -> Self {
        self.db_type = Some(db_type.into());
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// How a call model maps to a stored procedure.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureMapping {
    pub schema: Option<String>,
    pub name: String,
    pub(crate) input_parameters: Vec<ParameterMapping>,
    pub(crate) output_parameters: Vec<ParameterMapping>,
    pub(crate) result_columns: Vec<ColumnMapping>,
    /// The procedure only reads.
    pub is_nullipotent: bool,
}

impl ProcedureMapping {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        let schema = schema.into();
        Self {
            schema: (!schema.is_empty()).then_some(schema),
            name: name.into(),
            input_parameters: Vec::new(),
            output_parameters: Vec::new(),
            result_columns: Vec::new(),
            is_nullipotent: false,
        }
    }

    /// Add a parameter whose value is read from the call model.
    pub fn input(mut self, parameter: ParameterMapping) -> Self {
        self.input_parameters.push(parameter);
        self
    }

    /// Add a parameter whose value is written to the return model.
    pub fn output(mut self, parameter: ParameterMapping) -> Self {
        self.output_parameters.push(parameter);
        self
    }

    /// Add a column of the row-shaped result set.
    pub fn result_column(mut self, column: ColumnMapping) -> Self {
        self.result_columns.push(column);
        self
    }

    pub fn nullipotent(mut self) -> Self {
        self.is_nullipotent = true;
        self
    }

    pub fn input_parameters(&self) -> &[ParameterMapping] {
        &self.input_parameters
    }

    pub fn output_parameters(&self) -> &[ParameterMapping] {
        &self.output_parameters
    }

    pub fn result_columns(&self) -> &[ColumnMapping] {
        &self.result_columns
    }

    /// Validates names and orders everything by ordinal. A parameter must
    /// sit in the list its direction reads from: `In` never in the output
    /// list, `Out` and `Return` never in the input list.
    pub(crate) fn normalize<T: ?Sized>(&mut self) -> TacticResult<()> {
        if let Some(schema) = &self.schema {
            ident::validate(schema)?;
        }
        ident::validate(&self.name)?;
        for p in self.input_parameters.iter().chain(&self.output_parameters) {
            ident::validate(&p.name)?;
            ident::validate(&p.property)?;
        }
        if let Some(p) = self.input_parameters.iter().find(|p| !p.direction.is_input()) {
            return Err(TacticError::invalid_mapping::<T>(format!(
                "{} is {:?} but declared as an input",
                p.name, p.direction
            )));
        }
        if let Some(p) = self.output_parameters.iter().find(|p| !p.direction.is_output()) {
            return Err(TacticError::invalid_mapping::<T>(format!(
                "{} is {:?} but declared as an output",
                p.name, p.direction
            )));
        }
        for c in &self.result_columns {
            c.validate()?;
        }
        self.input_parameters.sort_by_key(|p| p.ordinal);
        self.output_parameters.sort_by_key(|p| p.ordinal);
        self.result_columns.sort_by_key(|c| c.ordinal);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets() -> TableMapping {
        TableMapping::new("dbo", "Widgets")
            .column(ColumnMapping::new("Price", "Price").ordinal(2))
            .column(ColumnMapping::new("Id", "Id").ordinal(0).identity())
            .column(ColumnMapping::new("Name", "Name").ordinal(1))
    }

    #[test]
    fn normalize_sorts_by_ordinal() {
        let mut m = widgets();
        m.normalize().unwrap();
        let names: Vec<_> = m.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Id", "Name", "Price"]);
    }

    #[test]
    fn key_columns_explicit() {
        let m = widgets();
        let keys: Vec<_> = m.key_columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(keys, ["Id"]);
        assert_eq!(m.identity_column().map(|c| c.name.as_str()), Some("Id"));
    }

    #[test]
    fn key_columns_implicit_all() {
        let m = TableMapping::new("", "Tags")
            .column(ColumnMapping::new("A", "A"))
            .column(ColumnMapping::new("B", "B"));
        assert!(!m.has_explicit_key());
        assert_eq!(m.key_columns().len(), 2);
        assert!(m.schema.is_none());
    }

    #[test]
    fn find_column_by_property() {
        let m = TableMapping::new("dbo", "People")
            .column(ColumnMapping::new("first_name", "FirstName"));
        assert_eq!(
            m.find_column("FirstName").map(|c| c.name.as_str()),
            Some("first_name")
        );
        assert!(m.find_column("Nope").is_none());
    }

    #[test]
    fn normalize_rejects_empty_column_name() {
        let mut m = TableMapping::new("dbo", "T").column(ColumnMapping::new("", "X"));
        assert!(m.normalize().is_err());
    }

    #[test]
    fn normalize_rejects_direction_list_mismatch() {
        let mut inbound_as_output = ProcedureMapping::new("dbo", "P")
            .output(ParameterMapping::new("@Id", "Id", ParameterDirection::In));
        let err = inbound_as_output.normalize::<()>().unwrap_err();
        assert!(err.is_invalid_mapping());

        let mut return_as_input = ProcedureMapping::new("dbo", "P")
            .input(ParameterMapping::new("@RC", "Status", ParameterDirection::Return));
        assert!(return_as_input.normalize::<()>().is_err());

        let mut in_out_either_side = ProcedureMapping::new("dbo", "P")
            .input(ParameterMapping::new("@A", "A", ParameterDirection::InOut))
            .output(ParameterMapping::new("@B", "B", ParameterDirection::InOut));
        in_out_either_side.normalize::<()>().unwrap();
    }

    #[test]
    fn directions() {
        assert!(ParameterDirection::InOut.is_input());
        assert!(ParameterDirection::InOut.is_output());
        assert!(!ParameterDirection::Return.is_input());
        assert!(!ParameterDirection::In.is_output());
    }
}
