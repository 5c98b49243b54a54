//! Property access on mapped model types.
//!
//! Mappings name properties by string; a [`Model`] resolves those names to
//! values. Implement it by hand for domain structs, or use [`Record`] when the
//! shape is only known at runtime.
//!
//! # Example
//! ```ignore
//! use sqltactic::{Model, PropertyError, Value};
//!
//! #[derive(Default)]
//! struct Widget { id: i64, name: String }
//!
//! impl Model for Widget {
//!     fn get_property(&self, name: &str) -> Result<Value, PropertyError> {
//!         match name {
//!             "Id" => Ok(self.id.into()),
//!             "Name" => Ok(self.name.clone().into()),
//!             _ => Err(PropertyError::UnknownProperty(name.to_string())),
//!         }
//!     }
//!
//!     fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
//!         match name {
//!             "Id" => self.id = value.to_i64()?,
//!             "Name" => self.name = value.to_string_value()?,
//!             _ => return Err(PropertyError::UnknownProperty(name.to_string())),
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::PropertyError;
use crate::value::Value;

/// A type whose properties can be read and written by name.
pub trait Model: 'static {
    /// Read the current value of a property.
    fn get_property(&self, name: &str) -> Result<Value, PropertyError>;

    /// Write a property.
    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError>;
}

/// A dynamic model: an ordered list of named values.
///
/// Reading an unknown property is an error; writing one appends it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (consuming builder form).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, replacing any existing value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl Model for Record {
    fn get_property(&self, name: &str) -> Result<Value, PropertyError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| PropertyError::UnknownProperty(name.to_string()))
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        self.insert(name, value);
        Ok(())
    }
}
