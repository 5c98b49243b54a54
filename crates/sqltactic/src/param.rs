//! Bound parameters of a tactic command.

use std::collections::{BTreeMap, HashSet};

use crate::error::{TacticError, TacticResult};
use crate::mapping::{ColumnMapping, ParameterDirection, ParameterMapping};
use crate::value::Value;

/// One bound parameter.
///
/// Created fresh for every command; never shared between commands.
#[derive(Debug, Clone, PartialEq)]
pub struct TacticParameter {
    pub direction: ParameterDirection,
    pub db_type: Option<String>,
    pub size: Option<u32>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
    pub nullable: bool,
    /// Unique key within the command.
    pub name: String,
    pub value: Value,
    /// Backend-specific overrides written by
    /// [`Dialect::fixup_parameter`](crate::Dialect::fixup_parameter).
    pub fixups: BTreeMap<String, String>,
}

impl TacticParameter {
    /// An input parameter with no type information.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            direction: ParameterDirection::In,
            db_type: None,
            size: None,
            precision: None,
            scale: None,
            nullable: true,
            name: name.into(),
            value: value.into(),
            fixups: BTreeMap::new(),
        }
    }

    /// An input parameter typed after a column.
    pub fn for_column(name: impl Into<String>, column: &ColumnMapping, value: Value) -> Self {
        Self {
            direction: ParameterDirection::In,
            db_type: column.db_type.clone(),
            size: column.size,
            precision: column.precision,
            scale: column.scale,
            nullable: column.nullable,
            name: name.into(),
            value,
            fixups: BTreeMap::new(),
        }
    }

    /// A procedure parameter named and typed after its mapping.
    pub fn for_procedure(mapping: &ParameterMapping, value: Value) -> Self {
        Self {
            direction: mapping.direction,
            db_type: mapping.db_type.clone(),
            size: mapping.size,
            precision: mapping.precision,
            scale: mapping.scale,
            nullable: mapping.nullable,
            name: mapping.name.clone(),
            value,
            fixups: BTreeMap::new(),
        }
    }

    /// Record a backend-specific override.
    pub fn set_fixup(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fixups.insert(key.into(), value.into());
    }

    pub fn fixup(&self, key: &str) -> Option<&str> {
        self.fixups.get(key).map(String::as_str)
    }
}

/// Ordered parameters of one command, unique by name.
///
/// Order is the order of appearance in the command text, which matters for
/// positional markers such as `?`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TacticParameters {
    params: Vec<TacticParameter>,
    names: HashSet<String>,
    next: usize,
}

impl TacticParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next generated key (`p0`, `p1`, ...).
    ///
    /// Generated keys skip names already bound, so allocation never hands out
    /// a key that `push` would reject.
    pub fn next_name(&mut self) -> String {
        loop {
            let name = format!("p{}", self.next);
            self.next += 1;
            if !self.names.contains(&name) {
                return name;
            }
        }
    }

    /// Add a parameter. Fails if its name is already bound.
    pub fn push(&mut self, param: TacticParameter) -> TacticResult<()> {
        if !self.names.insert(param.name.clone()) {
            return Err(TacticError::DuplicateParameter { name: param.name });
        }
        self.params.push(param);
        Ok(())
    }

    /// Add a parameter unless its name is already bound.
    ///
    /// Returns `false` when the earlier binding was kept.
    pub fn push_first(&mut self, param: TacticParameter) -> bool {
        if self.names.contains(&param.name) {
            return false;
        }
        self.names.insert(param.name.clone());
        self.params.push(param);
        true
    }

    pub fn get(&self, name: &str) -> Option<&TacticParameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TacticParameter> {
        self.params.iter()
    }

    pub fn as_slice(&self) -> &[TacticParameter] {
        &self.params
    }

    /// Parameter values in order.
    pub fn values(&self) -> Vec<&Value> {
        self.params.iter().map(|p| &p.value).collect()
    }
}

impl<'a> IntoIterator for &'a TacticParameters {
    type Item = &'a TacticParameter;
    type IntoIter = std::slice::Iter<'a, TacticParameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_names_are_sequential() {
        let mut params = TacticParameters::new();
        assert_eq!(params.next_name(), "p0");
        assert_eq!(params.next_name(), "p1");
    }

    #[test]
    fn push_rejects_collision() {
        let mut params = TacticParameters::new();
        params.push(TacticParameter::new("Id", 1i32)).unwrap();
        let err = params.push(TacticParameter::new("Id", 2i32)).unwrap_err();
        assert!(matches!(err, TacticError::DuplicateParameter { ref name } if name == "Id"));
        // the earlier binding is untouched
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Id").unwrap().value, Value::I32(1));
    }

    #[test]
    fn push_first_keeps_earliest() {
        let mut params = TacticParameters::new();
        assert!(params.push_first(TacticParameter::new("@X", 1i32)));
        assert!(!params.push_first(TacticParameter::new("@X", 2i32)));
        assert_eq!(params.get("@X").unwrap().value, Value::I32(1));
    }

    #[test]
    fn next_name_skips_bound_names() {
        let mut params = TacticParameters::new();
        params.push(TacticParameter::new("p0", 1i32)).unwrap();
        assert_eq!(params.next_name(), "p1");
    }

    #[test]
    fn order_is_insertion_order() {
        let mut params = TacticParameters::new();
        for v in [3i32, 1, 2] {
            let name = params.next_name();
            params.push(TacticParameter::new(name, v)).unwrap();
        }
        assert_eq!(
            params.values(),
            [&Value::I32(3), &Value::I32(1), &Value::I32(2)]
        );
    }
}
