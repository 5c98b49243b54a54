use std::any::TypeId;
use std::collections::HashMap;

use super::{ProcedureMapping, TableMapping};
use crate::error::{TacticError, TacticResult};

/// Mapping registered for one model type.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapping {
    Table(TableMapping),
    Procedure(ProcedureMapping),
}

#[derive(Debug, Clone)]
struct Entry {
    type_name: &'static str,
    mapping: Mapping,
}

/// Registry of model mappings.
///
/// Build it once at startup and share it by reference (or `Arc`); lookups
/// never mutate it.
#[derive(Debug, Clone, Default)]
pub struct MappingRegistry {
    entries: HashMap<TypeId, Entry>,
}

impl MappingRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the table mapping for `T`, replacing any previous mapping.
    pub fn register_table<T: 'static>(&mut self, mut mapping: TableMapping) -> TacticResult<()> {
        mapping.normalize()?;
        self.insert::<T>(Mapping::Table(mapping));
        Ok(())
    }

    /// Register the procedure mapping for the call model `T`.
    pub fn register_procedure<T: 'static>(
        &mut self,
        mut mapping: ProcedureMapping,
    ) -> TacticResult<()> {
        mapping.normalize::<T>()?;
        self.insert::<T>(Mapping::Procedure(mapping));
        Ok(())
    }

    /// Consuming form of [`register_table`](Self::register_table).
    pub fn with_table<T: 'static>(mut self, mapping: TableMapping) -> TacticResult<Self> {
        self.register_table::<T>(mapping)?;
        Ok(self)
    }

    /// Consuming form of [`register_procedure`](Self::register_procedure).
    pub fn with_procedure<T: 'static>(mut self, mapping: ProcedureMapping) -> TacticResult<Self> {
        self.register_procedure::<T>(mapping)?;
        Ok(self)
    }

    fn insert<T: 'static>(&mut self, mapping: Mapping) {
        self.entries.insert(
            TypeId::of::<T>(),
            Entry {
                type_name: std::any::type_name::<T>(),
                mapping,
            },
        );
    }

    /// Mapping for a type, if any.
    pub fn mapping(&self, type_id: TypeId) -> Option<&Mapping> {
        self.entries.get(&type_id).map(|e| &e.mapping)
    }

    /// Table mapping for `T`.
    pub fn table<T: 'static>(&self) -> TacticResult<&TableMapping> {
        match self.mapping(TypeId::of::<T>()) {
            Some(Mapping::Table(m)) => Ok(m),
            Some(Mapping::Procedure(_)) => Err(TacticError::invalid_mapping::<T>(
                "type is mapped to a procedure, not a table",
            )),
            None => Err(TacticError::invalid_mapping::<T>("no table mapping registered")),
        }
    }

    /// Procedure mapping for the call model `T`.
    pub fn procedure<T: 'static>(&self) -> TacticResult<&ProcedureMapping> {
        match self.mapping(TypeId::of::<T>()) {
            Some(Mapping::Procedure(m)) => Ok(m),
            Some(Mapping::Table(_)) => Err(TacticError::invalid_mapping::<T>(
                "type is mapped to a table, not a procedure",
            )),
            None => Err(TacticError::invalid_mapping::<T>(
                "no procedure mapping registered",
            )),
        }
    }

    /// Check if a mapping is registered for `T`.
    pub fn contains<T: 'static>(&self) -> bool {
        self.entries.contains_key(&TypeId::of::<T>())
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.entries.values().map(|e| e.type_name).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{ColumnMapping, ParameterDirection, ParameterMapping};

    struct Widget;
    struct GetWidget;
    struct Unmapped;

    fn registry() -> MappingRegistry {
        MappingRegistry::new()
            .with_table::<Widget>(
                TableMapping::new("dbo", "Widgets")
                    .column(ColumnMapping::new("Id", "Id").identity()),
            )
            .unwrap()
            .with_procedure::<GetWidget>(
                ProcedureMapping::new("dbo", "GetWidget").input(ParameterMapping::new(
                    "@Id",
                    "Id",
                    ParameterDirection::In,
                )),
            )
            .unwrap()
    }

    #[test]
    fn lookup_by_kind() {
        let r = registry();
        assert_eq!(r.len(), 2);
        assert_eq!(r.table::<Widget>().unwrap().table, "Widgets");
        assert_eq!(r.procedure::<GetWidget>().unwrap().name, "GetWidget");
        assert!(matches!(
            r.mapping(TypeId::of::<Widget>()),
            Some(Mapping::Table(_))
        ));
    }

    #[test]
    fn missing_mapping_is_invalid() {
        let err = registry().table::<Unmapped>().unwrap_err();
        assert!(err.is_invalid_mapping());
        assert!(err.to_string().contains("Unmapped"));
    }

    #[test]
    fn wrong_kind_is_invalid() {
        let r = registry();
        assert!(r.procedure::<Widget>().unwrap_err().is_invalid_mapping());
        assert!(r.table::<GetWidget>().unwrap_err().is_invalid_mapping());
    }

    #[test]
    fn invalid_names_are_rejected_at_registration() {
        let mut r = MappingRegistry::new();
        let err = r
            .register_table::<Widget>(TableMapping::new("dbo", ""))
            .unwrap_err();
        assert!(matches!(err, TacticError::InvalidIdentifier(_)));
        assert!(!r.contains::<Widget>());
    }
}
