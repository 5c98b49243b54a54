//! The Widget table end to end: select-one, insert-one, delete-one and the
//! set-based operations, against the ODBC dialect.

use std::sync::Arc;
use std::thread;

use rust_decimal::Decimal;
use sqltactic::{
    ColumnMapping, CommandBehavior, DialectKind, ExecutorCapabilities, ExpectedRows, Expression,
    MappingRegistry, Model, PropertyError, Query, Row, TableMapping, TacticCommandBuilder, Value,
};

#[derive(Debug, Default, Clone, PartialEq)]
struct Widget {
    id: i32,
    name: String,
    price: Decimal,
}

impl Model for Widget {
    fn get_property(&self, name: &str) -> Result<Value, PropertyError> {
        match name {
            "Id" => Ok(self.id.into()),
            "Name" => Ok(self.name.as_str().into()),
            "Price" => Ok(self.price.into()),
            _ => Err(PropertyError::UnknownProperty(name.to_string())),
        }
    }

    fn set_property(&mut self, name: &str, value: Value) -> Result<(), PropertyError> {
        match name {
            "Id" => self.id = value.to_i32()?,
            "Name" => self.name = value.to_string_value()?,
            "Price" => self.price = value.to_decimal()?,
            _ => return Err(PropertyError::UnknownProperty(name.to_string())),
        }
        Ok(())
    }
}

fn registry() -> MappingRegistry {
    MappingRegistry::new()
        .with_table::<Widget>(
            TableMapping::new("dbo", "Widgets")
                .column(ColumnMapping::new("Id", "Id").ordinal(0).db_type("INT").identity())
                .column(
                    ColumnMapping::new("Name", "Name")
                        .ordinal(1)
                        .db_type("NVARCHAR")
                        .size(100),
                )
                .column(
                    ColumnMapping::new("Price", "Price")
                        .ordinal(2)
                        .db_type("DECIMAL")
                        .precision(10)
                        .scale(2),
                ),
        )
        .unwrap()
}

fn widget(id: i32) -> Widget {
    Widget {
        id,
        name: "Sprocket".to_string(),
        price: Decimal::new(1250, 2),
    }
}

#[test]
fn select_one_by_key() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
    let cmd = builder.select_one(&(), &widget(7)).unwrap();

    assert_eq!(
        cmd.text(),
        "SELECT t0.[Id] AS [Id], t0.[Name] AS [Name], t0.[Price] AS [Price] FROM [dbo].[Widgets] t0 WHERE t0.[Id] = ? ORDER BY t0.[Id] ASC;"
    );
    assert_eq!(cmd.parameters().len(), 1);
    assert_eq!(cmd.parameters().values(), [&Value::I32(7)]);
    assert_eq!(cmd.parameters().get("p0").unwrap().db_type.as_deref(), Some("INT"));
    assert_eq!(cmd.expected_affected_rows(), ExpectedRows::Unchecked);
    assert_eq!(cmd.expected_affected_rows().as_i64(), -1);
    assert_eq!(cmd.behavior(), CommandBehavior::SingleRow);
}

#[test]
fn insert_one_reads_back_identity() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
    let mut w = Widget {
        id: 0,
        name: "Sprocket".to_string(),
        price: Decimal::new(1250, 2),
    };
    let cmd = builder.insert_one(&(), &w).unwrap();

    assert_eq!(
        cmd.text(),
        "INSERT INTO [dbo].[Widgets] ([Name], [Price]) VALUES (?, ?); SELECT SCOPE_IDENTITY() AS [Id];"
    );
    assert_eq!(
        cmd.parameters().values(),
        [
            &Value::String("Sprocket".to_string()),
            &Value::Decimal(Decimal::new(1250, 2))
        ]
    );
    assert_eq!(cmd.expected_affected_rows(), ExpectedRows::Exactly(1));

    cmd.materialize(&mut w, &Row::new().with("Id", Decimal::new(42, 0)))
        .unwrap();
    assert_eq!(w.id, 42);
    assert_eq!(w.name, "Sprocket");
}

#[test]
fn insert_one_without_batch_support_needs_identify() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
    let cmd = builder
        .insert_one(&ExecutorCapabilities::single_statement(), &widget(0))
        .unwrap();
    assert!(!cmd.text().contains("SCOPE_IDENTITY"));

    let identify = builder
        .identify::<Widget>(&ExecutorCapabilities::single_statement())
        .unwrap()
        .expect("key is read back in a second round trip");
    assert_eq!(identify.text(), "SELECT SCOPE_IDENTITY() AS [Id];");
}

#[test]
fn delete_one_by_key() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
    let cmd = builder.delete_one(&(), &widget(7)).unwrap();

    assert_eq!(cmd.text(), "DELETE FROM [dbo].[Widgets] WHERE [Id] = ?;");
    assert_eq!(cmd.parameters().values(), [&Value::I32(7)]);
    assert_eq!(cmd.expected_affected_rows(), ExpectedRows::Exactly(1));
    assert_eq!(cmd.expected_affected_rows().as_i64(), 1);
}

#[test]
fn set_based_operations_are_unsupported() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
    let query = Query::new().filter(Expression::symbol("Price").gt(100i32));

    for result in [
        builder.insert_all::<Widget>(&(), &query),
        builder.update_all::<Widget>(&(), &query),
        builder.delete_all::<Widget>(&(), &query),
    ] {
        assert!(result.unwrap_err().is_unsupported());
    }
}

#[test]
fn filter_keys_are_unique() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
    let query = Query::new().filter(
        Expression::symbol("Price")
            .between(1i32, 10i32)
            .and(Expression::symbol("Price").ne(5i32)),
    );
    let cmd = builder.select_all::<Widget>(&(), &query).unwrap();

    let mut names: Vec<&str> = cmd.parameters().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names.len(), 3);
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), 3);
    assert_eq!(cmd.text().matches('?').count(), 3);
}

#[test]
fn building_twice_is_deterministic() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::SqlServer.dialect(), &registry);
    let query = Query::new()
        .filter(Expression::symbol("Name").like("S%").or(Expression::symbol("Id").is_null()))
        .desc("Price");

    let a = builder.select_all::<Widget>(&(), &query).unwrap();
    let b = builder.select_all::<Widget>(&(), &query).unwrap();
    assert_eq!(a.text(), b.text());
    assert_eq!(a.parameters(), b.parameters());
}

#[test]
fn builders_share_registry_across_threads() {
    let registry = Arc::new(registry());
    let expected = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry)
        .update_one(&(), &widget(3))
        .unwrap()
        .text()
        .to_string();

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let builder = TacticCommandBuilder::new(DialectKind::Odbc.dialect(), &registry);
                builder.update_one(&(), &widget(i)).unwrap().text().to_string()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}
