//! The same mapping under every dialect: only the formatting changes.

use sqltactic::{
    ColumnMapping, DialectKind, EngineConfig, Expression, MappingRegistry, Query, Record,
    TableMapping, TacticCommandBuilder, TacticError, dialect_for,
};

fn registry() -> MappingRegistry {
    MappingRegistry::new()
        .with_table::<Record>(
            TableMapping::new("dbo", "Widgets")
                .column(ColumnMapping::new("Id", "Id").ordinal(0).identity())
                .column(ColumnMapping::new("Name", "Name").ordinal(1)),
        )
        .unwrap()
}

fn probe() -> Record {
    Record::new().with("Id", 7i32).with("Name", "Sprocket")
}

#[test]
fn select_one_per_dialect() {
    let registry = registry();
    let build = |kind: DialectKind| {
        TacticCommandBuilder::new(kind.dialect(), &registry)
            .select_one(&(), &probe())
            .unwrap()
    };
    let text = |kind: DialectKind| build(kind).text().to_string();

    let odbc = build(DialectKind::Odbc);
    for kind in [DialectKind::SqlServer, DialectKind::Sqlite] {
        let cmd = build(kind);
        assert_eq!(cmd.parameters().len(), odbc.parameters().len());
        assert_eq!(cmd.parameters().values(), odbc.parameters().values());
        assert_eq!(cmd.expected_affected_rows(), odbc.expected_affected_rows());
        assert_eq!(cmd.is_nullipotent(), odbc.is_nullipotent());
        assert_eq!(cmd.behavior(), odbc.behavior());
    }

    assert_eq!(
        text(DialectKind::Odbc),
        "SELECT t0.[Id] AS [Id], t0.[Name] AS [Name] FROM [dbo].[Widgets] t0 WHERE t0.[Id] = ? ORDER BY t0.[Id] ASC;"
    );
    assert_eq!(
        text(DialectKind::SqlServer),
        "SELECT t0.[Id] AS [Id], t0.[Name] AS [Name] FROM [dbo].[Widgets] t0 WHERE t0.[Id] = @p0 ORDER BY t0.[Id] ASC;"
    );
    assert_eq!(
        text(DialectKind::Sqlite),
        r#"SELECT t0."Id" AS "Id", t0."Name" AS "Name" FROM "dbo"."Widgets" t0 WHERE t0."Id" = @p0 ORDER BY t0."Id" ASC;"#
    );
}

#[test]
fn sqlite_insert_uses_separate_identify() {
    let registry = registry();
    let builder = TacticCommandBuilder::new(DialectKind::Sqlite.dialect(), &registry);

    let insert = builder.insert_one(&(), &probe()).unwrap();
    assert_eq!(
        insert.text(),
        r#"INSERT INTO "dbo"."Widgets" ("Name") VALUES (@p0);"#
    );

    let identify = builder.identify::<Record>(&()).unwrap().unwrap();
    assert_eq!(identify.text(), r#"SELECT last_insert_rowid() AS "Id";"#);
}

#[test]
fn identifiers_are_escaped() {
    let odbc = DialectKind::Odbc.dialect();
    assert_eq!(odbc.column_name("a]b"), "[a]]b]");
    let sqlite = DialectKind::Sqlite.dialect();
    assert_eq!(sqlite.column_name(r#"a"b"#), r#""a""b""#);
}

#[test]
fn markers_match_parameter_order() {
    let registry = registry();
    let query = Query::new().filter(
        Expression::symbol("Name")
            .eq("a")
            .or(Expression::symbol("Name").eq("b")),
    );
    let cmd = TacticCommandBuilder::new(DialectKind::SqlServer.dialect(), &registry)
        .select_all::<Record>(&(), &query)
        .unwrap();
    let first = cmd.text().find("@p0").unwrap();
    let second = cmd.text().find("@p1").unwrap();
    assert!(first < second);
    assert_eq!(cmd.parameters().as_slice()[0].name, "p0");
    assert_eq!(cmd.parameters().as_slice()[1].name, "p1");
}

#[test]
fn factory_lookup() {
    assert_eq!(dialect_for("odbc").unwrap().kind(), DialectKind::Odbc);
    assert_eq!(dialect_for("mssql").unwrap().kind(), DialectKind::SqlServer);
    assert!(matches!(dialect_for("db2"), Err(TacticError::UnknownDialect(_))));
}

#[test]
fn sqlite_creates_native_file_once() {
    let dialect = DialectKind::Sqlite.dialect();
    assert!(dialect.can_create_native_database_file());

    let path = std::env::temp_dir().join(format!("sqltactic-{}.db", uuid::Uuid::new_v4()));
    dialect.create_native_database_file(&path).unwrap();
    assert!(path.exists());
    assert!(matches!(
        dialect.create_native_database_file(&path),
        Err(TacticError::Io(_))
    ));
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn config_selects_dialect() {
    let registry = registry();
    let config = EngineConfig::from_toml_str("dialect = \"sqlserver\"").unwrap();
    let builder = TacticCommandBuilder::from_config(&config, &registry).unwrap();
    let cmd = builder.delete_one(&(), &probe()).unwrap();
    assert_eq!(cmd.text(), "DELETE FROM [dbo].[Widgets] WHERE [Id] = @p0;");
}
