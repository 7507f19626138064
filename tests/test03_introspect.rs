mod common;

use common::generated::OrdersTuple;
use common::orders_database;
use sql_typegen::customisations::{Customisations, SqliteCustomisations};
use sql_typegen::introspect::{
    column_descriptors, obtain_type_of_first_column, process_result_set_attributes,
};
use sql_typegen::prelude::*;

#[test]
fn descriptors_follow_declared_types() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let mut declared = Vec::new();
    let layout = db.with_connection(|conn| {
        let stmt = conn.prepare("SELECT id, customer, total, placed, total * 2 AS doubled FROM orders")?;
        Ok(process_result_set_attributes(
            &stmt,
            db.customisations(),
            |index, _, decl| declared.push((index, decl.map(str::to_string))),
        ))
    })?;

    let kinds: Vec<_> = layout.columns().iter().map(|c| c.host_type).collect();
    assert_eq!(
        kinds,
        vec![
            HostType::Int32,
            HostType::Text,
            HostType::Float64,
            HostType::Date,
            HostType::Any,
        ]
    );
    assert_eq!(layout.columns()[4].name, "doubled");
    assert_eq!(declared[1], (1, Some("TEXT".to_string())));
    assert_eq!(declared[4], (4, None));
    Ok(())
}

#[test]
fn descriptors_are_deterministic() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let read = || {
        db.with_connection(|conn| {
            let stmt = conn.prepare("SELECT * FROM orders")?;
            Ok(column_descriptors(&stmt, db.customisations()))
        })
    };
    let first = read()?;
    db.execute_batch("DELETE FROM orders")?;
    assert_eq!(first, read()?);
    assert_eq!(first.as_slice(), <OrdersTuple as Tuple>::column_descriptors());
    Ok(())
}

#[test]
fn first_column_type_uses_probe_value_when_undeclared() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    db.with_connection(|conn| {
        let count = conn.prepare("SELECT COUNT(*) FROM orders")?;
        let probe = DbValue::Int(3);
        assert_eq!(
            obtain_type_of_first_column(&count, db.customisations(), Some(&probe))?,
            HostType::Int64
        );
        assert_eq!(
            obtain_type_of_first_column(&count, db.customisations(), None)?,
            HostType::Any
        );

        let total = conn.prepare("SELECT total FROM orders")?;
        let text = DbValue::Text("x".into());
        assert_eq!(
            obtain_type_of_first_column(&total, db.customisations(), Some(&text))?,
            HostType::Float64
        );
        Ok(())
    })
}

#[test]
fn sqlite_type_names_map_by_name_then_affinity() {
    let c = SqliteCustomisations;
    assert_eq!(c.column_type(Some("BOOLEAN")), HostType::Bool);
    assert_eq!(c.column_type(Some("bigint")), HostType::Int64);
    assert_eq!(c.column_type(Some("VARCHAR(40)")), HostType::Text);
    assert_eq!(c.column_type(Some("DATETIME")), HostType::Timestamp);
    assert_eq!(c.column_type(Some("JSON")), HostType::Json);
    assert_eq!(c.column_type(Some("POINTINT")), HostType::Int64);
    assert_eq!(c.column_type(Some("MYSTERY")), HostType::Any);
    assert_eq!(c.column_type(None), HostType::Any);
}

#[test]
fn column_values_are_coerced_to_host_types() -> Result<(), SqlTypegenError> {
    let c = SqliteCustomisations;
    assert_eq!(
        c.column_value(DbValue::Int(1), Some("BOOLEAN"))?,
        DbValue::Bool(true)
    );
    assert_eq!(
        c.column_value(DbValue::Text(r#"{"a":1}"#.into()), Some("JSON"))?,
        DbValue::Json(serde_json::json!({"a": 1}))
    );
    assert_eq!(c.column_value(DbValue::Null, Some("DATE"))?, DbValue::Null);
    assert!(matches!(
        c.column_value(DbValue::Int(i64::MAX), Some("INTEGER")),
        Err(SqlTypegenError::MappingError(_))
    ));
    Ok(())
}

#[test]
fn standard_backend_adds_for_update() {
    let c = Backend::Standard.customisations();
    assert_eq!(
        c.for_update_sql("SELECT * FROM t;"),
        "SELECT * FROM t FOR UPDATE"
    );
    let sqlite = Backend::Sqlite.customisations();
    assert_eq!(sqlite.for_update_sql("SELECT * FROM t"), "SELECT * FROM t");
}
