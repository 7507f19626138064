mod common;

use std::thread;
use std::time::Duration;

use common::generated::{CountOrders, Orders, OrdersTuple};
use common::{EventLog, orders_database};
use sql_typegen::prelude::*;

fn insert(id: i64, customer: &str) -> Update {
    Update::new(
        "INSERT INTO $$orders (id, customer) VALUES (?, ?)",
        vec![id.into(), customer.into()],
    )
}

#[test]
fn transact_commits_on_success() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let inserted = db.transact(|xact| {
        let a = xact.update(&insert(10, "erin"))?;
        let b = xact.update(&insert(11, "erin"))?;
        Ok(a + b)
    })?;
    assert_eq!(inserted, 2);
    assert_eq!(CountOrders::value_of(&db)?, Some(5));
    Ok(())
}

#[test]
fn transact_rolls_back_on_error() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let result = db.transact(|xact| {
        xact.update(&insert(10, "erin"))?;
        // Duplicate primary key.
        xact.update(&insert(1, "erin"))?;
        Ok(())
    });
    assert!(matches!(result, Err(SqlTypegenError::SqliteError(_))));
    assert_eq!(CountOrders::value_of(&db)?, Some(3));
    Ok(())
}

#[test]
fn xact_sees_its_own_writes() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    db.transact(|xact| {
        xact.update(&insert(10, "alice"))?;
        assert_eq!(Orders::query_with(xact, "alice")?.len(), 3);
        assert_eq!(CountOrders::value_of_with(xact)?, Some(4));
        Ok(())
    })?;
    Ok(())
}

#[test]
fn use_transaction_commits_only_on_true() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let committed = db.use_transaction(|xact| {
        xact.update(&insert(10, "frank"))?;
        Ok(false)
    })?;
    assert!(!committed);
    assert_eq!(CountOrders::value_of(&db)?, Some(3));

    let committed = db.use_transaction(|xact| {
        xact.update(&insert(10, "frank"))?;
        Ok(true)
    })?;
    assert!(committed);
    assert_eq!(CountOrders::value_of(&db)?, Some(4));
    Ok(())
}

#[test]
fn process_transaction_captures_failures() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let outcome = db.process_transaction(|xact| {
        xact.update(&Update::new("DELETE FROM $$orders", vec![]))?;
        xact.update(&Update::new("DELETE FROM $$no_such_table", vec![]))?;
        Ok(true)
    });
    assert!(!outcome.is_success());
    assert!(outcome.error.is_some());
    assert_eq!(CountOrders::value_of(&db)?, Some(3));

    let outcome = db.process_transaction(|_| Ok(true));
    assert!(outcome.is_success());
    assert!(outcome.into_result()?);
    Ok(())
}

#[test]
fn dry_run_always_rolls_back() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let deleted = db.dry_run(|xact| xact.update(&Update::new("DELETE FROM $$orders", vec![])))?;
    assert_eq!(deleted, 3);
    assert_eq!(CountOrders::value_of(&db)?, Some(3));
    Ok(())
}

#[test]
fn updatable_tuples_inside_a_transaction() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;

    let result = db.transact(|xact| {
        let query = Query::<OrdersTuple>::new("SELECT * FROM $$orders", vec![]).for_table("$$orders");
        for mut row in xact.query_for_update(&query)? {
            row.total = Some(0.0);
            row.update_with(xact)?;
        }
        Err::<(), _>(SqlTypegenError::ExecutionError("abandon".to_string()))
    });
    assert!(result.is_err());

    let zeroed = ValueOf::<i64>::new("SELECT COUNT(*) FROM $$orders WHERE total = 0", vec![]);
    assert_eq!(db.value_of(&zeroed)?, Some(0));
    Ok(())
}

#[test]
fn statements_in_a_transaction_emit_events() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;
    let log = EventLog::default();
    db.add_sql_event_listener(log.listener());

    db.transact(|xact| {
        xact.update(&insert(10, "gina"))?;
        xact.execute_batch("UPDATE $$orders SET total = 1 WHERE id = 10")?;
        Ok(())
    })?;

    let events = log.events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.location.contains("test02_transactions.rs")));
    assert_eq!(
        events[0].sql_text,
        "INSERT INTO orders (id, customer) VALUES (?, ?)"
    );
    Ok(())
}

#[test]
fn concurrent_for_update_increments_both_commit() -> Result<(), SqlTypegenError> {
    let (_dir, db) = orders_database()?;
    let query =
        Query::<OrdersTuple>::new("SELECT * FROM $$orders WHERE id = 1", vec![]).for_table("$$orders");

    let results: Vec<Result<(), SqlTypegenError>> = thread::scope(|s| {
        let workers: Vec<_> = (0..2)
            .map(|_| {
                s.spawn(|| {
                    db.transact(|xact| {
                        for mut row in xact.query_for_update(&query)? {
                            row.total = row.total.map(|total| total + 1.0);
                            thread::sleep(Duration::from_millis(50));
                            row.update_with(xact)?;
                        }
                        Ok(())
                    })
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });
    assert!(results.iter().all(Result::is_ok), "{results:?}");

    let total = ValueOf::<f64>::new("SELECT total FROM $$orders WHERE id = 1", vec![]);
    assert_eq!(db.value_of(&total)?, Some(12.5));
    Ok(())
}
