mod common;

use std::sync::{Arc, Mutex};

use common::database;
use sql_typegen::prelude::*;
use sql_typegen::schema::{ProgressIndicator, SchemaOptions, VersionIndeterminate};

#[derive(Debug, Default)]
struct Recorder {
    steps: usize,
    messages: Vec<(usize, String)>,
}

impl ProgressIndicator for Recorder {
    fn initialise(&mut self, steps: usize) {
        self.steps = steps;
    }

    fn move_to(&mut self, step: usize, message: &str) {
        self.messages.push((step, message.to_string()));
    }

    fn value(&self) -> usize {
        self.messages.last().map_or(0, |(step, _)| *step)
    }
}

fn record(
    applied: &Arc<Mutex<Vec<i64>>>,
    n: i64,
) -> impl Fn(&Xact<'_>) -> Result<(), SqlTypegenError> + Send + Sync + 'static {
    let applied = Arc::clone(applied);
    move |xact| {
        applied.lock().unwrap().push(n);
        xact.update(&Update::new("INSERT INTO $$log VALUES (?)", vec![n.into()]))?;
        Ok(())
    }
}

fn orders_schema(db: &Database) -> SqlSchema<'_> {
    SqlSchema::new(db)
        .create(|xact| xact.execute_batch("CREATE TABLE $$orders (id INTEGER PRIMARY KEY)"))
        .update(|xact| xact.execute_batch("ALTER TABLE $$orders ADD COLUMN customer TEXT"))
        .update(|xact| xact.execute_batch("ALTER TABLE $$orders ADD COLUMN total REAL"))
}

#[test]
fn fresh_database_is_created_and_updated() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, db) = database("")?;
    let schema = orders_schema(&db);
    assert_eq!(schema.get_version(), Version::NoVersionTable);

    let mut progress = Recorder::default();
    let version = schema.setup(&mut progress)?;
    assert_eq!(version, VersionNumber(2));
    assert_eq!(schema.get_version(), Version::Known(VersionNumber(2)));
    assert_eq!(progress.steps, 3);
    assert_eq!(progress.value(), 3);
    assert_eq!(progress.messages[0].1, "creating schema");
    assert_eq!(progress.messages[2].1, "updating schema to v2");

    db.update(&Update::new(
        "INSERT INTO $$orders (id, customer, total) VALUES (1, 'a', 2.5)",
        vec![],
    ))?;
    Ok(())
}

#[test]
fn setup_resumes_from_the_stored_version() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, db) = database("")?;
    let applied = Arc::new(Mutex::new(Vec::new()));

    let first = SqlSchema::new(&db)
        .create(|xact| xact.execute_batch("CREATE TABLE $$log (n INTEGER)"))
        .update(|xact| xact.execute_batch("INSERT INTO $$log VALUES (1)"));
    assert_eq!(first.setup(&mut NoProgress::default())?, VersionNumber(1));

    let second = SqlSchema::new(&db)
        .update(record(&applied, 1))
        .update(record(&applied, 2))
        .update(record(&applied, 3));
    assert_eq!(second.setup(&mut NoProgress::default())?, VersionNumber(3));
    assert_eq!(*applied.lock().unwrap(), vec![2, 3]);

    // Already current: nothing runs.
    assert_eq!(second.setup(&mut NoProgress::default())?, VersionNumber(3));
    assert_eq!(applied.lock().unwrap().len(), 2);
    Ok(())
}

#[test]
fn failed_update_stops_at_last_good_version() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, db) = database("")?;
    let schema = SqlSchema::new(&db)
        .create(|xact| xact.execute_batch("CREATE TABLE $$t (a INTEGER)"))
        .update(|xact| xact.execute_batch("ALTER TABLE $$t ADD COLUMN b INTEGER"))
        .update(|xact| xact.execute_batch("ALTER TABLE $$missing ADD COLUMN c INTEGER"))
        .update(|xact| xact.execute_batch("ALTER TABLE $$t ADD COLUMN d INTEGER"));

    let failure = schema.setup(&mut NoProgress::default()).unwrap_err();
    assert_eq!(failure.last_version, Some(VersionNumber(1)));
    assert!(failure.to_string().contains("stopped at v1"), "{failure}");
    assert_eq!(schema.get_version(), Version::Known(VersionNumber(1)));
    Ok(())
}

#[test]
fn indeterminate_versions_are_reported() -> Result<(), Box<dyn std::error::Error>> {
    let (_dir, db) = database("app_")?;
    let options = SchemaOptions {
        version_table: "$$schema_version".to_string(),
        ..SchemaOptions::default()
    };
    let schema = SqlSchema::with_options(&db, options);

    db.execute_batch("CREATE TABLE $$schema_version (version integer)")?;
    assert_eq!(
        schema.get_version(),
        Version::Indeterminate(VersionIndeterminate::TableEmpty)
    );

    db.execute_batch("INSERT INTO $$schema_version VALUES ('abc')")?;
    assert_eq!(
        schema.get_version(),
        Version::Indeterminate(VersionIndeterminate::ValueInvalid("abc".to_string()))
    );
    assert!(schema.setup(&mut NoProgress::default()).is_err());
    Ok(())
}
