//! Criterion comparison of decoding rows into typed tuples vs. raw `ResultSet`
//! rows. The dataset is seeded once per run; each iteration reads it in full.

use std::hint::black_box;
use std::sync::LazyLock;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sql_typegen::prelude::*;
use tempfile::TempDir;

#[derive(Debug, Clone, Default, PartialEq)]
struct Item {
    id: Option<i32>,
    name: Option<String>,
    score: Option<f64>,
    created: Option<chrono::NaiveDateTime>,
}

static ITEM_COLUMNS: &[ColumnDescriptor] = &[
    ColumnDescriptor::new("id", HostType::Int32),
    ColumnDescriptor::new("name", HostType::Text),
    ColumnDescriptor::new("score", HostType::Float64),
    ColumnDescriptor::new("created", HostType::Timestamp),
];

impl Tuple for Item {
    const NAME: &'static str = "Item";

    fn column_descriptors() -> &'static [ColumnDescriptor] {
        ITEM_COLUMNS
    }

    fn set_field(&mut self, index: usize, value: DbValue) -> Result<(), SqlTypegenError> {
        match index {
            0 => self.id = DbScalar::decode(value)?,
            1 => self.name = DbScalar::decode(value)?,
            2 => self.score = DbScalar::decode(value)?,
            3 => self.created = DbScalar::decode(value)?,
            _ => return Err(Self::no_such_field(index)),
        }
        Ok(())
    }

    fn field(&self, index: usize) -> Option<DbValue> {
        match index {
            0 => Some(DbScalar::encode(self.id)),
            1 => Some(DbScalar::encode(self.name.clone())),
            2 => Some(DbScalar::encode(self.score)),
            3 => Some(DbScalar::encode(self.created)),
            _ => None,
        }
    }
}

struct Dataset {
    _dir: TempDir,
    database: Database,
    rows: usize,
}

fn row_count() -> usize {
    std::env::var("BENCH_ROWS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1000)
}

static DATASET: LazyLock<Dataset> = LazyLock::new(|| {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("decode.db");
    let database = Database::sqlite_builder(path.to_string_lossy())
        .build()
        .expect("open database");
    let rows = row_count();
    database
        .execute_batch(
            "CREATE TABLE items (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                score REAL,
                created TIMESTAMP
            )",
        )
        .expect("create table");
    database
        .transact(|xact| {
            for i in 0..rows {
                let id = i64::try_from(i).unwrap_or(i64::MAX);
                xact.update(&Update::new(
                    "INSERT INTO items (id, name, score, created) VALUES (?, ?, ?, ?)",
                    vec![
                        id.into(),
                        format!("item-{i}").into(),
                        (id as f64 * 0.5).into(),
                        "2024-05-01 12:30:00".into(),
                    ],
                ))?;
            }
            Ok(())
        })
        .expect("seed rows");
    Dataset {
        _dir: dir,
        database,
        rows,
    }
});

fn bench_decode(c: &mut Criterion) {
    let dataset = &*DATASET;
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(dataset.rows as u64));

    let query = Query::<Item>::new("SELECT id, name, score, created FROM items", vec![]);
    group.bench_with_input(BenchmarkId::new("typed", dataset.rows), &query, |b, query| {
        b.iter(|| {
            let list = dataset.database.query(query).expect("query");
            black_box(list.len())
        });
    });

    group.bench_function(BenchmarkId::new("raw", dataset.rows), |b| {
        b.iter(|| {
            let rows = dataset
                .database
                .query_rows("SELECT id, name, score, created FROM items", &[])
                .expect("query");
            black_box(rows.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_decode);
criterion_main!(benches);
