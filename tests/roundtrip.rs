//! End-to-end write/read round trip (spec.md §8 scenario 5): 4000 rows
//! across a mixed schema, written through a temp file and read back,
//! checked for row count, append order, optional-field absence, and
//! microsecond-exact timestamps.

use chrono::{TimeZone, Utc};
use parquet_core::schema::FieldDef;
use parquet_core::{Schema, Value};
use parquet_reader::Reader;
use parquet_writer::{Writer, WriterProperties};
use std::fs::File;

fn schema() -> Schema {
    Schema::build(vec![
        FieldDef::leaf("name", "UTF8"),
        FieldDef::leaf("quantity", "INT64").optional(),
        FieldDef::leaf("price", "DOUBLE"),
        FieldDef::leaf("date", "TIMESTAMP_MICROS"),
        FieldDef::leaf("in_stock", "BOOLEAN").optional(),
    ])
    .unwrap()
}

fn row(name: &str, quantity: Option<i64>, price: f64, seconds: i64, in_stock: Option<bool>) -> Value {
    let date = Utc.timestamp_opt(seconds, 0).unwrap();
    Value::record([
        ("name".to_string(), Value::from(name)),
        ("quantity".to_string(), quantity.map(Value::Int).unwrap_or(Value::Null)),
        ("price".to_string(), Value::Float(price)),
        ("date".to_string(), Value::Timestamp(date)),
        ("in_stock".to_string(), in_stock.map(Value::Bool).unwrap_or(Value::Null)),
    ])
}

#[test]
fn writes_and_reads_four_thousand_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("round_trip.parquet");

    {
        let file = File::create(&path).unwrap();
        let mut writer = Writer::new(file, schema(), WriterProperties::default()).unwrap();

        for i in 0..1000i64 {
            writer.append_row(&row("apples", Some(10), 2.6, 1 + i, Some(true))).unwrap();
            writer.append_row(&row("oranges", Some(20), 2.7, 2 + i, Some(true))).unwrap();
            writer.append_row(&row("kiwi", None, 4.2, 8 + i, Some(false))).unwrap();
            writer.append_row(&row("banana", None, 3.2, 6 + i, None)).unwrap();
        }
        writer.close().unwrap();
    }

    let file = File::open(&path).unwrap();
    let reader = Reader::open(file).unwrap();
    assert_eq!(reader.get_row_count(), 4000);

    let rows: Vec<Value> = reader.get_cursor(None).unwrap().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4000);

    assert_eq!(rows[0].field("name"), Some(&Value::from("apples")));
    assert_eq!(rows[1].field("name"), Some(&Value::from("oranges")));
    assert_eq!(rows[2].field("name"), Some(&Value::from("kiwi")));
    assert_eq!(rows[3].field("name"), Some(&Value::from("banana")));

    assert_eq!(rows[2].field("quantity"), None);
    assert_eq!(rows[3].field("quantity"), None);
    assert_eq!(rows[0].field("quantity"), Some(&Value::Int(10)));

    let Some(Value::Timestamp(date)) = rows[0].field("date") else { panic!("expected a timestamp") };
    assert_eq!(date.timestamp(), 1);
    assert_eq!(date.timestamp_subsec_micros(), 0);
}

#[test]
fn reader_projects_a_single_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("projection.parquet");

    {
        let file = File::create(&path).unwrap();
        let mut writer = Writer::new(file, schema(), WriterProperties::default()).unwrap();
        writer.append_row(&row("apples", Some(10), 2.6, 1, Some(true))).unwrap();
        writer.append_row(&row("kiwi", None, 4.2, 8, Some(false))).unwrap();
        writer.close().unwrap();
    }

    let file = File::open(&path).unwrap();
    let reader = Reader::open(file).unwrap();
    let columns = vec![vec!["name".to_string()]];
    let rows: Vec<Value> = reader.get_cursor(Some(&columns)).unwrap().map(|r| r.unwrap()).collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].field("name"), Some(&Value::from("apples")));
    assert!(rows[0].field("price").is_none());
}
