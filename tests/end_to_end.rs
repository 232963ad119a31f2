use std::fs;

use flatdb::{Config, Database, DbError, JsonStorage, Outcome, Value};
use serde_json::json;
use tempfile::{TempDir, tempdir};

fn config_in(dir: &TempDir) -> Config {
    Config {
        data_dir: dir.path().join("data"),
        metadata_file: dir.path().join("db_meta.json"),
        ..Config::default()
    }
}

fn read_json(path: &std::path::Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn users_scenario_on_disk() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    let mut db = Database::open(&config);

    db.execute("create_table users name:str age:int").unwrap();
    db.execute(r#"insert into users values ("Alice", 30)"#).unwrap();
    db.execute(r#"insert into users values ("Bob", 25)"#).unwrap();

    match db.execute("select from users where age = 25").unwrap() {
        Outcome::Rows { records, .. } => {
            assert_eq!(records.len(), 1);
            assert_eq!(records[0].get("name"), Some(&Value::Str("Bob".into())));
        }
        other => panic!("Expected Rows, got {other:?}"),
    }

    db.execute(r#"update users set age = 26 where name = "Bob""#).unwrap();
    db.execute(r#"delete from users where name = "Alice""#).unwrap();

    assert_eq!(
        read_json(&config.metadata_path()),
        json!({"users": {"ID": "int", "name": "str", "age": "int"}})
    );
    assert_eq!(
        read_json(&JsonStorage::from_config(&config).table_path("users")),
        json!([{"ID": 2, "name": "Bob", "age": 26}])
    );
}

#[test]
fn state_survives_reopening() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);

    {
        let mut db = Database::open(&config);
        db.execute("create_table flags label:str on:bool").unwrap();
        db.execute("insert into flags values ('dark mode', true)").unwrap();
    }

    let mut db = Database::open(&config);
    assert_eq!(
        db.execute("insert into flags values ('beta', false)").unwrap(),
        Outcome::Inserted {
            table: "flags".into(),
            id: 2
        }
    );
    assert_eq!(
        db.execute("info flags").unwrap().to_string(),
        "Table: flags\nColumns: ID:int, label:str, on:bool\nRows: 2"
    );
}

#[test]
fn corrupt_documents_read_as_empty() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    let mut db = Database::open(&config);

    db.execute("create_table users name:str").unwrap();
    db.execute("insert into users values ('Alice')").unwrap();
    fs::write(JsonStorage::from_config(&config).table_path("users"), "not json at all").unwrap();

    match db.execute("select from users").unwrap() {
        Outcome::Rows { records, .. } => assert!(records.is_empty()),
        other => panic!("Expected Rows, got {other:?}"),
    }

    fs::write(config.metadata_path(), "[1, 2").unwrap();
    assert!(matches!(
        db.execute("select from users"),
        Err(DbError::NotFound(_))
    ));
}

#[test]
fn drop_table_removes_row_document() {
    let dir = tempdir().unwrap();
    let config = config_in(&dir);
    let mut db = Database::open(&config);

    db.execute("create_table users name:str").unwrap();
    assert_eq!(read_json(&JsonStorage::from_config(&config).table_path("users")), json!([]));

    db.execute("drop_table users").unwrap();
    assert!(!JsonStorage::from_config(&config).table_path("users").exists());
    assert_eq!(read_json(&config.metadata_path()), json!({}));
}
