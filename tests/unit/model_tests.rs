//! Model files

use std::io::Write;

use pretty_assertions::assert_eq;
use rust_aseddl::model::{read_database, write_database};
use rust_aseddl::TypeCode;
use tempfile::NamedTempFile;

use crate::common::load_fixture;

#[test]
fn test_read_fixture() {
    let db = load_fixture("inventory_current.xml");
    assert_eq!(db.name, "inventory");
    assert_eq!(db.tables.len(), 3);

    let item = db.find_table("item", false).unwrap();
    assert_eq!(item.primary_key, vec!["Id"]);
    assert_eq!(item.columns[2].default_value.as_deref(), Some("0"));
    assert_eq!(item.foreign_keys[0].on_delete.as_deref(), Some("cascade"));
    assert_eq!(item.indices[0].columns, vec!["Label"]);
    assert!(db.tables[0].columns[0].auto_increment);
}

#[test]
fn test_windows_1252_model_is_decoded() {
    let mut file = NamedTempFile::new().unwrap();
    let mut bytes = b"<database name=\"caf".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(
        b"\"><table name=\"T\"><column name=\"a\" type=\"INTEGER\"/></table></database>",
    );
    file.write_all(&bytes).unwrap();

    let db = read_database(file.path()).unwrap();
    assert_eq!(db.name, "caf\u{e9}");
    assert_eq!(db.tables[0].columns[0].type_code, TypeCode::Integer);
}

#[test]
fn test_missing_file_is_reported() {
    let err = read_database(std::path::Path::new("does/not/exist.xml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read model file"));
}

#[test]
fn test_written_fixture_reads_back() {
    let db = load_fixture("inventory_desired.xml");
    let file = NamedTempFile::new().unwrap();
    write_database(&db, file.path()).unwrap();
    assert_eq!(read_database(file.path()).unwrap(), db);
}
