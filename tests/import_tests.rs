//! Integration tests for JSON Lines bulk import using Testcontainers.

mod common;

use common::TestDeployment;
use common::fixtures::write_colors;
use mongo_tour::Error;
use mongodb::bson::doc;

const COLLECTION: &str = "colors";

/// Every line of the palette becomes one document.
#[test]
fn test_import_colors() {
    let mongo = TestDeployment::start();
    let db = mongo.db_name("test_db");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("colors.json");
    write_colors(&path, 12);

    let inserted =
        mongo.manager.import_json_lines(&mongo.client, &db, COLLECTION, &path).expect("import");
    assert_eq!(inserted, 12);

    let count =
        mongo.manager.count_documents(&mongo.client, &db, COLLECTION, doc! {}).expect("count");
    assert_eq!(count, 12);

    let red = mongo
        .manager
        .count_documents(&mongo.client, &db, COLLECTION, doc! { "color": "color_1" })
        .expect("count");
    assert_eq!(red, 1);
}

/// An empty file imports nothing and creates nothing.
#[test]
fn test_import_empty_file() {
    let mongo = TestDeployment::start();
    let db = mongo.db_name("test_db");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("colors.json");
    std::fs::write(&path, "\n\n").expect("write");

    let inserted =
        mongo.manager.import_json_lines(&mongo.client, &db, COLLECTION, &path).expect("import");
    assert_eq!(inserted, 0);

    let collections = mongo.manager.list_collections(&mongo.client, &db).expect("list");
    assert!(collections.is_empty());
}

/// A malformed line aborts the import before anything is written.
#[test]
fn test_import_malformed_line_inserts_nothing() {
    let mongo = TestDeployment::start();
    let db = mongo.db_name("test_db");
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("colors.json");
    let content = "{\"color\": \"red\"}\n{\"color\": \"green\"}\nnot json\n";
    std::fs::write(&path, content).expect("write");

    let result = mongo.manager.import_json_lines(&mongo.client, &db, COLLECTION, &path);
    match result {
        Err(Error::Parse(msg)) => assert!(msg.contains("line 3"), "unexpected message: {msg}"),
        other => panic!("expected parse error, got {other:?}"),
    }

    let count =
        mongo.manager.count_documents(&mongo.client, &db, COLLECTION, doc! {}).expect("count");
    assert_eq!(count, 0);
}
