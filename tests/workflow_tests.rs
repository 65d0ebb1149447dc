//! End-to-end runs of the full tour against a Testcontainers deployment.

mod common;

use common::TestDeployment;
use common::fixtures::{write_colors, write_image};
use mongo_tour::workflow::StepOutcome;
use mongo_tour::{ConnectionManager, TourConfig, WorkflowReport, run_tour};
use mongodb::bson::doc;

fn message<'a>(report: &'a WorkflowReport, step: &str) -> &'a str {
    report.step(step).unwrap_or_else(|| panic!("step {step} missing")).outcome.message()
}

/// Every step completes and leaves the expected data behind.
#[test]
fn test_full_tour() {
    let mongo = TestDeployment::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = mongo.tour_config(dir.path());
    let image = write_image(&config.files.upload_path, 3 * 1024 * 1024);
    write_colors(&config.files.import_path, 8);

    let report = run_tour(&mongo.manager, &config).expect("tour failed to start");

    for step in &report.steps {
        assert!(matches!(step.outcome, StepOutcome::Completed(_)), "step did not complete: {step}");
    }
    assert_eq!(report.steps.len(), 23);
    assert_eq!(report.steps[0].name, "connect");
    assert!(report.is_success());

    assert_eq!(message(&report, "insert many"), "Inserted 2 document(s)");
    assert_eq!(message(&report, "find"), "Found 2 document(s) named Ivan Tsygan");
    assert_eq!(
        message(&report, "find with projection"),
        "Projected 2 document(s) onto firstname, lastname"
    );
    assert!(message(&report, "aggregate").contains("user_2"));
    assert_eq!(message(&report, "update many"), "Matched 3 document(s), modified 2 document(s)");
    assert_eq!(message(&report, "replace one"), "Replaced 1 of 1 matched document(s)");
    assert_eq!(message(&report, "delete many"), "Deleted 1 document(s)");
    assert_eq!(message(&report, "drop user"), "User superAdmin did not exist");
    let collections = format!("Collections in {}: [users]", config.database);
    assert_eq!(message(&report, "list collections"), collections);
    assert_eq!(message(&report, "create index"), "Created index login_1");
    let indexes = message(&report, "list indexes");
    assert!(indexes.contains(r#"login_1 {"login":1}"#), "index keys not shown: {indexes}");
    assert!(indexes.contains(r#"_id_ {"_id":1}"#), "index keys not shown: {indexes}");
    assert_eq!(message(&report, "drop index"), "Dropped index login_1");
    assert!(message(&report, "bulk import").starts_with("Inserted 8 document(s)"));

    let uploaded = message(&report, "upload file")
        .strip_prefix("Uploaded oldImage.jpg as ")
        .expect("upload summary")
        .to_string();
    let metadata = message(&report, "file metadata");
    assert!(metadata.starts_with("1 revision(s) of oldImage.jpg"), "{metadata}");
    let latest = format!("latest {uploaded} is {} bytes", image.len());
    assert!(metadata.contains(&latest), "{metadata}");

    assert_eq!(std::fs::read(&config.files.download_path).expect("download missing"), image);

    let users = mongo
        .manager
        .count_documents(&mongo.client, &config.database, &config.collection, doc! {})
        .expect("count users");
    assert_eq!(users, 2);
    let replaced = mongo
        .manager
        .count_documents(
            &mongo.client,
            &config.database,
            &config.collection,
            doc! { "login": { "$exists": false } },
        )
        .expect("count replaced");
    assert_eq!(replaced, 1);

    let files = mongo
        .manager
        .find_files(&mongo.client, &config.database, &config.files.bucket, doc! {})
        .expect("find files");
    assert!(files.is_empty());

    let indexes = mongo
        .manager
        .list_indexes(&mongo.client, &config.database, &config.collection)
        .expect("list indexes");
    assert_eq!(indexes.len(), 1);
}

/// A second run finds the user from the first and drops it before recreating.
#[test]
fn test_tour_is_rerunnable() {
    let mongo = TestDeployment::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = mongo.tour_config(dir.path());
    write_image(&config.files.upload_path, 2048);
    write_colors(&config.files.import_path, 3);

    let first = run_tour(&mongo.manager, &config).expect("first run");
    assert!(first.is_success());

    let second = run_tour(&mongo.manager, &config).expect("second run");
    assert!(second.is_success(), "{}", second.summary_line());
    assert_eq!(message(&second, "drop user"), "Dropped user superAdmin");
}

/// Missing local files fail the file steps without stopping the rest.
#[test]
fn test_missing_upload_skips_dependent_steps() {
    let mongo = TestDeployment::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = mongo.tour_config(dir.path());
    write_colors(&config.files.import_path, 2);

    let report = run_tour(&mongo.manager, &config).expect("tour failed to start");

    assert!(matches!(report.step("upload file").unwrap().outcome, StepOutcome::Failed(_)));
    assert!(matches!(report.step("file metadata").unwrap().outcome, StepOutcome::Skipped(_)));
    assert!(matches!(report.step("download file").unwrap().outcome, StepOutcome::Skipped(_)));
    assert!(matches!(report.step("delete file").unwrap().outcome, StepOutcome::Skipped(_)));
    assert!(matches!(report.step("bulk import").unwrap().outcome, StepOutcome::Completed(_)));
    assert!(!report.is_success());
}

/// With stop_on_error the run ends at the first failure.
#[test]
fn test_stop_on_error_halts_tour() {
    let mongo = TestDeployment::start();
    let dir = tempfile::tempdir().expect("tempdir");
    let config = TourConfig { stop_on_error: true, ..mongo.tour_config(dir.path()) };

    let report = run_tour(&mongo.manager, &config).expect("tour failed to start");

    assert_eq!(report.steps.last().unwrap().name, "upload file");
    assert_eq!(report.failed(), 1);
    assert!(report.step("create index").is_none());
}

/// An unreachable server fails the run before any step.
#[test]
fn test_unreachable_server_is_an_error() {
    let manager = ConnectionManager::new().expect("manager");
    let config = TourConfig {
        uri: "mongodb://127.0.0.1:1/?connectTimeoutMS=500".to_string(),
        server_selection_timeout_secs: 1,
        ..Default::default()
    };

    assert!(run_tour(&manager, &config).is_err());
}
