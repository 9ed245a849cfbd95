use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const BIN_NAME: &str = "pocket";

fn pocket(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("POCKETLEDGER_DATA_DIR", dir);
    cmd.env_remove("POCKETLEDGER_LOG");
    cmd
}

fn initialized() -> TempDir {
    let dir = TempDir::new().unwrap();
    pocket(dir.path()).arg("init").assert().success();
    dir
}

const IMPORT_CSV: &str = "\
date,amount,category,description,account_type,payment_method
2024-01-05,42.50,Groceries,Weekly shop,checking,debit card
2024-01-32,10.00,Groceries,Bad date,checking,cash
2024-01-09,18.00,Dining,Pizza night,credit,credit card
";

#[test]
fn commands_require_init() {
    let dir = TempDir::new().unwrap();
    pocket(dir.path())
        .args(["category", "list"])
        .assert()
        .failure()
        .stderr(contains("pocket init"));
}

#[test]
fn init_creates_default_categories() {
    let dir = initialized();
    pocket(dir.path())
        .args(["category", "list"])
        .assert()
        .success()
        .stdout(contains("Groceries").and(contains("10 categories")));

    pocket(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(contains("already initialized"));
}

#[test]
fn add_and_list_transaction() {
    let dir = initialized();
    pocket(dir.path())
        .args(["txn", "add", "12.34", "Dining", "--date", "2024-02-10", "-m", "Tacos"])
        .assert()
        .success()
        .stdout(contains("Added transaction txn-"));

    pocket(dir.path())
        .args(["txn", "list"])
        .assert()
        .success()
        .stdout(contains("Tacos").and(contains("$12.34")).and(contains("1 transaction(s)")));
}

#[test]
fn add_rejects_unknown_category() {
    let dir = initialized();
    pocket(dir.path())
        .args(["txn", "add", "5", "groceries", "--date", "2024-02-10"])
        .assert()
        .failure()
        .stderr(contains("category not found"));
}

#[test]
fn import_commits_valid_rows_and_flags_reimport() {
    let dir = initialized();
    let csv_path = dir.path().join("january.csv");
    fs::write(&csv_path, IMPORT_CSV).unwrap();

    pocket(dir.path())
        .arg("import")
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(contains("1 invalid").and(contains("Committed 2 transaction(s)")));

    pocket(dir.path())
        .arg("import")
        .arg(&csv_path)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("0 valid, 2 duplicate, 1 invalid").and(contains("Dry run")));

    pocket(dir.path())
        .args(["txn", "list", "--period", "2024-01"])
        .assert()
        .success()
        .stdout(contains("2 transaction(s)"));
}

#[test]
fn usage_report_for_month() {
    let dir = initialized();
    let csv_path = dir.path().join("january.csv");
    fs::write(&csv_path, IMPORT_CSV).unwrap();
    pocket(dir.path()).arg("import").arg(&csv_path).assert().success();

    pocket(dir.path())
        .args(["report", "usage", "--period", "2024-01"])
        .assert()
        .success()
        .stdout(contains("$42.50").and(contains("Total spent $60.50")));

    pocket(dir.path())
        .args(["report", "spending", "--period", "2024-01"])
        .assert()
        .success()
        .stdout(contains("Groceries").and(contains("Total: $60.50")));
}

#[test]
fn delete_category_in_use_needs_reassignment() {
    let dir = initialized();
    pocket(dir.path())
        .args(["txn", "add", "20", "Shopping", "--date", "2024-03-01"])
        .assert()
        .success();

    pocket(dir.path())
        .args(["category", "delete", "Shopping"])
        .assert()
        .failure()
        .stderr(contains("reassign"));

    pocket(dir.path())
        .args(["category", "delete", "Shopping", "--reassign", "Personal Care"])
        .assert()
        .success()
        .stdout(contains("moved 1 transaction(s) to 'Personal Care'"));
}

#[test]
fn clear_requires_a_range() {
    let dir = initialized();
    pocket(dir.path())
        .args(["txn", "add", "3", "Dining", "--date", "2024-03-01"])
        .assert()
        .success();

    pocket(dir.path()).args(["txn", "clear"]).assert().failure();

    pocket(dir.path())
        .args(["txn", "clear", "--all"])
        .assert()
        .success()
        .stdout(contains("Deleted 1 transaction(s)"));
}
