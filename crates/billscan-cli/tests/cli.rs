use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE_TEXT: &str = "\
TAX INVOICE
BILL TO / SHIP TO Jane Doe - 12 Palm St, Green Park, Mumbai, Maharashtra, 400001
Order No. 123456789012345
Invoice No. INV-001
Invoice Date: 18/07/2025
Description HSN Qty
StyleStole Free Size 2 Red 123456789012345_1
Total Rs.598
";

/// Command isolated from any user config.
fn billscan(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("billscan").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home)
        .env("NO_COLOR", "1");
    cmd
}

fn write_invoice(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn process_text_file_as_json() {
    let dir = TempDir::new().unwrap();
    let input = write_invoice(dir.path(), "invoice.txt", INVOICE_TEXT);

    billscan(dir.path())
        .args(["process", input.to_str().unwrap(), "--reference-date", "2025-07-20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"order_number\": \"123456789012345\""))
        .stdout(predicate::str::contains("Jane Doe"))
        .stdout(predicate::str::contains("StyleStole"));
}

#[test]
fn process_csv_has_row_per_item() {
    let dir = TempDir::new().unwrap();
    let input = write_invoice(dir.path(), "invoice.txt", INVOICE_TEXT);

    let output = billscan(dir.path())
        .args(["process", input.to_str().unwrap(), "-f", "csv"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("order_number,invoice_id,order_date"));
    assert!(lines[1].starts_with("123456789012345,INV-001,18.07.2025,Jane Doe"));
    assert!(lines[1].contains("StyleStole"));
}

#[test]
fn process_writes_output_file() {
    let dir = TempDir::new().unwrap();
    let input = write_invoice(dir.path(), "invoice.txt", INVOICE_TEXT);
    let output = dir.path().join("orders.txt");

    billscan(dir.path())
        .args(["process", input.to_str().unwrap(), "-f", "text", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"));

    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("Order: 123456789012345"));
    assert!(written.contains("Total: Rs. 598"));
}

#[test]
fn process_reports_store_summary() {
    let dir = TempDir::new().unwrap();
    let input = write_invoice(dir.path(), "invoice.txt", INVOICE_TEXT);

    billscan(dir.path())
        .args(["process", input.to_str().unwrap(), "--store", "--owner", "seller-1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Stored 1 orders, skipped 0 duplicates"));
}

#[test]
fn process_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    billscan(dir.path())
        .args(["process", "does-not-exist.pdf"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_text_without_marker_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_invoice(dir.path(), "notes.txt", "just some notes\nwith no invoices\n");

    billscan(dir.path())
        .args(["process", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no 'TAX INVOICE' sections found"));
}

#[test]
fn process_custom_marker() {
    let dir = TempDir::new().unwrap();
    let text = INVOICE_TEXT.replace("TAX INVOICE", "BILL OF SUPPLY");
    let input = write_invoice(dir.path(), "invoice.txt", &text);

    billscan(dir.path())
        .args(["process", input.to_str().unwrap(), "--marker", "BILL OF SUPPLY"])
        .assert()
        .success()
        .stdout(predicate::str::contains("123456789012345"));
}

#[test]
fn process_unsupported_extension_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_invoice(dir.path(), "invoice.docx", INVOICE_TEXT);

    billscan(dir.path())
        .args(["process", input.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn batch_continues_on_error_and_writes_summary() {
    let dir = TempDir::new().unwrap();
    let inputs = dir.path().join("in");
    fs::create_dir_all(&inputs).unwrap();
    write_invoice(&inputs, "a.txt", INVOICE_TEXT);
    write_invoice(&inputs, "b.txt", "nothing to see here");
    let out = dir.path().join("out");
    let pattern = inputs.join("*.txt");

    billscan(dir.path())
        .args(["batch", pattern.to_str().unwrap(), "--continue-on-error", "--summary", "-j", "2"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 files"))
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a.json").exists());
    assert!(!out.join("b.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let lines: Vec<&str> = summary.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("a.txt,success,1,1,0,1,"));
    assert!(lines[2].starts_with("b.txt,error"));
}

#[test]
fn batch_stops_on_first_error() {
    let dir = TempDir::new().unwrap();
    write_invoice(dir.path(), "bad.txt", "nothing to see here");
    let pattern = dir.path().join("*.txt");

    billscan(dir.path())
        .args(["batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn batch_store_skips_duplicates_across_files() {
    let dir = TempDir::new().unwrap();
    write_invoice(dir.path(), "a.txt", INVOICE_TEXT);
    write_invoice(dir.path(), "b.txt", INVOICE_TEXT);
    let pattern = dir.path().join("*.txt");

    billscan(dir.path())
        .args(["batch", pattern.to_str().unwrap(), "--store"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 orders stored, 1 duplicates skipped"));
}

#[test]
fn batch_reference_date_resolves_ambiguous_dates() {
    let dir = TempDir::new().unwrap();
    let text = INVOICE_TEXT.replace("18/07/2025", "05/07/2025");
    write_invoice(dir.path(), "a.txt", &text);
    let pattern = dir.path().join("*.txt");
    let out = dir.path().join("out");

    billscan(dir.path())
        .args(["batch", pattern.to_str().unwrap(), "-f", "csv", "--reference-date", "2025-05-08"])
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success();

    let written = fs::read_to_string(out.join("a.csv")).unwrap();
    assert!(written.contains("123456789012345,INV-001,07.05.2025"));
}

#[test]
fn batch_no_matches_fails() {
    let dir = TempDir::new().unwrap();
    let pattern = dir.path().join("*.pdf");

    billscan(dir.path())
        .args(["batch", pattern.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files found"));
}

#[test]
fn config_init_then_get_and_set() {
    let dir = TempDir::new().unwrap();

    billscan(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created configuration file"));

    billscan(dir.path())
        .args(["config", "get", "extraction.invoice_marker"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TAX INVOICE"));

    billscan(dir.path())
        .args(["config", "set", "store.owner", "seller-9"])
        .assert()
        .success();

    billscan(dir.path())
        .args(["config", "get", "store.owner"])
        .assert()
        .success()
        .stdout(predicate::str::contains("seller-9"));

    billscan(dir.path())
        .args(["config", "set", "store.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

#[test]
fn config_path_points_into_billscan_dir() {
    let dir = TempDir::new().unwrap();

    billscan(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("billscan"))
        .stdout(predicate::str::contains("not created"));
}
