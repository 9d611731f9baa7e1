use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn nfw_sheet() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nfw-sheet"));
    cmd.env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn path_as_str(path: &Path) -> &str {
    path.to_str().expect("utf8 path")
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("artifact");
    serde_json::from_str(&raw).expect("json artifact")
}

#[test]
fn import_writes_seven_artifacts() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&fixture("fixtures/workbook"))])
        .args(["--output", path_as_str(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "import_summary rules=3 address_lists=2 url_lists=2 services=3 service_groups=1 applications=2 application_groups=1 diagnostics=0",
        ))
        .stdout(predicate::str::contains("diagnostics\n- none"));

    for file in [
        "securityrules.json",
        "iplist.json",
        "url_lists.json",
        "service_input.json",
        "service_list_input.json",
        "application_input.json",
        "application_list_input.json",
    ] {
        assert!(out.join(file).is_file(), "{file} missing");
    }
}

#[test]
fn import_resolves_addresses_and_chains_positions() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&fixture("fixtures/workbook"))])
        .args(["--output", path_as_str(&out)])
        .assert()
        .success();

    let rules = read_json(&out.join("securityrules.json"));
    assert_eq!(rules[0]["name"], "allow-web");
    assert_eq!(rules[0]["position"], json!({}));
    assert_eq!(rules[0]["condition"]["sourceAddress"], json!(["office"]));
    assert_eq!(rules[1]["position"], json!({"afterRule": "allow-web"}));
    assert_eq!(rules[1]["action"], "ALLOW");
    assert_eq!(
        rules[1]["condition"]["sourceAddress"],
        json!(["office", "192.168.50.10"])
    );
    assert_eq!(rules[1]["condition"]["destinationAddress"], json!([]));
    assert_eq!(rules[2]["position"], json!({"afterRule": "allow-dns"}));
    assert_eq!(rules[2]["action"], "REJECT");
}

#[test]
fn import_regroups_url_rows_and_decodes_service_sheet() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&fixture("fixtures/workbook"))])
        .args(["--output", path_as_str(&out)])
        .assert()
        .success();

    assert_eq!(
        read_json(&out.join("url_lists.json"))[0],
        json!({"name": "allowed-sites", "urls": [
            {"pattern": "*.example.com", "type": "SIMPLE"},
            {"pattern": "docs.example.org", "type": "SIMPLE"}
        ]})
    );
    assert_eq!(
        read_json(&out.join("service_input.json"))[0],
        json!({"name": "web-tcp", "type": "TCP_SERVICE", "portRanges": [
            {"minimumPort": 80, "maximumPort": 80},
            {"minimumPort": 443, "maximumPort": 443}
        ]})
    );
    assert_eq!(
        read_json(&out.join("application_input.json"))[1],
        json!({"name": "unreachable", "type": "ICMP", "icmpType": 3, "icmpCode": null})
    );
    assert_eq!(
        read_json(&out.join("application_list_input.json")),
        json!([{"name": "icmp-basic", "apps": ["ping", "unreachable"]}])
    );
}

#[test]
fn import_reports_row_diagnostics_and_still_writes() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&fixture("fixtures/workbook-diagnostics"))])
        .args(["--output", path_as_str(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains("diagnostics=2"))
        .stdout(predicate::str::contains("- [port_count_mismatch] service:2 web-tcp"))
        .stdout(predicate::str::contains("- [unknown_group_member] service:4 web-svcs"));

    assert_eq!(
        read_json(&out.join("service_list_input.json")),
        json!([{"name": "web-svcs", "services": ["dns"]}])
    );
}

#[test]
fn import_strict_fails_after_writing_artifacts() {
    let dir = tempdir().expect("tempdir");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&fixture("fixtures/workbook-diagnostics"))])
        .args(["--output", path_as_str(&out), "--strict"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "import failed in strict mode: 2 diagnostics",
        ));

    assert!(out.join("securityrules.json").is_file());
}

#[test]
fn import_missing_sheet_writes_nothing() {
    let dir = tempdir().expect("tempdir");
    let book = dir.path().join("book");
    fs::create_dir_all(&book).expect("mkdir");
    fs::write(book.join("iplist.csv"), "name,addresses\noffice,10.0.0.1\n").expect("write");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&book)])
        .args(["--output", path_as_str(&out)])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "required sheet 'security-rules' not found",
        ));

    assert!(!out.exists());
}

#[test]
fn import_missing_required_column_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let book = dir.path().join("book");
    fs::create_dir_all(&book).expect("mkdir");
    for sheet in ["security-rules", "iplist", "url_lists"] {
        fs::copy(
            fixture(&format!("fixtures/workbook/{sheet}.csv")),
            book.join(format!("{sheet}.csv")),
        )
        .expect("copy sheet");
    }
    fs::write(book.join("service.csv"), "name,minimumPort\nweb,80\n").expect("write");

    nfw_sheet()
        .args(["import", path_as_str(&book)])
        .args(["--output", path_as_str(&dir.path().join("artifacts"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "sheet 'service' is missing required column 'type'",
        ));
}

#[test]
fn import_renamed_action_column_is_fatal() {
    let dir = tempdir().expect("tempdir");
    let book = dir.path().join("book");
    fs::create_dir_all(&book).expect("mkdir");
    for sheet in ["iplist", "url_lists", "service"] {
        fs::copy(
            fixture(&format!("fixtures/workbook/{sheet}.csv")),
            book.join(format!("{sheet}.csv")),
        )
        .expect("copy sheet");
    }
    fs::write(
        book.join("security-rules.csv"),
        "name,Source Address Lists,Destination Address Lists,Service Lists,Application Lists,Url Lists,Verdict\nr1,,,,,,DROP\n",
    )
    .expect("write");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["import", path_as_str(&book)])
        .args(["--output", path_as_str(&out)])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "sheet 'security-rules' is missing required column 'Action'",
        ));

    assert!(!out.exists());
}

#[test]
fn import_collision_policy_comes_from_config() {
    let dir = tempdir().expect("tempdir");
    let book = dir.path().join("book");
    fs::create_dir_all(&book).expect("mkdir");
    for sheet in ["url_lists", "service"] {
        fs::copy(
            fixture(&format!("fixtures/workbook/{sheet}.csv")),
            book.join(format!("{sheet}.csv")),
        )
        .expect("copy sheet");
    }
    fs::write(
        book.join("iplist.csv"),
        "name,addresses\nfirst,10.0.0.1\nsecond,10.0.0.1\n",
    )
    .expect("write");
    fs::write(
        book.join("security-rules.csv"),
        "name,Source Address Lists,Destination Address Lists,Service Lists,Application Lists,Url Lists,Action\nr1,10.0.0.1,,,,,\n",
    )
    .expect("write");
    let config = dir.path().join("nfw.toml");
    fs::write(&config, "[resolver]\ncollision = \"last-seen\"\n").expect("write config");
    let out = dir.path().join("artifacts");

    nfw_sheet()
        .args(["--config", path_as_str(&config)])
        .args(["import", path_as_str(&book)])
        .args(["--output", path_as_str(&out)])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- 10.0.0.1 owned by second (also in first)",
        ));

    let rules = read_json(&out.join("securityrules.json"));
    assert_eq!(rules[0]["condition"]["sourceAddress"], json!(["second"]));
}

#[test]
fn import_rejects_unknown_config_key() {
    let dir = tempdir().expect("tempdir");
    let config = dir.path().join("nfw.toml");
    fs::write(&config, "[sheets]\nrulez = \"x\"\n").expect("write config");

    nfw_sheet()
        .args(["--config", path_as_str(&config)])
        .args(["import", path_as_str(&fixture("fixtures/workbook"))])
        .args(["--output", path_as_str(&dir.path().join("artifacts"))])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
