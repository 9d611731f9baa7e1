use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use serde_json::{json, Value};
use tempfile::tempdir;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

fn run_success(args: &[&str]) -> String {
    let output = Command::new(assert_cmd::cargo::cargo_bin!("nfw-sheet"))
        .env("NO_COLOR", "1")
        .args(args)
        .output()
        .expect("command output");
    assert!(
        output.status.success(),
        "command failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn read_json(path: &Path) -> Value {
    let raw = fs::read_to_string(path).expect("artifact");
    serde_json::from_str(&raw).expect("json artifact")
}

fn sorted(value: &Value) -> Vec<String> {
    let mut items = value
        .as_array()
        .expect("array")
        .iter()
        .map(|v| v.as_str().expect("string").to_string())
        .collect::<Vec<_>>();
    items.sort();
    items
}

#[test]
fn snapshot_export_then_import_preserves_rules_and_order() {
    let dir = tempdir().expect("tempdir");
    let book = dir.path().join("book");
    let out = dir.path().join("artifacts");

    run_success(&[
        "export",
        fixture("fixtures/snapshot").to_str().expect("utf8 path"),
        "--output",
        book.to_str().expect("utf8 path"),
    ]);
    let stdout = run_success(&[
        "import",
        book.to_str().expect("utf8 path"),
        "--output",
        out.to_str().expect("utf8 path"),
    ]);
    assert!(stdout.contains("diagnostics=0"), "{stdout}");

    let rules = read_json(&out.join("securityrules.json"));
    let names = rules
        .as_array()
        .expect("rules array")
        .iter()
        .map(|r| r["name"].as_str().expect("name"))
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["allow-web", "allow-dns", "deny-ads"]);
    assert_eq!(rules[0]["position"], json!({}));
    assert_eq!(rules[1]["position"]["afterRule"], "allow-web");
    assert_eq!(rules[2]["position"]["afterRule"], "allow-dns");

    let dns = &rules[1]["condition"];
    assert_eq!(sorted(&dns["sourceAddress"]), vec!["192.168.50.10", "office"]);
    assert_eq!(sorted(&dns["service"]), vec!["dns"]);
    assert_eq!(sorted(&dns["application"]), vec!["icmp-basic"]);
    assert_eq!(sorted(&dns["url"]), vec!["allowed-sites"]);
    assert_eq!(rules[2]["action"], "REJECT");
}

#[test]
fn snapshot_export_then_import_keeps_objects_minus_singleton_groups() {
    let dir = tempdir().expect("tempdir");
    let book = dir.path().join("book");
    let out = dir.path().join("artifacts");

    run_success(&[
        "export",
        fixture("fixtures/snapshot").to_str().expect("utf8 path"),
        "--output",
        book.to_str().expect("utf8 path"),
    ]);
    run_success(&[
        "import",
        book.to_str().expect("utf8 path"),
        "--output",
        out.to_str().expect("utf8 path"),
    ]);

    assert_eq!(
        read_json(&out.join("iplist.json")),
        json!([
            {"name": "office", "type": "IP", "addresses": ["10.0.0.1", "10.0.0.2"]},
            {"name": "dmz-web", "type": "IP", "addresses": ["172.16.0.10", "172.16.0.0/28"]}
        ])
    );
    assert_eq!(
        read_json(&out.join("service_input.json"))[1],
        json!({"name": "dns", "type": "UDP_SERVICE", "portRanges": [{"minimumPort": 53, "maximumPort": 53}]})
    );
    assert_eq!(
        read_json(&out.join("service_list_input.json")),
        json!([{"name": "web-svcs", "services": ["web-tcp", "ssh"]}])
    );
    assert_eq!(
        read_json(&out.join("application_list_input.json")),
        json!([{"name": "icmp-basic", "apps": ["ping", "unreachable"]}])
    );
}

#[test]
fn workbook_import_then_reimport_is_stable() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("first");
    let second = dir.path().join("second");

    for out in [&first, &second] {
        run_success(&[
            "import",
            fixture("fixtures/workbook").to_str().expect("utf8 path"),
            "--output",
            out.to_str().expect("utf8 path"),
        ]);
    }
    for file in ["securityrules.json", "service_input.json", "url_lists.json"] {
        assert_eq!(
            fs::read_to_string(first.join(file)).expect("first"),
            fs::read_to_string(second.join(file)).expect("second"),
        );
    }
}
