use assert_cmd::cargo::{self};
use predicates::prelude::*;
use predicates::str::contains;

const FORM: &str = r#"{
  "title": "Customer",
  "tabs": [{
    "id": "general",
    "label": "General",
    "sections": [{
      "title": "Basics",
      "fields": [
        { "name": "name", "label": "Name", "type": "text", "required": true },
        { "name": "region", "label": "Region", "type": "select" }
      ]
    }]
  }]
}"#;

#[test]
fn prints_help() {
    let mut cmd = cargo::cargo_bin_cmd!("entityform");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(contains("entityform").and(contains("--form")));
}

#[test]
fn check_accepts_valid_definition() {
    let mut cmd = cargo::cargo_bin_cmd!("entityform");
    cmd.args(["--form", FORM, "--options", r#"region=["eu","us"]"#, "--check"])
        .assert()
        .success()
        .stdout(contains("form OK: 1 tab(s), 2 field(s)"));
}

#[test]
fn rejects_unknown_field_type() {
    let form = FORM.replace(r#""type": "select""#, r#""type": "slider""#);
    let mut cmd = cargo::cargo_bin_cmd!("entityform");
    cmd.args(["--form", form.as_str(), "--check"])
        .assert()
        .failure()
        .stderr(contains("unknown field type `slider`"));
}

#[test]
fn rejects_options_for_plain_fields() {
    let mut cmd = cargo::cargo_bin_cmd!("entityform");
    cmd.args(["--form", FORM, "--options", r#"name=["a"]"#, "--check"])
        .assert()
        .failure()
        .stderr(contains("does not take an option list"));
}

#[test]
fn rejects_unknown_start_tab() {
    let mut cmd = cargo::cargo_bin_cmd!("entityform");
    cmd.args(["--form", FORM, "--tab", "billing", "--check"])
        .assert()
        .failure()
        .stderr(contains("no tab with id `billing`"));
}
