// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

const RESPONSE: &str = r#"{
    "sql": "SELECT region, month, revenue FROM sales",
    "results": [
        {"region": "North", "month": "Feb 2024", "revenue": 7},
        {"region": "North", "month": "Jan 2024", "revenue": 10},
        {"region": "South", "month": "Jan 2024", "revenue": 5}
    ]
}"#;

fn demo() -> Command {
    let mut cmd = Command::cargo_bin("axial-chart-demo").unwrap();
    cmd.env_remove("AXIAL_CONFIG");
    cmd
}

#[test]
fn prints_pivoted_plan_from_stdin() {
    let output = demo().write_stdin(RESPONSE).assert().success().get_output().stdout.clone();
    let plan: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(plan["resolution"]["xAxis"], "month");
    assert_eq!(plan["resolution"]["series"], "region");
    assert_eq!(plan["series"], serde_json::json!(["North", "South"]));
    assert_eq!(plan["data"][0]["month"], "Jan 2024");
    assert_eq!(plan["data"][0]["South"], 5);
}

#[test]
fn reads_input_file_and_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RESPONSE.as_bytes()).unwrap();
    demo()
        .arg("--input")
        .arg(file.path())
        .args(["--x-key", "region"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""xAxis":"region""#))
        .stdout(predicate::str::contains(r#""isMultiSeries":true"#))
        .stdout(predicate::str::contains(r#""series":[]"#));
}

#[test]
fn unresolved_result_is_reported_but_not_an_error() {
    demo()
        .write_stdin(r#"{"sql": "", "results": [{"name": "a"}]}"#)
        .assert()
        .success()
        .stderr(predicate::str::contains("Cannot chart this result."));
}

#[test]
fn malformed_body_fails() {
    demo().write_stdin(r#"{"results": 3}"#).assert().failure();
}
