// CLI integration tests for both converter executables.
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;

fn narrow_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_csv2meta"))
}

fn wide_cmd() -> Command {
    Command::new(env!("CARGO_BIN_EXE_csv2meta-wide"))
}

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

fn parse_json(output: &Output) -> Value {
    let text = std::str::from_utf8(&output.stdout).expect("utf8");
    serde_json::from_str(text).expect("valid json")
}

fn run(mut cmd: Command, args: &[&str]) -> Output {
    cmd.args(args).env_remove("RUST_LOG").output().expect("run")
}

#[test]
fn narrow_conversion_matches_expected_document() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(
        temp.path(),
        "meta.csv",
        "key,info,tags\nalpha,  Hello World ,\"a,b,,c\"\n",
    );

    let output = run(narrow_cmd(), &[csv.to_str().unwrap()]);
    assert!(output.status.success());
    let expected = r#"{
    "alpha": {
        "info": "Hello World",
        "tags": [
            "a",
            "b",
            "c"
        ]
    }
}"#;
    assert_eq!(std::str::from_utf8(&output.stdout).unwrap(), expected);
    assert!(output.stderr.is_empty());
}

#[test]
fn wide_conversion_ignores_extra_columns() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(
        temp.path(),
        "meta.csv",
        "key,info,docs,repo,tags,extra\nbeta, desc , https://docs, https://repo,\"x,y\", ignored\n",
    );

    let output = run(wide_cmd(), &[csv.to_str().unwrap()]);
    assert!(output.status.success());
    let json = parse_json(&output);
    let beta = json.get("beta").expect("beta");
    assert_eq!(beta["info"], "desc");
    assert_eq!(beta["docs"], "https://docs");
    assert_eq!(beta["repo"], "https://repo");
    assert_eq!(beta["tags"], serde_json::json!(["x", "y"]));
    assert_eq!(json.as_object().unwrap().len(), 1);
}

#[test]
fn keys_are_sorted_deduplicated_and_output_is_stable() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(
        temp.path(),
        "meta.csv",
        "key,info,tags\n\
         zulu,z,\n\
         mike,old,\"m1\"\n\
         ,nokey,x\n\
         alpha,a,\"q,,r\"\n\
         mike,new,\"m2,m3\"\n\
         ünicode,ü,ß\n",
    );
    let path = csv.to_str().unwrap();

    let first = run(narrow_cmd(), &[path]);
    let second = run(narrow_cmd(), &[path]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);

    let json = parse_json(&first);
    let map = json.as_object().unwrap();
    let keys: Vec<&str> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["alpha", "mike", "zulu", "ünicode"]);
    assert_eq!(map["mike"]["info"], "new");
    assert_eq!(map["mike"]["tags"], serde_json::json!(["m2", "m3"]));
    assert_eq!(map["alpha"]["tags"], serde_json::json!(["q", "r"]));
    assert_eq!(map["zulu"]["tags"], serde_json::json!([]));

    let text = std::str::from_utf8(&first.stdout).unwrap();
    assert!(text.contains("\"ünicode\""));
    assert!(text.find("\"alpha\"").unwrap() < text.find("\"mike\"").unwrap());
}

#[test]
fn skip_past_all_rows_prints_empty_object() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(temp.path(), "meta.csv", "key,info,tags\na,b,c\n");

    let output = run(narrow_cmd(), &["--skip", "2", csv.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(output.stdout, b"{}");
}

#[test]
fn skip_zero_interprets_first_row() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(temp.path(), "meta.csv", "key,info,tags\n");

    let output = run(narrow_cmd(), &["--skip", "0", csv.to_str().unwrap()]);
    assert!(output.status.success());
    let json = parse_json(&output);
    assert_eq!(json["key"]["info"], "info");
    assert_eq!(json["key"]["tags"], serde_json::json!(["tags"]));
}

#[test]
fn short_row_exit_code_and_no_stdout() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(
        temp.path(),
        "meta.csv",
        "key,info,tags\nfine,ok,t\nbroken,only-two\n",
    );

    let output = run(narrow_cmd(), &[csv.to_str().unwrap()]);
    assert_eq!(output.status.code().unwrap(), 5);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"));
    assert!(stderr.contains("row: 2"));
}

#[test]
fn narrow_table_is_too_short_for_wide_profile() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(temp.path(), "meta.csv", "key,info,tags\na,b,c\n");

    let output = run(wide_cmd(), &[csv.to_str().unwrap()]);
    assert_eq!(output.status.code().unwrap(), 5);
    assert!(output.stdout.is_empty());
}

#[test]
fn not_found_exit_code() {
    let temp = tempfile::tempdir().expect("tempdir");
    let missing = temp.path().join("missing.csv");

    let output = run(narrow_cmd(), &[missing.to_str().unwrap()]);
    assert_eq!(output.status.code().unwrap(), 3);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing.csv"));
}

#[test]
fn usage_exit_code() {
    let missing_path = run(narrow_cmd(), &[]);
    assert_eq!(missing_path.status.code().unwrap(), 2);
    assert!(missing_path.stdout.is_empty());

    let bad_skip = run(wide_cmd(), &["--skip", "one", "meta.csv"]);
    assert_eq!(bad_skip.status.code().unwrap(), 2);
    let stderr = String::from_utf8_lossy(&bad_skip.stderr);
    assert!(stderr.contains("csv2meta-wide --help"));
}

#[test]
fn help_lists_profile_columns() {
    let output = run(wide_cmd(), &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--skip"));
    assert!(stdout.contains("key, info, docs, repo, tags"));
}

#[test]
fn blank_line_before_header_shifts_skip() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(temp.path(), "meta.csv", "\nkey,info,tags\nalpha,a,x\n");

    let output = run(narrow_cmd(), &[csv.to_str().unwrap()]);
    assert!(output.status.success());
    let json = parse_json(&output);
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(keys, ["alpha", "key"]);
}

#[test]
fn blank_line_among_data_rows_fails() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(temp.path(), "meta.csv", "key,info,tags\n\nalpha,a,x\n");

    let output = run(narrow_cmd(), &[csv.to_str().unwrap()]);
    assert_eq!(output.status.code().unwrap(), 5);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("row has 0 field(s)"));
    assert!(stderr.contains("row: 1"));
}

#[test]
fn negative_skip_skips_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = write_csv(temp.path(), "meta.csv", "key,info,tags\na,b,c\n");

    let negative = run(narrow_cmd(), &["--skip", "-1", csv.to_str().unwrap()]);
    assert!(negative.status.success());
    let zero = run(narrow_cmd(), &["--skip", "0", csv.to_str().unwrap()]);
    assert_eq!(negative.stdout, zero.stdout);
    let json = parse_json(&negative);
    assert_eq!(json.as_object().unwrap().len(), 2);
}

#[test]
fn malformed_record_reports_cause_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let csv = temp.path().join("meta.csv");
    fs::write(&csv, b"key,info,tags\nbad,\xff,x\n").expect("write csv");

    let output = run(narrow_cmd(), &[csv.to_str().unwrap()]);
    assert_eq!(output.status.code().unwrap(), 6);
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: malformed csv record\n"));
    assert_eq!(stderr.matches("invalid utf-8").count(), 1);
}
