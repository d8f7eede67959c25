use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const GENERATED: &str = r#"package gql

import "context"

type ResolverRoot interface {
	Query() QueryResolver
}

type QueryResolver interface {
	Todos(ctx context.Context) ([]*Todo, error)
}

type Todo struct {
	ID string
}
"#;

const BASE: &str = r#"package resolver

import "example.com/app/gql"

type Resolver struct{}

func (r *Resolver) Query() gql.QueryResolver {
	return &queryResolver{r}
}

type queryResolver struct{ *Resolver }
"#;

fn workspace() -> (TempDir, PathBuf, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let gql = tmp.path().join("gql");
    let resolver = tmp.path().join("resolver");
    fs::create_dir_all(&gql).unwrap();
    fs::create_dir_all(&resolver).unwrap();
    fs::write(gql.join("generated.go"), GENERATED).unwrap();
    fs::write(resolver.join("base.go"), BASE).unwrap();
    (tmp, gql, resolver)
}

fn resync(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("resync").unwrap();
    cmd.current_dir(cwd).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

#[test]
fn dry_run_reports_files_and_writes_nothing() {
    let (tmp, gql, resolver) = workspace();
    resync(tmp.path())
        .args(["sync", "--dry-run", "--no-format", "--contracts"])
        .arg(&gql)
        .arg("--impl")
        .arg(&resolver)
        .assert()
        .success()
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("query_todos.go"));
    assert!(!resolver.join("query_todos.go").exists());
}

#[test]
fn sync_generates_stub_and_check_passes_afterwards() {
    let (tmp, gql, resolver) = workspace();
    resync(tmp.path())
        .args(["sync", "--no-format", "--contracts"])
        .arg(&gql)
        .arg("--impl")
        .arg(&resolver)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 generated"));

    let stub = fs::read_to_string(resolver.join("query_todos.go")).unwrap();
    assert!(stub.contains(
        "func (r *queryResolver) Todos(ctx context.Context) (result []*gql.Todo, err error) {"
    ));

    resync(tmp.path())
        .args(["check", "--contracts"])
        .arg(&gql)
        .arg("--impl")
        .arg(&resolver)
        .assert()
        .success()
        .stdout(predicate::str::contains("up to date"));
}

#[test]
fn check_fails_when_out_of_date() {
    let (tmp, gql, resolver) = workspace();
    resync(tmp.path())
        .args(["check", "--contracts"])
        .arg(&gql)
        .arg("--impl")
        .arg(&resolver)
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing"))
        .stderr(predicate::str::contains("out of date"));
}

#[test]
fn check_json_lists_actions() {
    let (tmp, gql, resolver) = workspace();
    let output = resync(tmp.path())
        .args(["check", "--json", "--contracts"])
        .arg(&gql)
        .arg("--impl")
        .arg(&resolver)
        .output()
        .unwrap();
    assert!(!output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["up_to_date"], false);
    let actions = json["actions"].as_array().unwrap();
    assert!(actions
        .iter()
        .any(|a| a["method"] == "Todos" && a["kind"] == "generated"));
    assert!(actions
        .iter()
        .any(|a| a["method"] == "Query" && a["kind"] == "match"));
}

#[test]
fn diff_prints_unified_diff() {
    let (tmp, gql, resolver) = workspace();
    resync(tmp.path())
        .args(["diff", "--no-format", "--contracts"])
        .arg(&gql)
        .arg("--impl")
        .arg(&resolver)
        .assert()
        .success()
        .stdout(predicate::str::contains("+++ b/query_todos.go"))
        .stdout(predicate::str::contains("+\tpanic(\"not implemented\")"));
    assert!(!resolver.join("query_todos.go").exists());
}

#[test]
fn config_file_in_working_directory_is_used() {
    let (tmp, _gql, resolver) = workspace();
    fs::write(
        tmp.path().join("resync.yaml"),
        "contracts: gql\nimplementation: resolver\nformatter:\n  enabled: false\n",
    )
    .unwrap();
    resync(tmp.path()).arg("sync").assert().success();
    assert!(resolver.join("query_todos.go").exists());
}

#[test]
fn missing_contract_directory_is_an_error() {
    let (tmp, _gql, resolver) = workspace();
    resync(tmp.path())
        .args(["sync", "--no-format", "--contracts", "does-not-exist", "--impl"])
        .arg(&resolver)
        .assert()
        .failure()
        .stderr(predicate::str::contains("sync failed"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let (tmp, _gql, _resolver) = workspace();
    fs::write(tmp.path().join("resync.yaml"), "contract: gql\n").unwrap();
    resync(tmp.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("resync.yaml"));
}
