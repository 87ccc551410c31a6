//! CLI integration tests
//!
//! These tests run the deadsharp binary against scratch projects and check
//! its output, exit codes and the files it rewrites.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const PROGRAM: &str = "using System;\nusing System.Linq;\n\nnamespace Demo\n{\n    class Program\n    {\n        static void Main() { Console.WriteLine(1); }\n        private void Foo() { }\n    }\n}\n";

/// A one-project workspace; returns the directory and the project path
fn scratch() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("Demo");
    std::fs::create_dir_all(&app).unwrap();
    let project = app.join("Demo.csproj");
    std::fs::write(&project, r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#).unwrap();
    std::fs::write(app.join("Program.cs"), PROGRAM).unwrap();
    (dir, project)
}

fn deadsharp() -> Command {
    Command::cargo_bin("deadsharp").unwrap()
}

fn json_output(project: &Path, extra: &[&str]) -> serde_json::Value {
    let output = deadsharp()
        .arg(project)
        .args(["--format", "json", "--quiet"])
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_help() {
    deadsharp()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--fix-usings"))
        .stdout(predicate::str::contains("--exclude-public"));
}

#[test]
fn test_version() {
    deadsharp()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deadsharp"));
}

#[test]
fn test_json_report_on_stdout() {
    let (_dir, project) = scratch();
    let json = json_output(&project, &[]);

    assert_eq!(json["summary"]["unusedSymbolsCount"], 1);
    assert_eq!(json["summary"]["unusedCount"], 1);
    assert_eq!(json["summary"]["unusedUsingsCount"], 1);
    assert_eq!(json["unusedSymbols"][0]["kind"], "Method");
    assert_eq!(json["unusedSymbols"][0]["fullyQualifiedName"], "Demo.Program.Foo()");
    assert_eq!(json["unusedSymbols"][0]["lineNumber"], 9);
    assert_eq!(json["unusedUsings"][0]["namespace"], "System.Linq");
    assert_eq!(json["unusedUsings"][0]["lineNumber"], 2);
}

#[test]
fn test_json_report_to_file() {
    let (dir, project) = scratch();
    let report = dir.path().join("report.json");

    deadsharp()
        .arg(&project)
        .args(["--format", "json", "--quiet", "--output"])
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["summary"]["unusedSymbolsCount"], 1);
}

#[test]
fn test_text_report() {
    let (_dir, project) = scratch();
    deadsharp()
        .arg(&project)
        .arg("--quiet")
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unused Code Analysis Results"))
        .stdout(predicate::str::contains("Unused Methods (1)"))
        .stdout(predicate::str::contains("Demo.Program.Foo()"))
        .stdout(predicate::str::contains("using System.Linq;"));
}

#[test]
fn test_skip_usings() {
    let (_dir, project) = scratch();
    let json = json_output(&project, &["--skip-usings"]);
    assert_eq!(json["summary"]["unusedUsingsCount"], 0);
    assert_eq!(json["summary"]["unusedSymbolsCount"], 1);
}

#[test]
fn test_fix_usings_rewrites_source() {
    let (dir, project) = scratch();
    let json = json_output(&project, &["--fix-usings"]);
    assert_eq!(json["summary"]["unusedUsingsCount"], 1);

    let program = std::fs::read_to_string(dir.path().join("Demo/Program.cs")).unwrap();
    assert!(program.starts_with("using System;\n\nnamespace Demo"));

    let json = json_output(&project, &[]);
    assert_eq!(json["summary"]["unusedUsingsCount"], 0);
}

#[test]
fn test_fix_and_skip_usings_conflict() {
    let (_dir, project) = scratch();
    deadsharp()
        .arg(&project)
        .args(["--fix-usings", "--skip-usings"])
        .assert()
        .failure();
}

#[test]
fn test_exclude_public_flag() {
    let (dir, project) = scratch();
    std::fs::write(
        dir.path().join("Demo/Api.cs"),
        "namespace Demo { public class Api { public void Call() { } } }\n",
    )
    .unwrap();

    let json = json_output(&project, &[]);
    assert_eq!(json["summary"]["unusedSymbolsCount"], 1);

    let json = json_output(&project, &["--exclude-public", "false"]);
    assert_eq!(json["summary"]["unusedSymbolsCount"], 2);
}

#[test]
fn test_config_file_retains_members() {
    let (dir, project) = scratch();
    let config = dir.path().join("deadsharp.toml");
    std::fs::write(&config, "retain = [\"Foo\"]\n").unwrap();

    let output = deadsharp()
        .arg(&project)
        .args(["--format", "json", "--quiet", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["summary"]["unusedSymbolsCount"], 0);
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    deadsharp()
        .arg(dir.path().join("Missing.sln"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing.sln"));
}

#[test]
fn test_unsupported_input_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("project.json");
    std::fs::write(&path, "{}").unwrap();

    deadsharp()
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("project.json"));
}
