//! Integration tests for the deadsharp analysis pipeline
//!
//! These tests load scratch solutions from disk and run the complete
//! pipeline: loading, indexing, reference walking, detection, using
//! analysis and fixing.

use deadsharp::analysis::Analyzer;
use deadsharp::graph::SymbolKind;
use deadsharp::{CancellationToken, Config, ImportFixer, SolutionLoader};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
    <TargetFramework>net8.0</TargetFramework>
  </PropertyGroup>
</Project>
"#;

const PROGRAM: &str = r#"using System;
using System.Linq;

namespace Demo
{
    public class Service
    {
        private void Foo()
        {
        }

        public void Bar()
        {
            Console.WriteLine("bar");
        }
    }

    public static class Program
    {
        public static void Main()
        {
            new Service().Bar();
        }
    }
}
"#;

fn write(root: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

fn demo_project(root: &Path) -> PathBuf {
    let project = write(root, "Demo/Demo.csproj", SDK_PROJECT);
    write(root, "Demo/Program.cs", PROGRAM);
    project
}

#[test]
fn test_end_to_end_reports_one_symbol_and_one_using() {
    let dir = TempDir::new().unwrap();
    let project = demo_project(dir.path());

    let config = Config::default();
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let result = Analyzer::new(&config, CancellationToken::new())
        .analyze(&solution)
        .unwrap();

    assert_eq!(result.unused_symbols().len(), 1);
    let symbol = &result.unused_symbols()[0];
    assert_eq!(symbol.kind, SymbolKind::Method);
    assert_eq!(symbol.fully_qualified_name, "Demo.Service.Foo()");
    assert_eq!(symbol.line_number, 8);

    assert_eq!(result.unused_imports().len(), 1);
    let using = &result.unused_imports()[0];
    assert_eq!(using.imported_name, "System.Linq");
    assert_eq!(using.line_number, 2);

    assert!(result.total_symbols_analyzed >= 3);
    assert!(result.total_references_found >= 1);
}

#[test]
fn test_fixer_removes_flagged_using() {
    let dir = TempDir::new().unwrap();
    let project = demo_project(dir.path());
    let program = dir.path().join("Demo/Program.cs");

    let config = Config::default();
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let token = CancellationToken::new();
    let result = Analyzer::new(&config, token.clone()).analyze(&solution).unwrap();

    let fixed = ImportFixer::new(&token)
        .fix(&solution, result.unused_imports())
        .unwrap();
    assert_eq!(fixed, 1);

    let contents = std::fs::read_to_string(&program).unwrap();
    assert!(contents.starts_with("using System;\n\nnamespace Demo"));
    assert!(!contents.contains("System.Linq"));

    // A second pass finds nothing left to fix
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let result = Analyzer::new(&config, token.clone()).analyze(&solution).unwrap();
    assert!(result.unused_imports().is_empty());
    assert_eq!(
        ImportFixer::new(&token)
            .fix(&solution, result.unused_imports())
            .unwrap(),
        0
    );
}

#[test]
fn test_excluding_public_api_can_be_disabled() {
    let dir = TempDir::new().unwrap();
    let project = write(dir.path(), "Lib/Lib.csproj", SDK_PROJECT);
    write(
        dir.path(),
        "Lib/Api.cs",
        "namespace Lib { public class Api { public void Exposed() {} } }",
    );

    let mut config = Config::default();
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let result = Analyzer::new(&config, CancellationToken::new())
        .analyze(&solution)
        .unwrap();
    assert!(result.unused_symbols().is_empty());

    config.exclude_public_api = false;
    let result = Analyzer::new(&config, CancellationToken::new())
        .analyze(&solution)
        .unwrap();
    let names: Vec<_> = result
        .unused_symbols()
        .iter()
        .map(|s| s.fully_qualified_name.as_str())
        .collect();
    assert_eq!(names, vec!["Lib.Api.Exposed()"]);
}

#[test]
fn test_references_across_projects() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "App.sln",
        r#"
Microsoft Visual Studio Solution File, Format Version 12.00
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Web", "Web\Web.csproj", "{11111111-1111-1111-1111-111111111111}"
EndProject
Project("{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}") = "Core", "Core\Core.csproj", "{22222222-2222-2222-2222-222222222222}"
EndProject
"#,
    );
    write(
        dir.path(),
        "Web/Web.csproj",
        r#"<Project Sdk="Microsoft.NET.Sdk"><ItemGroup><ProjectReference Include="..\Core\Core.csproj" /></ItemGroup></Project>"#,
    );
    write(
        dir.path(),
        "Web/Page.cs",
        "namespace Web { public class Page { public void Render() { Core.Util.Format(); } } }",
    );
    write(dir.path(), "Core/Core.csproj", SDK_PROJECT);
    write(
        dir.path(),
        "Core/Util.cs",
        "namespace Core { public static class Util { public static void Format() {} public static void Stale() {} } }",
    );

    let mut config = Config::default();
    config.exclude_public_api = false;
    let solution = SolutionLoader::new(&config)
        .load(&dir.path().join("App.sln"))
        .unwrap();
    let result = Analyzer::new(&config, CancellationToken::new())
        .analyze(&solution)
        .unwrap();

    let names: Vec<_> = result
        .unused_symbols()
        .iter()
        .map(|s| s.fully_qualified_name.as_str())
        .collect();
    assert_eq!(names, vec!["Core.Util.Stale()", "Web.Page.Render()"]);
}

#[test]
fn test_generated_and_build_output_files_are_ignored() {
    let dir = TempDir::new().unwrap();
    let project = write(dir.path(), "App/App.csproj", SDK_PROJECT);
    write(dir.path(), "App/Form1.cs", "partial class Form1 { void Helper() {} }");
    write(
        dir.path(),
        "App/Form1.Designer.cs",
        "using System.Linq;\npartial class Form1 { void InitializeComponent() {} }",
    );
    write(
        dir.path(),
        "App/Migrations/20240101120000_Initial.cs",
        "class Initial { void Up() {} }",
    );

    let config = Config::default();
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let result = Analyzer::new(&config, CancellationToken::new())
        .analyze(&solution)
        .unwrap();

    let names: Vec<_> = result
        .unused_symbols()
        .iter()
        .map(|s| s.fully_qualified_name.as_str())
        .collect();
    assert_eq!(names, vec!["Form1.Helper()"]);
    assert!(result.unused_imports().is_empty());
}

#[test]
fn test_cancellation_before_indexing() {
    let dir = TempDir::new().unwrap();
    let project = demo_project(dir.path());
    let program = dir.path().join("Demo/Program.cs");

    let config = Config::default();
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let token = CancellationToken::new();
    token.cancel();

    let err = Analyzer::new(&config, token.clone())
        .analyze(&solution)
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(std::fs::read_to_string(&program).unwrap(), PROGRAM);
}

#[test]
fn test_skipping_usings() {
    let dir = TempDir::new().unwrap();
    let project = demo_project(dir.path());

    let mut config = Config::default();
    config.imports.enabled = false;
    let solution = SolutionLoader::new(&config).load(&project).unwrap();
    let result = Analyzer::new(&config, CancellationToken::new())
        .analyze(&solution)
        .unwrap();

    assert!(result.unused_imports().is_empty());
    assert_eq!(result.unused_symbols().len(), 1);
}
