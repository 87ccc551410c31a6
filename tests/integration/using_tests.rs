//! Unused using directive tests
//!
//! Scratch SDK projects are analyzed with both diagnostic tiers and the
//! reported directives are checked by file, line and rendered name.

use deadsharp::analysis::{Analyzer, UsingDirectiveInfo};
use deadsharp::{CancellationToken, Config, ImportFixer, SolutionLoader};
use std::path::Path;
use tempfile::TempDir;

const SDK_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk"></Project>"#;

const GUARDS: &str = r#"namespace App.Common
{
    public static class Guards
    {
        public static void NotNull(object value) { }
    }

    public static class StringExtensions
    {
        public static string Shout(this string text) => text;
    }

    public class Clock { }
}
"#;

fn scratch(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("App");
    std::fs::create_dir_all(&app).unwrap();
    std::fs::write(app.join("App.csproj"), SDK_PROJECT).unwrap();
    for (name, contents) in files {
        std::fs::write(app.join(name), contents).unwrap();
    }
    dir
}

fn unused_usings(root: &Path, config: &Config) -> Vec<UsingDirectiveInfo> {
    let solution = SolutionLoader::new(config)
        .load(&root.join("App/App.csproj"))
        .unwrap();
    Analyzer::new(config, CancellationToken::new())
        .analyze(&solution)
        .unwrap()
        .unused_imports()
        .to_vec()
}

/// `(file name, line, rendered directive)` triples
fn summarize(usings: &[UsingDirectiveInfo]) -> Vec<(String, usize, String)> {
    usings
        .iter()
        .map(|u| {
            (
                u.file_path.file_name().unwrap().to_string_lossy().to_string(),
                u.line_number,
                u.imported_name.clone(),
            )
        })
        .collect()
}

#[test]
fn test_alias_directives() {
    let dir = scratch(&[
        ("Common.cs", GUARDS),
        (
            "Program.cs",
            "using Ticker = App.Common.Clock;\nusing Unused = App.Common.Guards;\n\nclass Program { Ticker ticker; }\n",
        ),
    ]);
    let found = summarize(&unused_usings(dir.path(), &Config::default()));
    assert_eq!(
        found,
        vec![("Program.cs".into(), 2, "Unused = App.Common.Guards".into())]
    );
}

#[test]
fn test_static_directives() {
    let dir = scratch(&[
        ("Common.cs", GUARDS),
        (
            "Used.cs",
            "using static App.Common.Guards;\n\nclass Used { void M() { NotNull(this); } }\n",
        ),
        (
            "Unused.cs",
            "using static App.Common.Guards;\n\nclass Idle { void M() { } }\n",
        ),
    ]);
    let found = summarize(&unused_usings(dir.path(), &Config::default()));
    assert_eq!(
        found,
        vec![("Unused.cs".into(), 1, "static App.Common.Guards".into())]
    );
}

#[test]
fn test_global_using_covers_whole_project() {
    let dir = scratch(&[
        ("Common.cs", GUARDS),
        ("GlobalUsings.cs", "global using App.Common;\n"),
        ("Program.cs", "using App.Common;\n\nclass Program { Clock clock; }\n"),
        ("Other.cs", "class Other { Clock clock; }\n"),
    ]);
    let found = summarize(&unused_usings(dir.path(), &Config::default()));
    assert_eq!(found, vec![("Program.cs".into(), 1, "App.Common".into())]);
}

#[test]
fn test_duplicate_directive() {
    let dir = scratch(&[
        ("Common.cs", GUARDS),
        (
            "Program.cs",
            "using App.Common;\nusing App.Common;\n\nclass Program { Clock clock; }\n",
        ),
    ]);
    let found = summarize(&unused_usings(dir.path(), &Config::default()));
    assert_eq!(found, vec![("Program.cs".into(), 2, "App.Common".into())]);
}

#[test]
fn test_extension_methods_keep_their_namespace() {
    let dir = scratch(&[
        ("Common.cs", GUARDS),
        (
            "Program.cs",
            "using App.Common;\nusing System.Linq;\n\nclass Program\n{\n    int M(string s, int[] xs) { s.Shout(); return xs.Count(); }\n}\n",
        ),
    ]);
    assert!(unused_usings(dir.path(), &Config::default()).is_empty());
}

#[test]
fn test_query_syntax_keeps_linq() {
    let dir = scratch(&[(
        "Program.cs",
        "using System.Linq;\n\nclass Program { object M(int[] xs) => from x in xs where x > 1 select x; }\n",
    )]);
    assert!(unused_usings(dir.path(), &Config::default()).is_empty());
}

#[test]
fn test_names_missing_from_catalog_keep_framework_imports() {
    let dir = scratch(&[(
        "Program.cs",
        "using System.IO;\nusing System.Linq;\n\nclass Program\n{\n    object M(int[] xs) { xs.AsParallel().ForAll(x => { }); return WatcherChangeTypes.Created; }\n}\n",
    )]);
    assert!(unused_usings(dir.path(), &Config::default()).is_empty());
}

#[test]
fn test_framework_namespace_needs_code_style_tier() {
    let dir = scratch(&[(
        "Program.cs",
        "using System.Text;\n\nclass Program { void M() { } }\n",
    )]);

    let found = unused_usings(dir.path(), &Config::default());
    assert_eq!(summarize(&found), vec![("Program.cs".into(), 1, "System.Text".into())]);
    assert_eq!(found[0].message, "Using directive is unnecessary.");

    let mut config = Config::default();
    config.imports.use_ide_analyzers = false;
    assert!(unused_usings(dir.path(), &config).is_empty());
}

#[test]
fn test_run_analyzers_false_falls_back_to_compiler() {
    let dir = scratch(&[
        ("Common.cs", GUARDS),
        (
            "Program.cs",
            "using System.Text;\nusing App.Common;\n\nclass Program { void M() { } }\n",
        ),
    ]);
    std::fs::write(
        dir.path().join("App/App.csproj"),
        r#"<Project Sdk="Microsoft.NET.Sdk"><PropertyGroup><RunAnalyzers>false</RunAnalyzers></PropertyGroup></Project>"#,
    )
    .unwrap();

    let found = unused_usings(dir.path(), &Config::default());
    assert_eq!(summarize(&found), vec![("Program.cs".into(), 2, "App.Common".into())]);
    assert_eq!(found[0].message, "Unnecessary using directive.");
}

#[test]
fn test_fix_removes_alias_and_static_directives() {
    let program = "using System;\nusing Unused = App.Common.Guards;\nusing static App.Common.Guards;\n\nclass Program { static void Main() { Console.WriteLine(1); } }\n";
    let dir = scratch(&[("Common.cs", GUARDS), ("Program.cs", program)]);
    let config = Config::default();

    let solution = SolutionLoader::new(&config)
        .load(&dir.path().join("App/App.csproj"))
        .unwrap();
    let token = CancellationToken::new();
    let result = Analyzer::new(&config, token.clone()).analyze(&solution).unwrap();
    assert_eq!(result.unused_imports().len(), 2);

    let fixed = ImportFixer::new(&token)
        .fix(&solution, result.unused_imports())
        .unwrap();
    assert_eq!(fixed, 1);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("App/Program.cs")).unwrap(),
        "using System;\n\nclass Program { static void Main() { Console.WriteLine(1); } }\n"
    );
    assert!(unused_usings(dir.path(), &config).is_empty());
}
