//! Decides which source files take part in analysis.
//!
//! Every check works on delimited path segments so that `binaries/` is not
//! mistaken for `bin/`, and both separator styles (including mixed ones)
//! are accepted.

use std::path::Path;

/// Extension of the only source files that are analyzed
const SOURCE_EXTENSION: &[u8] = b".cs";

/// Build output directories
const BUILD_OUTPUT_DIRS: &[&str] = &["bin", "obj"];

/// Suffixes of files produced by designers and source generators
const GENERATED_SUFFIXES: &[&str] = &[".designer.cs", ".g.cs", ".g.i.cs"];

/// Minimum digit count of a migration timestamp prefix (yyyyMMddHHmmss)
const MIGRATION_TIMESTAMP_DIGITS: usize = 14;

/// Returns true when `path` is a hand-written C# source file
pub fn should_analyze(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }

    if !ends_with_ignore_case(path, SOURCE_EXTENSION) {
        return false;
    }

    let segments: Vec<&str> = segments(path).collect();
    let Some((file_name, directories)) = segments.split_last() else {
        return false;
    };

    if directories
        .iter()
        .any(|segment| BUILD_OUTPUT_DIRS.contains(segment))
    {
        return false;
    }

    if directories
        .iter()
        .any(|segment| segment.eq_ignore_ascii_case("migrations"))
        && is_migration_scaffold(file_name)
    {
        return false;
    }

    if GENERATED_SUFFIXES
        .iter()
        .any(|suffix| ends_with_ignore_case(file_name, suffix.as_bytes()))
    {
        return false;
    }

    true
}

/// `Option`-taking variant for paths that may be absent
pub fn should_analyze_path(path: Option<&Path>) -> bool {
    match path {
        Some(path) => should_analyze(&path.to_string_lossy()),
        None => false,
    }
}

/// Returns true for files that live in a package cache or SDK install
pub fn is_external_dependency(path: &str) -> bool {
    let segments: Vec<String> = segments(path).map(|s| s.to_ascii_lowercase()).collect();

    segments.iter().enumerate().any(|(i, segment)| {
        match segment.as_str() {
            ".nuget" | "packages" | "packs" => true,
            "sdk" => i > 0 && segments[i - 1] == "dotnet",
            other => other.starts_with("microsoft.net."),
        }
    })
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(['/', '\\']).filter(|s| !s.is_empty())
}

fn ends_with_ignore_case(text: &str, suffix: &[u8]) -> bool {
    let bytes = text.as_bytes();
    bytes.len() >= suffix.len() && bytes[bytes.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
}

fn is_migration_scaffold(file_name: &str) -> bool {
    if ends_with_ignore_case(file_name, b"modelsnapshot.cs") {
        return true;
    }

    let digits = file_name.bytes().take_while(u8::is_ascii_digit).count();
    digits >= MIGRATION_TIMESTAMP_DIGITS && file_name.as_bytes().get(digits) == Some(&b'_')
}
