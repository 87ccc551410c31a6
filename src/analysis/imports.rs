use super::UsingDirectiveInfo;
use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::discovery::{is_external_dependency, should_analyze};
use crate::error::Result;
use crate::graph::{Diagnostic, DiagnosticAnalyzer, UNNECESSARY_USING_COMPILER, UNNECESSARY_USING_IDE};
use crate::parser::{enclosing, using_parts, SyntaxTree};
use crate::workspace::{Project, Solution};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Finds unnecessary using directives through compilation diagnostics
pub struct UnusedImportAnalyzer<'a> {
    config: &'a Config,
    cancel: &'a CancellationToken,
}

impl<'a> UnusedImportAnalyzer<'a> {
    pub fn new(config: &'a Config, cancel: &'a CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Unused directives of every project, ordered by file then line.
    /// A project that fails is logged and contributes nothing.
    pub fn analyze(&self, solution: &Solution) -> Result<Vec<UsingDirectiveInfo>> {
        let found: DashMap<(PathBuf, usize), Flagged> = DashMap::new();

        solution.projects().par_iter().try_for_each(|project| -> Result<()> {
            self.cancel.check()?;
            match self.analyze_project(project) {
                Ok(flagged) => {
                    for entry in flagged {
                        record(&found, entry);
                    }
                    Ok(())
                }
                Err(e) if e.is_cancelled() => Err(e),
                Err(e) => {
                    warn!("Failed to analyze usings in {}: {}", project.name(), e);
                    Ok(())
                }
            }
        })?;

        let mut directives: Vec<UsingDirectiveInfo> =
            found.into_iter().map(|(_, flagged)| flagged.directive).collect();
        directives.sort_by(|a, b| (&a.file_path, a.line_number).cmp(&(&b.file_path, b.line_number)));
        Ok(directives)
    }

    fn analyze_project(&self, project: &Project) -> Result<Vec<Flagged>> {
        if !project.supports_compilation() {
            debug!("Skipping usings of {}: not a C# project", project.name());
            return Ok(Vec::new());
        }
        let compilation = project.compilation()?;

        let analyzers = self.ide_analyzers(project);
        let diagnostics: Vec<Diagnostic> = if analyzers.is_empty() {
            debug!("{}: compiler diagnostics only", project.name());
            compilation
                .diagnostics()
                .into_iter()
                .filter(|d| d.id == UNNECESSARY_USING_COMPILER)
                .collect()
        } else {
            debug!("{}: running {} analyzers", project.name(), analyzers.len());
            compilation
                .with_analyzers(analyzers)
                .all_diagnostics()
                .into_iter()
                .filter(|d| d.id == UNNECESSARY_USING_COMPILER || d.id == UNNECESSARY_USING_IDE)
                .collect()
        };

        let mut directives = Vec::new();
        for diagnostic in diagnostics {
            let location = &diagnostic.location;
            let path = location.path.to_string_lossy();
            if is_external_dependency(&path) || !should_analyze(&path) {
                continue;
            }

            let Some(tree) = compilation
                .syntax_trees()
                .find(|tree| tree.path() == location.path)
            else {
                continue;
            };
            let Some(imported_name) = extract_imported_name(tree, location.start_byte) else {
                debug!("No using directive at {}:{}", path, location.line);
                continue;
            };

            directives.push(Flagged {
                id: diagnostic.id,
                directive: UsingDirectiveInfo {
                    file_path: location.path.clone(),
                    line_number: location.line,
                    imported_name,
                    message: diagnostic.message,
                },
            });
        }

        Ok(directives)
    }

    /// Analyzers attached to the project, when enabled
    fn ide_analyzers(&self, project: &Project) -> Vec<Arc<dyn DiagnosticAnalyzer>> {
        if !self.config.imports.use_ide_analyzers {
            return Vec::new();
        }
        project
            .analyzer_references()
            .iter()
            .flat_map(|reference| reference.analyzers())
            .collect()
    }
}

/// A directive together with the diagnostic that flagged it
struct Flagged {
    id: &'static str,
    directive: UsingDirectiveInfo,
}

/// Keep one entry per file and line. The code-style diagnostic wins over
/// the compiler one.
fn record(found: &DashMap<(PathBuf, usize), Flagged>, flagged: Flagged) {
    let key = (flagged.directive.file_path.clone(), flagged.directive.line_number);
    match found.entry(key) {
        Entry::Occupied(mut existing) => {
            if flagged.id == UNNECESSARY_USING_IDE {
                existing.insert(flagged);
            }
        }
        Entry::Vacant(slot) => {
            slot.insert(flagged);
        }
    }
}

/// Name imported by the using directive covering `offset`: `A.B`,
/// `static A.B` or `X = A.B`
pub fn extract_imported_name(tree: &SyntaxTree, offset: usize) -> Option<String> {
    let node = tree.root().descendant_for_byte_range(offset, offset)?;
    let directive = if node.kind() == "using_directive" {
        node
    } else {
        enclosing(node, &["using_directive"])?
    };
    using_parts(directive, tree.text()).map(|parts| parts.imported_name())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::CSharpBinder;
    use crate::workspace::{AnalyzerReference, Document, CODE_STYLE_ANALYZERS};

    fn project(sources: &[(&str, &str)], references: Vec<AnalyzerReference>) -> Project {
        let documents = sources
            .iter()
            .map(|(path, text)| {
                let tree = SyntaxTree::parse(*path, *text).unwrap();
                let declarations = CSharpBinder::new(&tree).bind();
                Document::new(tree, declarations)
            })
            .collect();
        Project::new("App", "App/App.csproj", documents, references)
    }

    fn analyze(config: &Config, projects: Vec<Project>) -> Vec<UsingDirectiveInfo> {
        let solution = Solution::new("App.sln", projects);
        let token = CancellationToken::new();
        UnusedImportAnalyzer::new(config, &token).analyze(&solution).unwrap()
    }

    fn imported_name(source: &str) -> Option<String> {
        let tree = SyntaxTree::parse("A.cs", source).unwrap();
        let offset = source.find("using").unwrap() + 2;
        extract_imported_name(&tree, offset)
    }

    const LINQ_UNUSED: &str = "using System.Linq;\nnamespace App { class A { void M() {} } }\n";

    #[test]
    fn test_extract_imported_name_forms() {
        assert_eq!(imported_name("using A.B;").as_deref(), Some("A.B"));
        assert_eq!(imported_name("using static A.B;").as_deref(), Some("static A.B"));
        assert_eq!(imported_name("global using A.B;").as_deref(), Some("A.B"));
        assert_eq!(imported_name("using X = A.B;").as_deref(), Some("X = A.B"));
    }

    #[test]
    fn test_extract_keyword_inside_namespace_name() {
        assert_eq!(
            imported_name("using Company.usingHelpers;").as_deref(),
            Some("Company.usingHelpers")
        );
        assert_eq!(
            imported_name("using static Tools.Staticusing;").as_deref(),
            Some("static Tools.Staticusing")
        );
    }

    #[test]
    fn test_extract_outside_directive_is_none() {
        let source = "using A;\nclass C {}\n";
        let tree = SyntaxTree::parse("A.cs", source).unwrap();
        let offset = source.find("class").unwrap();
        assert_eq!(extract_imported_name(&tree, offset), None);
    }

    #[test]
    fn test_ide_tier_flags_framework_namespace() {
        let config = Config::default();
        let project = project(
            &[("App/A.cs", LINQ_UNUSED)],
            vec![AnalyzerReference::new(CODE_STYLE_ANALYZERS)],
        );
        let found = analyze(&config, vec![project]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].imported_name, "System.Linq");
        assert_eq!(found[0].line_number, 1);
        assert_eq!(found[0].message, "Using directive is unnecessary.");
    }

    #[test]
    fn test_compiler_tier_without_analyzers() {
        let config = Config::default();
        let project = project(&[("App/A.cs", LINQ_UNUSED)], Vec::new());
        assert!(analyze(&config, vec![project]).is_empty());
    }

    #[test]
    fn test_ide_tier_can_be_disabled() {
        let mut config = Config::default();
        config.imports.use_ide_analyzers = false;
        let project = project(
            &[("App/A.cs", LINQ_UNUSED)],
            vec![AnalyzerReference::new(CODE_STYLE_ANALYZERS)],
        );
        assert!(analyze(&config, vec![project]).is_empty());
    }

    #[test]
    fn test_both_tiers_are_deduplicated() {
        let config = Config::default();
        let source = "using App.Models;\nnamespace App.Models { class M {} }\nnamespace App { class A {} }\n";
        let project = project(
            &[("App/A.cs", source)],
            vec![AnalyzerReference::new(CODE_STYLE_ANALYZERS)],
        );
        let found = analyze(&config, vec![project]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].imported_name, "App.Models");
        assert_eq!(found[0].message, "Using directive is unnecessary.");
    }

    #[test]
    fn test_compiler_tier_message() {
        let config = Config::default();
        let source = "using App.Models;\nnamespace App.Models { class M {} }\nnamespace App { class A {} }\n";
        let found = analyze(&config, vec![project(&[("App/A.cs", source)], Vec::new())]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].message, "Unnecessary using directive.");
    }

    #[test]
    fn test_filtered_files_are_skipped() {
        let config = Config::default();
        let project = project(
            &[
                ("App/obj/Debug/G.cs", LINQ_UNUSED),
                ("App/Form1.Designer.cs", LINQ_UNUSED),
                ("App/Form1.cs", LINQ_UNUSED),
            ],
            vec![AnalyzerReference::new(CODE_STYLE_ANALYZERS)],
        );
        let found = analyze(&config, vec![project]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_path, PathBuf::from("App/Form1.cs"));
    }

    #[test]
    fn test_results_sorted_by_path_then_line() {
        let config = Config::default();
        let source = "using System.Linq;\nusing System.Text;\nclass A {}\n";
        let project = project(
            &[("App/B.cs", source), ("App/A.cs", source)],
            vec![AnalyzerReference::new(CODE_STYLE_ANALYZERS)],
        );
        let found: Vec<(String, usize)> = analyze(&config, vec![project])
            .into_iter()
            .map(|d| (d.file_path.to_string_lossy().to_string(), d.line_number))
            .collect();

        assert_eq!(
            found,
            vec![
                ("App/A.cs".to_string(), 1),
                ("App/A.cs".to_string(), 2),
                ("App/B.cs".to_string(), 1),
                ("App/B.cs".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_non_csharp_project_contributes_nothing() {
        let config = Config::default();
        let fsharp = Project::new("Lib", "Lib/Lib.fsproj", Vec::new(), Vec::new());
        assert!(analyze(&config, vec![fsharp]).is_empty());
    }

    #[test]
    fn test_cancellation_propagates() {
        let config = Config::default();
        let solution = Solution::new("App.sln", vec![project(&[("App/A.cs", LINQ_UNUSED)], Vec::new())]);
        let token = CancellationToken::new();
        token.cancel();
        let err = UnusedImportAnalyzer::new(&config, &token)
            .analyze(&solution)
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
