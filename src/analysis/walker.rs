use crate::cancel::CancellationToken;
use crate::discovery::should_analyze_path;
use crate::error::Result;
use crate::graph::SymbolId;
use crate::parser::descendants;
use crate::workspace::{Project, Solution};
use dashmap::DashMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Syntax kinds that can denote a use of a member
pub const REFERENCE_KINDS: &[&str] = &[
    "identifier",
    "generic_name",
    "object_creation_expression",
    "implicit_object_creation_expression",
    "invocation_expression",
    "member_access_expression",
    "member_binding_expression",
    "attribute",
    "declaration_pattern",
    "assignment_expression",
    "constructor_initializer",
];

/// Referenced member identities with their use counts
#[derive(Debug, Default)]
pub struct References {
    counts: HashMap<SymbolId, usize>,
    total: usize,
}

impl References {
    pub fn contains(&self, id: &SymbolId) -> bool {
        self.counts.contains_key(id)
    }

    /// Every resolved reference, duplicates included
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct identities referenced
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

impl FromIterator<SymbolId> for References {
    fn from_iter<I: IntoIterator<Item = SymbolId>>(iter: I) -> Self {
        let mut references = References::default();
        for id in iter {
            *references.counts.entry(id).or_insert(0) += 1;
            references.total += 1;
        }
        references
    }
}

/// Resolves every use site to canonical member identities
pub struct ReferenceWalker<'a> {
    cancel: &'a CancellationToken,
}

impl<'a> ReferenceWalker<'a> {
    pub fn new(cancel: &'a CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn walk(&self, solution: &Solution) -> Result<References> {
        let counts: DashMap<SymbolId, usize> = DashMap::new();
        let total = AtomicUsize::new(0);

        solution.projects().par_iter().try_for_each(|project| -> Result<()> {
            self.cancel.check()?;
            let found = self.walk_project(project, &counts);
            total.fetch_add(found, Ordering::Relaxed);
            Ok(())
        })?;

        Ok(References {
            counts: counts.into_iter().collect(),
            total: total.into_inner(),
        })
    }

    /// Returns the number of references recorded
    fn walk_project(&self, project: &Project, counts: &DashMap<SymbolId, usize>) -> usize {
        if !project.supports_compilation() {
            return 0;
        }
        let compilation = match project.compilation() {
            Ok(compilation) => compilation,
            Err(e) => {
                warn!("Skipping project {}: {}", project.name(), e);
                return 0;
            }
        };

        let mut found = 0;
        for (index, unit) in compilation.units().iter().enumerate() {
            if !should_analyze_path(Some(unit.tree.path())) {
                continue;
            }
            let Some(model) = compilation.semantic_model(index) else {
                continue;
            };

            for node in descendants(unit.tree.root()) {
                if !REFERENCE_KINDS.contains(&node.kind()) {
                    continue;
                }
                for symbol in model.symbol_info(node).symbols() {
                    let canonical = symbol.clone().unwrap_accessor().unwrap_constructed();
                    if !canonical.kind.is_member() {
                        continue;
                    }
                    *counts.entry(canonical.id.clone()).or_insert(0) += 1;
                    found += 1;
                }
            }
        }

        debug!("Project {}: {} references", project.name(), found);
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::SymbolKind;
    use crate::parser::{CSharpBinder, SyntaxTree};
    use crate::workspace::Document;

    fn solution(sources: &[(&str, &str)]) -> Solution {
        let documents = sources
            .iter()
            .map(|(path, text)| {
                let tree = SyntaxTree::parse(*path, *text).unwrap();
                let declarations = CSharpBinder::new(&tree).bind();
                Document::new(tree, declarations)
            })
            .collect();
        let project = Project::new("App", "App/App.csproj", documents, Vec::new());
        Solution::new("App/App.csproj", vec![project])
    }

    fn referenced_names(references: &References) -> Vec<String> {
        let mut names: Vec<String> = references.counts.keys().map(|id| id.name.clone()).collect();
        names.sort();
        names
    }

    fn walk(solution: &Solution) -> References {
        ReferenceWalker::new(&CancellationToken::new())
            .walk(solution)
            .unwrap()
    }

    #[test]
    fn test_accessor_uses_map_to_property() {
        let references = walk(&solution(&[(
            "App/A.cs",
            "class A { int Total { get; set; } void Run() { Total = 1; } }",
        )]));
        assert_eq!(referenced_names(&references), vec!["Total"]);
    }

    #[test]
    fn test_constructed_generic_maps_to_definition() {
        let references = walk(&solution(&[(
            "App/A.cs",
            "class A { T Get<T>() => default; void Run() { Get<int>(); Get<string>(); } }",
        )]));
        assert_eq!(references.distinct(), 1);
        let id = references.counts.keys().next().unwrap();
        assert_eq!(id.signature, "`1()");
        assert!(references.total() >= 2);
    }

    #[test]
    fn test_references_in_filtered_files_are_ignored() {
        let references = walk(&solution(&[
            ("App/A.cs", "class A { internal void Used() {} }"),
            ("App/obj/G.cs", "class G { void M() { new A().Used(); } }"),
        ]));
        assert_eq!(references.total(), 0);
    }

    #[test]
    fn test_from_iter_counts_duplicates() {
        let id = SymbolId::new("A", "M", SymbolKind::Method, "()");
        let references: References = vec![id.clone(), id.clone()].into_iter().collect();
        assert_eq!(references.total(), 2);
        assert_eq!(references.distinct(), 1);
        assert_eq!(references.counts[&id], 2);
    }
}
