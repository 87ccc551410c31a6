use super::SymbolDefinition;
use crate::cancel::CancellationToken;
use crate::discovery::should_analyze_path;
use crate::error::Result;
use crate::graph::{Compilation, SemanticModel, Symbol, SymbolKind, TypeKind};
use crate::parser::{children_of_kind, descendants};
use crate::workspace::{Project, Solution};
use dashmap::DashMap;
use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};
use tree_sitter::Node;

/// Records every member declaration that can be judged unused
pub struct DeclarationIndexer<'a> {
    cancel: &'a CancellationToken,
}

impl<'a> DeclarationIndexer<'a> {
    pub fn new(cancel: &'a CancellationToken) -> Self {
        Self { cancel }
    }

    /// Index all projects in parallel. Each declaration is recorded once,
    /// keyed by its source location.
    pub fn index(&self, solution: &Solution) -> Result<Vec<SymbolDefinition>> {
        let declared: DashMap<(PathBuf, usize), SymbolDefinition> = DashMap::new();

        solution.projects().par_iter().try_for_each(|project| -> Result<()> {
            self.cancel.check()?;
            self.index_project(project, &declared);
            Ok(())
        })?;

        Ok(declared.into_iter().map(|(_, definition)| definition).collect())
    }

    fn index_project(&self, project: &Project, declared: &DashMap<(PathBuf, usize), SymbolDefinition>) {
        if !project.supports_compilation() {
            debug!("Skipping {}: not a C# project", project.name());
            return;
        }
        let compilation = match project.compilation() {
            Ok(compilation) => compilation,
            Err(e) => {
                warn!("Skipping project {}: {}", project.name(), e);
                return;
            }
        };

        for index in 0..compilation.units().len() {
            let unit = &compilation.units()[index];
            if !should_analyze_path(Some(unit.tree.path())) {
                continue;
            }
            if let Some(model) = compilation.semantic_model(index) {
                index_tree(compilation, &model, index, declared);
            }
        }
    }
}

fn index_tree(
    compilation: &Compilation,
    model: &SemanticModel<'_>,
    index: usize,
    declared: &DashMap<(PathBuf, usize), SymbolDefinition>,
) {
    let tree = &compilation.units()[index].tree;
    let record = |node: Node| {
        let Some(symbol) = model.declared_symbol(node) else {
            return;
        };
        if !should_index(&symbol) {
            return;
        }
        if let Some(definition) = SymbolDefinition::from_symbol(symbol) {
            declared
                .entry((tree.path().to_path_buf(), node.start_byte()))
                .or_insert(definition);
        }
    };

    for node in descendants(tree.root()) {
        match node.kind() {
            "method_declaration" | "constructor_declaration" | "property_declaration" => record(node),
            // One symbol per variable of a field declaration
            "field_declaration" => {
                for declaration in children_of_kind(node, "variable_declaration") {
                    for declarator in children_of_kind(declaration, "variable_declarator") {
                        record(declarator);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Members reachable through dispatch, interface contracts or the runtime
/// cannot be judged unused from references alone
pub fn should_index(symbol: &Symbol) -> bool {
    let kind_ok = matches!(
        symbol.kind,
        SymbolKind::Method | SymbolKind::Property | SymbolKind::Field
    );
    let in_interface = symbol
        .containing_type
        .as_ref()
        .map(|t| t.kind == TypeKind::Interface)
        .unwrap_or(false);
    let modifiers = &symbol.modifiers;
    let static_constructor = symbol.is_constructor() && modifiers.is_static;

    kind_ok
        && !in_interface
        && !modifiers.is_abstract
        && !modifiers.is_virtual
        && !modifiers.is_override
        && !modifiers.is_extern
        && !modifiers.is_explicit_interface
        && !static_constructor
}
