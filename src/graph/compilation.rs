use super::diagnostics::{self, Diagnostic, DiagnosticAnalyzer};
use super::model::SemanticModel;
use super::SymbolTable;
use crate::parser::{FileDeclarations, SyntaxTree, UsingDecl};
use std::sync::Arc;

/// A parsed document and the declarations bound from it
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    pub tree: Arc<SyntaxTree>,
    pub declarations: Arc<FileDeclarations>,
}

/// The syntax trees of one project and the symbols visible to them
#[derive(Debug)]
pub struct Compilation {
    project: String,
    units: Vec<CompilationUnit>,
    table: SymbolTable,
}

impl Compilation {
    /// Build a compilation from the project's own units plus the declarations
    /// of every project it references
    pub fn new(
        project: impl Into<String>,
        units: Vec<CompilationUnit>,
        referenced: &[Arc<FileDeclarations>],
    ) -> Self {
        let table = SymbolTable::build(
            units
                .iter()
                .map(|u| u.declarations.as_ref())
                .chain(referenced.iter().map(|d| d.as_ref())),
        );

        Self {
            project: project.into(),
            units,
            table,
        }
    }

    pub fn project_name(&self) -> &str {
        &self.project
    }

    pub fn units(&self) -> &[CompilationUnit] {
        &self.units
    }

    pub fn syntax_trees(&self) -> impl Iterator<Item = &Arc<SyntaxTree>> {
        self.units.iter().map(|u| &u.tree)
    }

    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    /// Semantic model for the unit at `index`
    pub fn semantic_model(&self, index: usize) -> Option<SemanticModel<'_>> {
        self.units
            .get(index)
            .map(|unit| SemanticModel::new(self, unit))
    }

    /// Global using directives of every file in the project
    pub fn global_usings(&self) -> impl Iterator<Item = &UsingDecl> {
        self.units
            .iter()
            .flat_map(|u| u.declarations.usings.iter())
            .filter(|u| u.parts.is_global)
    }

    /// Compiler diagnostics
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        diagnostics::compiler_diagnostics(self)
    }

    /// Attach an analyzer set
    pub fn with_analyzers(&self, analyzers: Vec<Arc<dyn DiagnosticAnalyzer>>) -> CompilationWithAnalyzers<'_> {
        CompilationWithAnalyzers {
            compilation: self,
            analyzers,
        }
    }
}

/// A compilation paired with the analyzers to run over it
pub struct CompilationWithAnalyzers<'c> {
    compilation: &'c Compilation,
    analyzers: Vec<Arc<dyn DiagnosticAnalyzer>>,
}

impl<'c> CompilationWithAnalyzers<'c> {
    /// Compiler diagnostics followed by every analyzer's diagnostics
    pub fn all_diagnostics(&self) -> Vec<Diagnostic> {
        let mut all = self.compilation.diagnostics();
        for analyzer in &self.analyzers {
            all.extend(analyzer.analyze(self.compilation));
        }
        all
    }
}
