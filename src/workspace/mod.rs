//! Solutions, projects and their documents.
//!
//! A [`Solution`] is the compilation graph the analysis runs over: every
//! project with its parsed documents, its analyzer references and a lazily
//! built [`Compilation`] covering the project and everything it references.

mod loader;
mod project_file;

pub use loader::SolutionLoader;
pub use project_file::{parse_solution, ProjectFile, SolutionEntry};

use crate::error::{Error, Result};
use crate::graph::{
    Compilation, CompilationUnit, DiagnosticAnalyzer, UnnecessaryImportsAnalyzer,
};
use crate::parser::{FileDeclarations, SyntaxTree};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Package carrying the code-style analyzers, implicitly referenced by SDK projects
pub const CODE_STYLE_ANALYZERS: &str = "Microsoft.CodeAnalysis.CSharp.CodeStyle";

/// One source file of a project
#[derive(Debug, Clone)]
pub struct Document {
    unit: CompilationUnit,
}

impl Document {
    pub fn new(tree: SyntaxTree, declarations: FileDeclarations) -> Self {
        Self {
            unit: CompilationUnit {
                tree: Arc::new(tree),
                declarations: Arc::new(declarations),
            },
        }
    }

    pub fn path(&self) -> &Path {
        self.unit.tree.path()
    }

    /// Text as loaded
    pub fn text(&self) -> &str {
        self.unit.tree.text()
    }

    pub fn syntax_tree(&self) -> &Arc<SyntaxTree> {
        &self.unit.tree
    }

    pub fn declarations(&self) -> &Arc<FileDeclarations> {
        &self.unit.declarations
    }
}

/// Source language of a project, decided by its file extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectLanguage {
    CSharp,
    Other(String),
}

impl ProjectLanguage {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().map(|e| e.to_string_lossy().to_lowercase()) {
            Some(ext) if ext == "csproj" => ProjectLanguage::CSharp,
            Some(ext) => ProjectLanguage::Other(ext),
            None => ProjectLanguage::Other(String::new()),
        }
    }
}

/// An analyzer assembly referenced by a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerReference {
    pub name: String,
}

impl AnalyzerReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Analyzers this reference provides that run in-process
    pub fn analyzers(&self) -> Vec<Arc<dyn DiagnosticAnalyzer>> {
        if self.name == CODE_STYLE_ANALYZERS {
            vec![Arc::new(UnnecessaryImportsAnalyzer::new())]
        } else {
            Vec::new()
        }
    }
}

/// Analyzer references of a project as MSBuild would resolve them
pub fn analyzer_references(file: &ProjectFile) -> Vec<AnalyzerReference> {
    if file.run_analyzers == Some(false) {
        return Vec::new();
    }

    let mut references = Vec::new();
    if file.is_sdk_style() {
        references.push(AnalyzerReference::new(CODE_STYLE_ANALYZERS));
    }
    for package in &file.package_references {
        let is_analyzer = package.ends_with("Analyzers") || package == CODE_STYLE_ANALYZERS;
        if is_analyzer && !references.iter().any(|r| &r.name == package) {
            references.push(AnalyzerReference::new(package.clone()));
        }
    }
    references
}

/// A loaded project
#[derive(Debug)]
pub struct Project {
    name: String,
    path: PathBuf,
    language: ProjectLanguage,
    documents: Vec<Document>,
    analyzer_references: Vec<AnalyzerReference>,
    /// Declarations of every transitively referenced project
    referenced: Vec<Arc<FileDeclarations>>,
    compilation: OnceCell<Compilation>,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        documents: Vec<Document>,
        analyzer_references: Vec<AnalyzerReference>,
    ) -> Self {
        let path = path.into();
        Self {
            name: name.into(),
            language: ProjectLanguage::from_path(&path),
            path,
            documents,
            analyzer_references,
            referenced: Vec::new(),
            compilation: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn language(&self) -> &ProjectLanguage {
        &self.language
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn analyzer_references(&self) -> &[AnalyzerReference] {
        &self.analyzer_references
    }

    /// Only C# projects can be compiled
    pub fn supports_compilation(&self) -> bool {
        self.language == ProjectLanguage::CSharp
    }

    pub(crate) fn set_referenced(&mut self, referenced: Vec<Arc<FileDeclarations>>) {
        self.referenced = referenced;
        self.compilation = OnceCell::new();
    }

    /// The project's compilation, built on first use
    pub fn compilation(&self) -> Result<&Compilation> {
        if !self.supports_compilation() {
            return Err(Error::Compilation {
                project: self.name.clone(),
                reason: format!("{:?} projects are not compiled", self.language),
            });
        }

        self.compilation.get_or_try_init(|| {
            let units = self.documents.iter().map(|d| d.unit.clone()).collect();
            Ok(Compilation::new(self.name.clone(), units, &self.referenced))
        })
    }
}

/// Every loaded project of a solution or project file
#[derive(Debug)]
pub struct Solution {
    path: PathBuf,
    projects: Vec<Project>,
}

impl Solution {
    pub fn new(path: impl Into<PathBuf>, projects: Vec<Project>) -> Self {
        Self {
            path: path.into(),
            projects,
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn document_count(&self) -> usize {
        self.projects.iter().map(|p| p.documents.len()).sum()
    }

    /// Find a document by path, ignoring separator style and ASCII case
    pub fn find_document(&self, path: &Path) -> Option<&Document> {
        let wanted = normalize_path(path);
        self.projects
            .iter()
            .flat_map(|p| p.documents.iter())
            .find(|d| normalize_path(d.path()).eq_ignore_ascii_case(&wanted))
    }
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
