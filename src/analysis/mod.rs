//! Dead-code analysis over a loaded solution.
//!
//! The pipeline indexes declarations and walks references independently,
//! subtracts the two under symbol identity and filters the remainder through
//! the [`SuppressionChain`]. Unused using directives are mined from
//! compilation diagnostics separately.

mod detector;
mod heuristics;
mod imports;
mod indexer;
mod walker;

pub use detector::UnusedSymbolDetector;
pub use heuristics::{Suppression, SuppressionChain};
pub use imports::{extract_imported_name, UnusedImportAnalyzer};
pub use indexer::{should_index, DeclarationIndexer};
pub use walker::{ReferenceWalker, References, REFERENCE_KINDS};

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::error::Result;
use crate::graph::{Symbol, SymbolId, SymbolKind};
use crate::workspace::Solution;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// A declared member eligible for reporting
#[derive(Debug, Clone)]
pub struct SymbolDefinition {
    pub symbol: Arc<Symbol>,
    pub file_path: PathBuf,
    /// 1-based
    pub line_number: usize,
    pub kind: SymbolKind,
    pub fully_qualified_name: String,
}

impl SymbolDefinition {
    /// Definition of a symbol declared in source
    pub fn from_symbol(symbol: Arc<Symbol>) -> Option<Self> {
        let location = symbol.location.clone()?;
        Some(Self {
            file_path: location.file,
            line_number: location.line,
            kind: symbol.kind,
            fully_qualified_name: symbol.display_name(),
            symbol,
        })
    }

    pub fn identity(&self) -> &SymbolId {
        &self.symbol.id
    }
}

/// An unnecessary using directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingDirectiveInfo {
    pub file_path: PathBuf,
    /// 1-based
    pub line_number: usize,
    /// `A.B`, `static A.B` or `X = A.B`
    pub imported_name: String,
    pub message: String,
}

/// Everything one analysis run found
#[derive(Debug, Default)]
pub struct AnalysisResult {
    unused_symbols: Vec<SymbolDefinition>,
    unused_imports: Vec<UsingDirectiveInfo>,
    pub duration: Duration,
    /// Declared symbols before suppression
    pub total_symbols_analyzed: usize,
    /// Resolved references before de-duplication
    pub total_references_found: usize,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unused_symbol(&mut self, symbol: SymbolDefinition) {
        self.unused_symbols.push(symbol);
    }

    pub fn add_unused_import(&mut self, import: UsingDirectiveInfo) {
        self.unused_imports.push(import);
    }

    pub fn unused_symbols(&self) -> &[SymbolDefinition] {
        &self.unused_symbols
    }

    pub fn unused_imports(&self) -> &[UsingDirectiveInfo] {
        &self.unused_imports
    }

    /// Order both lists by file path, then line
    pub fn sort(&mut self) {
        self.unused_symbols
            .sort_by(|a, b| (&a.file_path, a.line_number).cmp(&(&b.file_path, b.line_number)));
        self.unused_imports
            .sort_by(|a, b| (&a.file_path, a.line_number).cmp(&(&b.file_path, b.line_number)));
    }
}

/// Runs every analysis stage over a solution
pub struct Analyzer<'a> {
    config: &'a Config,
    cancel: CancellationToken,
}

impl<'a> Analyzer<'a> {
    pub fn new(config: &'a Config, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    pub fn analyze(&self, solution: &Solution) -> Result<AnalysisResult> {
        let start = Instant::now();
        let mut result = AnalysisResult::new();
        self.cancel.check()?;

        info!("Indexing symbols from {} projects...", solution.projects().len());
        let (declared, referenced) = rayon::join(
            || DeclarationIndexer::new(&self.cancel).index(solution),
            || ReferenceWalker::new(&self.cancel).walk(solution),
        );
        let declared = declared?;
        let referenced = referenced?;
        info!("Found {} declared symbols", declared.len());
        info!("Found {} references", referenced.total());

        result.total_symbols_analyzed = declared.len();
        result.total_references_found = referenced.total();

        self.cancel.check()?;
        let unused = UnusedSymbolDetector::new(self.config).detect(declared, &referenced);
        info!("Found {} unused symbols", unused.len());
        for symbol in unused {
            result.add_unused_symbol(symbol);
        }

        if self.config.imports.enabled {
            info!("Analyzing unused usings...");
            let imports = UnusedImportAnalyzer::new(self.config, &self.cancel).analyze(solution)?;
            info!("Found {} unused usings", imports.len());
            for import in imports {
                result.add_unused_import(import);
            }
        }

        result.sort();
        result.duration = start.elapsed();
        Ok(result)
    }
}
