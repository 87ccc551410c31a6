use crate::analysis::{AnalysisResult, SymbolDefinition};
use crate::graph::SymbolKind;
use colored::Colorize;
use miette::Result;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Terminal reporter with colored output
pub struct TerminalReporter;

impl TerminalReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, result: &AnalysisResult) -> Result<()> {
        print!("{}", self.render(result));
        Ok(())
    }

    /// The full console report
    pub fn render(&self, result: &AnalysisResult) -> String {
        let mut out = String::new();

        let _ = writeln!(out);
        let _ = writeln!(out, "{}", "Unused Code Analysis Results".yellow().bold());
        let _ = writeln!(out, "{}", "─".repeat(60).dimmed());
        self.write_summary(&mut out, result);

        if result.unused_symbols().is_empty() {
            let _ = writeln!(out, "{}", "No unused symbols found!".green().bold());
        } else {
            self.write_symbols(&mut out, result.unused_symbols());
        }

        if !result.unused_imports().is_empty() {
            self.write_usings(&mut out, result);
        }

        let _ = writeln!(out);
        out
    }

    fn write_summary(&self, out: &mut String, result: &AnalysisResult) {
        let rows = [
            ("Total Symbols Analyzed", result.total_symbols_analyzed.to_string().normal()),
            ("Total References Found", result.total_references_found.to_string().normal()),
            ("Unused Symbols", result.unused_symbols().len().to_string().red()),
            ("Unused Usings", result.unused_imports().len().to_string().red()),
            (
                "Analysis Duration",
                format!("{:.2}s", result.duration.as_secs_f64()).normal(),
            ),
        ];
        for (metric, value) in rows {
            let _ = writeln!(out, "  {:<24} {}", metric.dimmed(), value);
        }
        let _ = writeln!(out);
    }

    /// One section per symbol kind, each ordered by file then line
    fn write_symbols(&self, out: &mut String, symbols: &[SymbolDefinition]) {
        let mut by_kind: BTreeMap<String, Vec<&SymbolDefinition>> = BTreeMap::new();
        for symbol in symbols {
            by_kind.entry(symbol.kind.to_string()).or_default().push(symbol);
        }

        for (kind, mut items) in by_kind {
            items.sort_by(|a, b| (&a.file_path, a.line_number).cmp(&(&b.file_path, b.line_number)));

            let heading = format!("Unused {} ({})", plural(items[0].kind, &kind), items.len());
            let _ = writeln!(out, "{}", heading.cyan().bold());
            for item in items {
                let _ = writeln!(
                    out,
                    "  {}  {}",
                    item.fully_qualified_name.white(),
                    format!("{}:{}", item.file_path.display(), item.line_number).dimmed()
                );
            }
            let _ = writeln!(out);
        }
    }

    fn write_usings(&self, out: &mut String, result: &AnalysisResult) {
        let heading = format!("Unused Usings ({})", result.unused_imports().len());
        let _ = writeln!(out, "{}", heading.cyan().bold());
        for using in result.unused_imports() {
            let _ = writeln!(
                out,
                "  {}  {}",
                format!("using {};", using.imported_name).white(),
                format!("{}:{}", using.file_path.display(), using.line_number).dimmed()
            );
        }
    }
}

fn plural(kind: SymbolKind, name: &str) -> String {
    match kind {
        SymbolKind::Property => "Properties".to_string(),
        _ => format!("{}s", name),
    }
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
