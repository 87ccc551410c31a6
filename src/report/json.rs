use crate::analysis::AnalysisResult;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::PathBuf;

/// JSON reporter for programmatic output
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    pub fn report(&self, result: &AnalysisResult) -> Result<()> {
        let json = Self::render(result)?;

        if let Some(path) = &self.output_path {
            std::fs::write(path, &json)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write report: {}", path.display()))?;
            eprintln!("JSON report written to: {}", path.display());
        } else {
            println!("{}", json);
        }

        Ok(())
    }

    /// Pretty-printed JSON document for `result`
    pub fn render(result: &AnalysisResult) -> Result<String> {
        serde_json::to_string_pretty(&JsonReport::from_result(result)).into_diagnostic()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    summary: JsonSummary,
    unused_symbols: Vec<JsonSymbol>,
    unused_usings: Vec<JsonUsing>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSummary {
    total_symbols_analyzed: usize,
    total_references_found: usize,
    unused_symbols_count: usize,
    unused_usings_count: usize,
    /// Older consumers read this instead of `unusedSymbolsCount`
    unused_count: usize,
    duration_seconds: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonSymbol {
    kind: String,
    fully_qualified_name: String,
    file_path: String,
    line_number: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonUsing {
    file_path: String,
    line_number: usize,
    namespace: String,
    message: String,
}

impl JsonReport {
    fn from_result(result: &AnalysisResult) -> Self {
        let unused_symbols: Vec<JsonSymbol> = result
            .unused_symbols()
            .iter()
            .map(|s| JsonSymbol {
                kind: s.kind.to_string(),
                fully_qualified_name: s.fully_qualified_name.clone(),
                file_path: s.file_path.to_string_lossy().to_string(),
                line_number: s.line_number,
            })
            .collect();

        let unused_usings: Vec<JsonUsing> = result
            .unused_imports()
            .iter()
            .map(|u| JsonUsing {
                file_path: u.file_path.to_string_lossy().to_string(),
                line_number: u.line_number,
                namespace: u.imported_name.clone(),
                message: u.message.clone(),
            })
            .collect();

        Self {
            summary: JsonSummary {
                total_symbols_analyzed: result.total_symbols_analyzed,
                total_references_found: result.total_references_found,
                unused_symbols_count: unused_symbols.len(),
                unused_usings_count: unused_usings.len(),
                unused_count: unused_symbols.len(),
                duration_seconds: result.duration.as_secs_f64(),
            },
            unused_symbols,
            unused_usings,
        }
    }
}
