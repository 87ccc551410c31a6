use super::FileEditor;
use crate::analysis::UsingDirectiveInfo;
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::parser::{descendants, line_of, SyntaxTree};
use crate::workspace::Solution;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BYTE_ORDER_MARK: &str = "\u{feff}";

/// Removes flagged using directives from source files
pub struct ImportFixer<'a> {
    cancel: &'a CancellationToken,
    editor: FileEditor,
}

impl<'a> ImportFixer<'a> {
    pub fn new(cancel: &'a CancellationToken) -> Self {
        Self {
            cancel,
            editor: FileEditor::new(),
        }
    }

    /// Remove the directives and return the number of files rewritten.
    /// Files are rewritten in parallel. A file that cannot be fixed is
    /// logged and skipped; cancellation stops any further writes.
    pub fn fix(&self, solution: &Solution, directives: &[UsingDirectiveInfo]) -> Result<usize> {
        let mut by_file: BTreeMap<&Path, BTreeSet<usize>> = BTreeMap::new();
        for directive in directives {
            by_file
                .entry(directive.file_path.as_path())
                .or_default()
                .insert(directive.line_number);
        }

        let outcomes: Vec<Result<bool>> = by_file
            .into_par_iter()
            .map(|(path, lines)| self.fix_file(solution, path, &lines))
            .collect();

        let mut modified = 0;
        let mut cancelled = false;
        for outcome in outcomes {
            match outcome {
                Ok(true) => modified += 1,
                Ok(false) => {}
                Err(e) if e.is_cancelled() => cancelled = true,
                Err(e) => warn!("{}", e),
            }
        }

        if cancelled {
            return Err(Error::Cancelled);
        }
        info!("Removed unused usings from {} files", modified);
        Ok(modified)
    }

    fn fix_file(&self, solution: &Solution, path: &Path, lines: &BTreeSet<usize>) -> Result<bool> {
        self.cancel.check()?;

        let Some(document) = solution.find_document(path) else {
            warn!("Document not found in solution: {}", path.display());
            return Ok(false);
        };
        let target: PathBuf = document.path().to_path_buf();

        let contents =
            std::fs::read_to_string(&target).map_err(|e| Error::io(&target, e))?;
        let (bom, body) = match contents.strip_prefix(BYTE_ORDER_MARK) {
            Some(body) => (BYTE_ORDER_MARK, body),
            None => ("", contents.as_str()),
        };
        let tree = SyntaxTree::parse(&target, body)?;
        let ranges = removal_ranges(&tree, lines);
        if ranges.is_empty() {
            warn!(
                "No using directives found on lines {:?} of {}",
                lines,
                target.display()
            );
            return Ok(false);
        }

        let count = ranges.len();
        let updated = self.editor.remove_ranges(&target, tree.text(), ranges)?;

        self.cancel.check()?;
        self.editor
            .write_atomic(&target, &format!("{}{}", bom, updated))?;
        debug!("Removed {} usings from {}", count, target.display());
        Ok(true)
    }
}

/// Byte ranges of the using directives starting on one of `lines`. A
/// directive alone on its line takes the whole line with it.
fn removal_ranges(tree: &SyntaxTree, lines: &BTreeSet<usize>) -> Vec<Range<usize>> {
    let text = tree.text();
    descendants(tree.root())
        .filter(|node| node.kind() == "using_directive" && lines.contains(&line_of(*node)))
        .map(|node| line_span(text, node.start_byte()..node.end_byte()))
        .collect()
}

fn line_span(text: &str, directive: Range<usize>) -> Range<usize> {
    let line_start = text[..directive.start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let line_end = text[directive.end..]
        .find('\n')
        .map(|i| directive.end + i + 1)
        .unwrap_or(text.len());

    let alone = text[line_start..directive.start].trim().is_empty()
        && text[directive.end..line_end].trim().is_empty();
    if alone {
        line_start..line_end
    } else {
        directive
    }
}
