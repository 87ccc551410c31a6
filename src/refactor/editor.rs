use crate::error::{Error, Result};
use std::io::Write;
use std::ops::Range;
use std::path::Path;
use tracing::warn;

/// Applies byte-range edits to file contents and writes files atomically
pub struct FileEditor;

impl FileEditor {
    pub fn new() -> Self {
        Self
    }

    /// Remove every range from `contents`. Ranges may arrive in any order
    /// but must not overlap.
    pub fn remove_ranges(
        &self,
        path: &Path,
        contents: &str,
        mut ranges: Vec<Range<usize>>,
    ) -> Result<String> {
        // Descending so earlier offsets stay valid
        ranges.sort_by(|a, b| b.start.cmp(&a.start));

        let mut out = contents.to_string();
        let mut limit = contents.len();
        for range in ranges {
            if range.start > range.end
                || range.end > limit
                || !contents.is_char_boundary(range.start)
                || !contents.is_char_boundary(range.end)
            {
                return Err(Error::Fix {
                    path: path.to_path_buf(),
                    reason: format!("invalid byte range {}..{}", range.start, range.end),
                });
            }
            out.replace_range(range.clone(), "");
            limit = range.start;
        }
        Ok(out)
    }

    /// Replace `path` with `contents`. The new text goes to a temporary file
    /// in the same directory, which is synced and then renamed over the
    /// original. A temporary file that is never persisted is removed on drop.
    pub fn write_atomic(&self, path: &Path, contents: &str) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut temp = tempfile::Builder::new()
            .prefix(&format!(".{}.", name))
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| Error::io(path, e))?;

        temp.write_all(contents.as_bytes())
            .map_err(|e| Error::io(temp.path(), e))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| Error::io(temp.path(), e))?;

        if let Ok(metadata) = std::fs::metadata(path) {
            // Keep the original file's permissions
            if let Err(e) = temp.as_file().set_permissions(metadata.permissions()) {
                warn!("Could not copy permissions of {}: {}", path.display(), e);
            }
        }

        temp.persist(path).map_err(|e| Error::io(path, e.error))?;
        Ok(())
    }
}

impl Default for FileEditor {
    fn default() -> Self {
        Self::new()
    }
}
