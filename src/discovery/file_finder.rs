use crate::config::Config;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Directories the SDK leaves out of default compile items
const BUILD_OUTPUT_DIRS: &[&str] = &["bin", "obj"];

/// Finds the C# sources an SDK-style project compiles by default
pub struct FileFinder<'a> {
    config: &'a Config,
}

impl<'a> FileFinder<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Find all `.cs` files below `project_dir`, skipping nested projects
    pub fn find_sources(&self, project_dir: &Path) -> Vec<PathBuf> {
        debug!("Scanning for sources in: {}", project_dir.display());

        if !project_dir.is_dir() {
            trace!("Directory does not exist: {}", project_dir.display());
            return Vec::new();
        }

        let root = project_dir.to_path_buf();
        let walker = WalkBuilder::new(project_dir)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .ignore(true)           // Respect .ignore files
            .parents(false)
            .follow_links(false)
            .filter_entry(move |entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if !is_dir || entry.path() == root {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                if BUILD_OUTPUT_DIRS.iter().any(|d| name.eq_ignore_ascii_case(d)) {
                    return false;
                }
                // Directories owning their own project file belong to that project
                !contains_project_file(entry.path())
            })
            .build();

        let mut files: Vec<PathBuf> = walker
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| {
                let path = entry.path();

                if self.config.should_exclude(path) {
                    trace!("Excluding: {}", path.display());
                    return None;
                }

                // Generated sources still compile, so only the extension is checked here
                let is_source = path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("cs"))
                    .unwrap_or(false);
                if !is_source {
                    return None;
                }

                Some(path.to_path_buf())
            })
            .collect();

        files.sort();
        debug!("Found {} sources in {}", files.len(), project_dir.display());
        files
    }
}

fn contains_project_file(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries.filter_map(|e| e.ok()).any(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("csproj"))
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "class X {}").unwrap();
    }

    #[test]
    fn test_finds_sources_and_skips_build_output() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "App.csproj");
        touch(dir.path(), "Program.cs");
        touch(dir.path(), "Services/Worker.cs");
        touch(dir.path(), "obj/Debug/AssemblyInfo.cs");
        touch(dir.path(), "Form1.Designer.cs");

        let config = Config::default();
        let files = FileFinder::new(&config).find_sources(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(names.len(), 3);
        assert!(names.contains(&"Program.cs".to_string()));
        assert!(names.contains(&"Worker.cs".to_string()));
        assert!(names.contains(&"Form1.Designer.cs".to_string()));
    }

    #[test]
    fn test_skips_nested_projects() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "App.csproj");
        touch(dir.path(), "Program.cs");
        touch(dir.path(), "Tests/Tests.csproj");
        touch(dir.path(), "Tests/WorkerTests.cs");

        let config = Config::default();
        let files = FileFinder::new(&config).find_sources(dir.path());

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Program.cs"));
    }
}
