use super::project_file::{parse_solution, ProjectFile};
use super::{analyzer_references, Document, Project, Solution};
use crate::config::{glob_match, Config};
use crate::discovery::FileFinder;
use crate::error::{Error, Result};
use crate::parser::{CSharpBinder, SyntaxTree};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use rayon::prelude::*;
use std::collections::{HashMap, VecDeque};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};

/// Loads a `.sln` or `.csproj` into a [`Solution`]
pub struct SolutionLoader<'a> {
    config: &'a Config,
}

/// A project file read from disk, before its documents are parsed
struct LoadedProject {
    name: String,
    path: PathBuf,
    file: Option<ProjectFile>,
}

impl<'a> SolutionLoader<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Load every project reachable from `path`.
    ///
    /// A missing or unsupported input is fatal. Problems with individual
    /// projects or documents are logged and skipped.
    pub fn load(&self, path: &Path) -> Result<Solution> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let roots: Vec<(String, PathBuf)> = match extension.as_str() {
            "sln" => {
                info!("Loading solution: {}", path.display());
                let contents = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
                let dir = path.parent().unwrap_or(Path::new("."));
                parse_solution(&contents)
                    .into_iter()
                    .map(|entry| (entry.name, normalize(&dir.join(entry.relative_path))))
                    .collect()
            }
            "csproj" => {
                info!("Loading project: {}", path.display());
                vec![(project_name(path), normalize(path))]
            }
            _ => return Err(Error::UnsupportedFileType(path.to_path_buf())),
        };

        let loaded = self.read_project_closure(roots);
        let mut projects: Vec<Project> = loaded.iter().map(|p| self.load_project(p)).collect();
        link_references(&loaded, &mut projects);

        info!(
            "Loaded {} projects with {} documents",
            projects.len(),
            projects.iter().map(|p| p.documents().len()).sum::<usize>()
        );

        Ok(Solution::new(path, projects))
    }

    /// Read the root projects plus every project they reference
    fn read_project_closure(&self, roots: Vec<(String, PathBuf)>) -> Vec<LoadedProject> {
        let mut loaded: Vec<LoadedProject> = Vec::new();
        let mut queue: VecDeque<(String, PathBuf)> = roots.into();

        while let Some((name, path)) = queue.pop_front() {
            if loaded.iter().any(|p| same_path(&p.path, &path)) {
                continue;
            }

            let file = if is_csharp_project(&path) {
                match read_project_file(&path) {
                    Ok(file) => Some(file),
                    Err(e) => {
                        warn!("Skipping project {}: {}", name, e);
                        continue;
                    }
                }
            } else {
                debug!("Project {} is not a C# project", path.display());
                None
            };

            if let Some(file) = &file {
                let dir = path.parent().unwrap_or(Path::new("."));
                for reference in file.referenced_project_paths(dir) {
                    let reference = normalize(&reference);
                    queue.push_back((project_name(&reference), reference));
                }
            }

            loaded.push(LoadedProject { name, path, file });
        }

        loaded
    }

    fn load_project(&self, loaded: &LoadedProject) -> Project {
        let Some(file) = &loaded.file else {
            return Project::new(&loaded.name, &loaded.path, Vec::new(), Vec::new());
        };

        let dir = loaded.path.parent().unwrap_or(Path::new("."));
        let sources = self.project_sources(dir, file);
        debug!("Project {}: {} source files", loaded.name, sources.len());

        let documents: Vec<Document> = sources
            .par_iter()
            .filter_map(|source| match load_document(source) {
                Ok(document) => Some(document),
                Err(e) => {
                    warn!("Skipping document {}: {}", source.display(), e);
                    None
                }
            })
            .collect();

        Project::new(&loaded.name, &loaded.path, documents, analyzer_references(file))
    }

    /// Files a project compiles
    fn project_sources(&self, dir: &Path, file: &ProjectFile) -> Vec<PathBuf> {
        let mut sources = if file.is_sdk_style() {
            FileFinder::new(self.config).find_sources(dir)
        } else {
            let mut listed = Vec::new();
            for item in &file.compile_items {
                if item.contains('*') {
                    listed.extend(
                        FileFinder::new(self.config)
                            .find_sources(dir)
                            .into_iter()
                            .filter(|p| glob_match(item, &relative(dir, p))),
                    );
                } else {
                    let path = normalize(&dir.join(item));
                    if !self.config.should_exclude(&path) {
                        listed.push(path);
                    }
                }
            }
            listed
        };

        if file.is_sdk_style() {
            // SDK projects may list linked files outside their directory
            for item in file.compile_items.iter().filter(|i| !i.contains('*')) {
                let path = normalize(&dir.join(item));
                if !sources.iter().any(|s| same_path(s, &path)) {
                    sources.push(path);
                }
            }
        }

        sources.retain(|p| {
            let rel = relative(dir, p);
            !file.compile_removes.iter().any(|pattern| glob_match(pattern, &rel))
        });
        sources.sort();
        sources.dedup();
        sources
    }
}

fn read_project_file(path: &Path) -> Result<ProjectFile> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ProjectLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    ProjectFile::parse(path, &contents)
}

fn load_document(path: &Path) -> Result<Document> {
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let tree = SyntaxTree::parse(path, text)?;
    let declarations = CSharpBinder::new(&tree).bind();
    Ok(Document::new(tree, declarations))
}

/// Give every project the declarations of the projects it transitively references
fn link_references(loaded: &[LoadedProject], projects: &mut [Project]) {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..loaded.len()).map(|i| graph.add_node(i)).collect();

    let index_of: HashMap<String, usize> = loaded
        .iter()
        .enumerate()
        .map(|(i, p)| (path_key(&p.path), i))
        .collect();

    for (i, project) in loaded.iter().enumerate() {
        let Some(file) = &project.file else { continue };
        let dir = project.path.parent().unwrap_or(Path::new("."));
        for reference in file.referenced_project_paths(dir) {
            if let Some(&target) = index_of.get(&path_key(&normalize(&reference))) {
                if target != i {
                    graph.add_edge(nodes[i], nodes[target], ());
                }
            }
        }
    }

    let referenced: Vec<Vec<_>> = nodes
        .iter()
        .map(|&start| {
            let mut dfs = Dfs::new(&graph, start);
            let mut declarations = Vec::new();
            while let Some(node) = dfs.next(&graph) {
                if node == start {
                    continue;
                }
                let target = graph[node];
                declarations.extend(
                    projects[target]
                        .documents()
                        .iter()
                        .map(|d| d.declarations().clone()),
                );
            }
            declarations
        })
        .collect();

    for (project, declarations) in projects.iter_mut().zip(referenced) {
        if !declarations.is_empty() {
            debug!(
                "Project {} sees {} referenced documents",
                project.name(),
                declarations.len()
            );
        }
        project.set_referenced(declarations);
    }
}

fn is_csharp_project(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("csproj"))
        .unwrap_or(false)
}

fn project_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn path_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn same_path(a: &Path, b: &Path) -> bool {
    path_key(a) == path_key(b)
}

fn relative(dir: &Path, path: &Path) -> String {
    path.strip_prefix(dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
