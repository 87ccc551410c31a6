use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project type GUID Visual Studio uses for solution folders
const SOLUTION_FOLDER_GUID: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

static PROJECT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*Project\("\{([0-9A-Fa-f-]+)\}"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)""#)
        .expect("valid solution project regex")
});

/// One project entry of a `.sln` file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionEntry {
    pub name: String,
    /// Project path relative to the solution directory, `/`-separated
    pub relative_path: String,
}

/// Project entries of a solution file, solution folders excluded
pub fn parse_solution(contents: &str) -> Vec<SolutionEntry> {
    PROJECT_LINE
        .captures_iter(contents)
        .filter(|caps| !caps[1].eq_ignore_ascii_case(SOLUTION_FOLDER_GUID))
        .map(|caps| SolutionEntry {
            name: caps[2].to_string(),
            relative_path: caps[3].replace('\\', "/"),
        })
        .collect()
}

/// The parts of an MSBuild project file the loader needs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFile {
    /// `Sdk` attribute of the root element, or an `<Sdk Name=".."/>` import
    pub sdk: Option<String>,
    pub assembly_name: Option<String>,
    /// `<Compile Include="..">` items, `/`-separated
    pub compile_items: Vec<String>,
    /// `<Compile Remove="..">` items, `/`-separated
    pub compile_removes: Vec<String>,
    pub project_references: Vec<String>,
    pub package_references: Vec<String>,
    pub run_analyzers: Option<bool>,
}

impl ProjectFile {
    /// Parse project XML. Malformed XML is a load error for this project only.
    pub fn parse(path: &Path, contents: &str) -> Result<Self> {
        let mut project = ProjectFile::default();
        let mut reader = Reader::from_str(contents);
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut text_target: Option<String> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let tag = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                    let attribute = |name: &[u8]| {
                        e.attributes()
                            .filter_map(|a| a.ok())
                            .find(|a| a.key.as_ref() == name)
                            .map(|a| String::from_utf8_lossy(&a.value).replace('\\', "/"))
                    };

                    match tag.as_str() {
                        "Project" => {
                            if let Some(sdk) = attribute(b"Sdk") {
                                project.sdk = Some(sdk);
                            }
                        }
                        "Sdk" => {
                            if let Some(sdk) = attribute(b"Name") {
                                project.sdk.get_or_insert(sdk);
                            }
                        }
                        "Compile" => {
                            project.compile_items.extend(attribute(b"Include"));
                            project.compile_removes.extend(attribute(b"Remove"));
                        }
                        "ProjectReference" => project.project_references.extend(attribute(b"Include")),
                        "PackageReference" => project.package_references.extend(attribute(b"Include")),
                        "RunAnalyzers" | "AssemblyName" => text_target = Some(tag),
                        _ => {}
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if let Some(target) = text_target.take() {
                        let value = e
                            .unescape()
                            .map(|v| v.trim().to_string())
                            .unwrap_or_default();
                        match target.as_str() {
                            "RunAnalyzers" => {
                                project.run_analyzers = Some(!value.eq_ignore_ascii_case("false"));
                            }
                            _ => project.assembly_name = Some(value),
                        }
                    }
                }
                Ok(Event::End(_)) => text_target = None,
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::ProjectLoad {
                        path: path.to_path_buf(),
                        reason: format!("invalid XML at byte {}: {}", reader.buffer_position(), e),
                    });
                }
                _ => {}
            }
            buf.clear();
        }

        debug!(
            "Parsed project {}: sdk={:?}, {} compile items, {} project references",
            path.display(),
            project.sdk,
            project.compile_items.len(),
            project.project_references.len()
        );

        Ok(project)
    }

    /// SDK-style projects compile every `.cs` file below their directory
    pub fn is_sdk_style(&self) -> bool {
        self.sdk.is_some()
    }

    /// Absolute paths of referenced projects
    pub fn referenced_project_paths(&self, project_dir: &Path) -> Vec<PathBuf> {
        self.project_references
            .iter()
            .map(|r| project_dir.join(r))
            .collect()
    }
}
