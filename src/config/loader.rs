use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for deadsharp analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Never report public members (they may be consumed by other assemblies)
    pub exclude_public_api: bool,

    /// Path patterns to exclude from analysis
    pub exclude: Vec<String>,

    /// Name patterns to retain - never report as dead code
    pub retain: Vec<String>,

    /// False-positive suppression rules
    pub heuristics: HeuristicsConfig,

    /// Unused using directive analysis
    pub imports: ImportsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// Attributes marking test methods
    pub test_attributes: Vec<String>,

    /// Attributes marking HTTP endpoints
    pub endpoint_attributes: Vec<String>,

    /// Base types whose derived classes are web controllers
    pub controller_base_types: Vec<String>,

    /// Attributes mapping members to a serialized shape
    pub serialization_attributes: Vec<String>,

    /// Attributes declaring a member as used implicitly
    pub keep_attributes: Vec<String>,

    /// UI event handler naming conventions
    pub event_handlers: EventHandlerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EventHandlerConfig {
    /// Enable the event handler heuristic
    pub enabled: bool,

    /// Name fragments such as `_Click`
    pub name_contains: Vec<String>,

    /// Name prefixes such as `On`
    pub name_prefixes: Vec<String>,

    /// Name suffixes such as `Handler`
    pub name_suffixes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportsConfig {
    /// Enable unused using detection
    pub enabled: bool,

    /// Run IDE analyzers when a project carries them
    pub use_ide_analyzers: bool,

    /// Remove flagged usings from source files
    pub fix: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exclude_public_api: true,
            exclude: vec![
                "**/.vs/**".to_string(),
                "**/.git/**".to_string(),
                "**/node_modules/**".to_string(),
            ],
            retain: vec![],
            heuristics: HeuristicsConfig::default(),
            imports: ImportsConfig::default(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            test_attributes: strings(&["Fact", "Theory", "Test", "TestMethod", "TestCase"]),
            endpoint_attributes: strings(&[
                "HttpGet",
                "HttpPost",
                "HttpPut",
                "HttpDelete",
                "HttpPatch",
                "Route",
            ]),
            controller_base_types: strings(&["Controller", "ControllerBase"]),
            serialization_attributes: strings(&[
                "JsonPropertyName",
                "JsonProperty",
                "DataMember",
                "XmlElement",
            ]),
            keep_attributes: strings(&["UsedImplicitly", "Preserve"]),
            event_handlers: EventHandlerConfig::default(),
        }
    }
}

impl Default for EventHandlerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            name_contains: strings(&["_Click", "_Loaded", "_Changed", "_Checked", "_Selected"]),
            name_prefixes: strings(&["On", "Handle"]),
            name_suffixes: strings(&["Handler"]),
        }
    }
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            use_ide_analyzers: true,
            fix: false,
        }
    }
}

impl Config {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                // Try YAML first, then TOML
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations
    pub fn from_default_locations(project_root: &Path) -> Result<Self> {
        let default_names = [
            ".deadsharp.yml",
            ".deadsharp.yaml",
            ".deadsharp.toml",
            "deadsharp.yml",
            "deadsharp.yaml",
            "deadsharp.toml",
        ];

        for name in &default_names {
            let path = project_root.join(name);
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        // No config file found, use defaults
        Ok(Self::default())
    }

    /// Check if a path matches an exclusion pattern
    pub fn should_exclude(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy().replace('\\', "/");
        self.exclude
            .iter()
            .any(|pattern| glob_match(pattern, &path_str))
    }

    /// Check if a member should be retained by name.
    ///
    /// Patterns match either the simple name or the fully qualified name.
    pub fn should_retain(&self, name: &str, fully_qualified_name: &str) -> bool {
        self.retain
            .iter()
            .any(|p| glob_match(p, name) || glob_match(p, fully_qualified_name))
    }
}

/// Simple glob matching for patterns like "*Handler" or "**/Generated/**"
pub fn glob_match(pattern: &str, text: &str) -> bool {
    // Handle simple wildcard patterns
    if let Some(suffix) = pattern.strip_prefix('*') {
        if !pattern.contains('/') {
            // Pattern like "*Handler" matches "ClickHandler"
            return text.ends_with(suffix);
        }
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        if !pattern.contains('/') {
            // Pattern like "Legacy*" matches "LegacyImport"
            return text.starts_with(prefix);
        }
    }

    // Handle path patterns with **
    if pattern.contains("**") {
        // Pattern like "**/Generated/**" - "Generated" directory anywhere in path
        if pattern.starts_with("**/") && pattern.ends_with("/**") {
            let dir_name = pattern
                .trim_start_matches("**/")
                .trim_end_matches("/**")
                .trim_matches('/');
            // Must match as a complete directory name, not substring
            let dir_pattern = format!("/{}/", dir_name);
            return text.contains(&dir_pattern) || text.starts_with(&format!("{}/", dir_name));
        }

        let parts: Vec<&str> = pattern.split("**").collect();
        if parts.len() == 2 {
            let prefix = parts[0].trim_end_matches('/');
            let suffix = parts[1].trim_start_matches('/');

            if prefix.is_empty() && suffix.is_empty() {
                return true; // Pattern is just "**"
            }

            if prefix.is_empty() {
                return suffix_match(suffix, text);
            }

            if suffix.is_empty() {
                return text.starts_with(prefix) || text.contains(&format!("{}/", prefix));
            }

            // Both prefix and suffix
            return (text.starts_with(prefix) || text.contains(&format!("/{}/", prefix)))
                && suffix_match(suffix, text);
        }
    }

    // Exact match
    text == pattern
}

/// Match the trailing part of a `**` pattern, allowing `*.ext` file globs
fn suffix_match(suffix: &str, text: &str) -> bool {
    if let Some(ext) = suffix.strip_prefix('*') {
        return !ext.contains('/') && text.ends_with(ext);
    }
    text.ends_with(suffix) || text.contains(&format!("/{}", suffix))
}
