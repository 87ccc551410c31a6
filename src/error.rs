//! Error types shared by the analysis pipeline

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while loading or analyzing a solution
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    #[diagnostic(code(deadsharp::file_not_found))]
    FileNotFound(PathBuf),

    #[error("Unsupported file type: {}. Expected .sln or .csproj", .0.display())]
    #[diagnostic(code(deadsharp::unsupported_file_type))]
    UnsupportedFileType(PathBuf),

    #[error("Operation cancelled")]
    #[diagnostic(code(deadsharp::cancelled))]
    Cancelled,

    #[error("I/O error on {}: {source}", path.display())]
    #[diagnostic(code(deadsharp::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to load C# grammar: {0}")]
    #[diagnostic(code(deadsharp::language))]
    Language(#[from] tree_sitter::LanguageError),

    #[error("Failed to load project {}: {reason}", path.display())]
    #[diagnostic(code(deadsharp::project_load))]
    ProjectLoad { path: PathBuf, reason: String },

    #[error("Compilation unavailable for project '{project}': {reason}")]
    #[diagnostic(code(deadsharp::compilation))]
    Compilation { project: String, reason: String },

    #[error("Cannot fix {}: {reason}", path.display())]
    #[diagnostic(code(deadsharp::fix))]
    Fix { path: PathBuf, reason: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Cancellation is a control condition, not a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
