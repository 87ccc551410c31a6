//! deadsharp - Fast dead code detection for C# solutions
//!
//! This library finds unreferenced methods, properties and fields and
//! unnecessary using directives across every project of a solution, and can
//! remove the latter from source.
//!
//! # Architecture
//!
//! The analysis pipeline consists of:
//! 1. **Loading** - Read the `.sln`/`.csproj` graph and parse every document
//! 2. **Path Filtering** - Skip build output, generated and migration files
//! 3. **Indexing** - Record every member declaration that can be judged
//! 4. **Reference Walking** - Resolve every use site to a member identity
//! 5. **Detection** - Subtract the two and apply the suppression chain
//! 6. **Using Analysis** - Mine unnecessary-using diagnostics
//! 7. **Fixing / Reporting** - Remove flagged usings, print the results

pub mod analysis;
pub mod cancel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod parser;
pub mod refactor;
pub mod report;
pub mod workspace;

pub use analysis::{AnalysisResult, Analyzer, SymbolDefinition, UsingDirectiveInfo};
pub use cancel::CancellationToken;
pub use config::Config;
pub use discovery::{should_analyze, FileFinder};
pub use error::{Error, Result};
pub use refactor::ImportFixer;
pub use report::{ReportFormat, Reporter};
pub use workspace::{Solution, SolutionLoader};
