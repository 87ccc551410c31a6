mod file_finder;
pub mod path_filter;

pub use file_finder::FileFinder;
pub use path_filter::{is_external_dependency, should_analyze, should_analyze_path};
