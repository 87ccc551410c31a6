//! Source rewriting: removal of unnecessary using directives.

mod editor;
mod fixer;

pub use editor::FileEditor;
pub use fixer::ImportFixer;
