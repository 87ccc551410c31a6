mod common;
mod csharp;

pub use common::{
    child_by_field, children_of_kind, descendants, enclosing, line_of, named_children, node_text,
    SyntaxTree,
};
pub use csharp::{
    attributes_of, declarator_name, join_namespace, method_signature, parameters_of, render_name,
    strip_generic_arguments, using_parts, CSharpBinder, FileDeclarations, MemberDecl, TypeDecl,
    UsingDecl, UsingParts, MEMBER_DECLARATION_KINDS, TYPE_DECLARATION_KINDS,
};
