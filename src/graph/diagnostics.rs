//! Unnecessary using directive diagnostics.
//!
//! Two producers share one judgment routine. The compiler tier (`CS8019`)
//! only judges directives whose target is declared in source, where the
//! exported names are known exactly. The code-style analyzer (`IDE0005`)
//! additionally judges framework namespaces through the [`Catalog`]. The
//! catalog never lists everything a namespace exports, so such an import is
//! reported only when every name in the file is explained elsewhere.

use super::catalog::{Catalog, NamespaceEntry};
use super::compilation::Compilation;
use super::model::SemanticModel;
use crate::parser::{
    child_by_field, descendants, enclosing, node_text, strip_generic_arguments, SyntaxTree,
    UsingDecl,
};
use std::collections::HashSet;
use std::path::PathBuf;
use tree_sitter::Node;

/// Compiler diagnostic id for an unnecessary using directive
pub const UNNECESSARY_USING_COMPILER: &str = "CS8019";
/// Code-style analyzer diagnostic id for an unnecessary using directive
pub const UNNECESSARY_USING_IDE: &str = "IDE0005";

const COMPILER_MESSAGE: &str = "Unnecessary using directive.";
const IDE_MESSAGE: &str = "Using directive is unnecessary.";

/// Source span a diagnostic points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLocation {
    pub path: PathBuf,
    pub start_byte: usize,
    pub end_byte: usize,
    /// 1-based
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub id: &'static str,
    pub message: String,
    pub location: DiagnosticLocation,
}

/// An analyzer attached to a compilation
pub trait DiagnosticAnalyzer: Send + Sync {
    /// Diagnostic id this analyzer produces
    fn id(&self) -> &'static str;

    fn analyze(&self, compilation: &Compilation) -> Vec<Diagnostic>;
}

/// The code-style analyzer reporting unnecessary imports
#[derive(Debug, Clone, Default)]
pub struct UnnecessaryImportsAnalyzer {
    catalog: Catalog,
}

impl UnnecessaryImportsAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticAnalyzer for UnnecessaryImportsAnalyzer {
    fn id(&self) -> &'static str {
        UNNECESSARY_USING_IDE
    }

    fn analyze(&self, compilation: &Compilation) -> Vec<Diagnostic> {
        unnecessary_usings(compilation, Some(&self.catalog), UNNECESSARY_USING_IDE, IDE_MESSAGE)
    }
}

/// Diagnostics the compiler itself reports
pub(super) fn compiler_diagnostics(compilation: &Compilation) -> Vec<Diagnostic> {
    unnecessary_usings(compilation, None, UNNECESSARY_USING_COMPILER, COMPILER_MESSAGE)
}

/// Names a syntax tree uses, gathered once per tree
#[derive(Debug, Default)]
struct TreeUsage {
    /// Leftmost identifiers of names and expressions
    heads: HashSet<String>,
    /// Identifiers after a `.` or `?.` in member access
    member_names: HashSet<String>,
    /// Heads that resolve to nothing declared in source
    unresolved: HashSet<String>,
    /// Methods invoked on a value, which may be extension methods
    instance_calls: HashSet<String>,
    has_query_syntax: bool,
}

impl TreeUsage {
    fn collect(model: &SemanticModel<'_>, tree: &SyntaxTree) -> Self {
        let mut usage = Self::default();
        for node in descendants(tree.root()) {
            match node.kind() {
                "query_expression" => usage.has_query_syntax = true,
                "identifier" => usage.record(model, node, tree.text()),
                _ => {}
            }
        }
        usage
    }

    fn record(&mut self, model: &SemanticModel<'_>, node: Node, source: &str) {
        if enclosing(node, &["using_directive"]).is_some()
            || in_namespace_name(node)
            || model.is_declaration_name(node)
        {
            return;
        }

        let name = node_text(node, source);
        let position = match node.parent() {
            Some(parent) if parent.kind() == "generic_name" => parent,
            _ => node,
        };
        let Some(parent) = position.parent() else {
            return;
        };
        let is_name = child_by_field(parent, "name") == Some(position);

        match parent.kind() {
            "member_access_expression" | "member_binding_expression" if is_name => {
                self.member_names.insert(name.to_string());
                if is_invoked(parent) && !has_type_receiver(model, parent, source) {
                    self.instance_calls.insert(name.to_string());
                }
                return;
            }
            "qualified_name" | "alias_qualified_name" if is_name => return,
            _ => {}
        }

        self.heads.insert(name.to_string());

        let is_attribute = parent.kind() == "attribute" && is_name;
        let suffixed = format!("{}Attribute", name);
        if is_attribute {
            self.heads.insert(suffixed.clone());
        }

        let resolved = model.resolves_in_scope(position, name)
            || (is_attribute && model.resolves_in_scope(position, &suffixed));
        if !resolved {
            self.unresolved.insert(name.to_string());
        }
    }

    fn merge(&mut self, other: &TreeUsage) {
        self.heads.extend(other.heads.iter().cloned());
        self.member_names.extend(other.member_names.iter().cloned());
        self.unresolved.extend(other.unresolved.iter().cloned());
        self.instance_calls.extend(other.instance_calls.iter().cloned());
        self.has_query_syntax |= other.has_query_syntax;
    }
}

/// True when the member access `access` is the callee of an invocation
fn is_invoked(access: Node) -> bool {
    access.parent().is_some_and(|call| {
        call.kind() == "invocation_expression" && child_by_field(call, "function") == Some(access)
    })
}

/// `Console.WriteLine`, `string.Join`: static calls cannot be extension calls
fn has_type_receiver(model: &SemanticModel<'_>, access: Node, source: &str) -> bool {
    if access.kind() != "member_access_expression" {
        return false;
    }
    let Some(receiver) = child_by_field(access, "expression") else {
        return false;
    };
    match receiver.kind() {
        "predefined_type" | "generic_name" => true,
        "identifier" => !model.names_value(receiver, node_text(receiver, source)),
        _ => false,
    }
}

/// True for identifiers inside the name of a namespace declaration
fn in_namespace_name(node: Node) -> bool {
    let mut current = node;
    while let Some(parent) = current.parent() {
        match parent.kind() {
            "qualified_name" => current = parent,
            "namespace_declaration" | "file_scoped_namespace_declaration" => {
                return child_by_field(parent, "name") == Some(current);
            }
            _ => return false,
        }
    }
    false
}

/// Identity of a directive for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DirectiveKey {
    is_static: bool,
    alias: Option<String>,
    target: String,
}

impl DirectiveKey {
    fn of(using: &UsingDecl) -> Self {
        Self {
            is_static: using.parts.is_static,
            alias: using.parts.alias.clone(),
            target: using.parts.target.replace(' ', ""),
        }
    }
}

struct Judge<'a> {
    compilation: &'a Compilation,
    catalog: Option<&'a Catalog>,
}

impl Judge<'_> {
    /// True when `using` contributes nothing to `usage`. Directives this
    /// judge cannot see into are never reported.
    fn is_unused(&self, using: &UsingDecl, usage: &TreeUsage, imported: &HashSet<&str>) -> bool {
        let parts = &using.parts;
        let table = self.compilation.symbol_table();

        if let Some(alias) = &parts.alias {
            return !usage.heads.contains(alias);
        }

        if parts.is_static {
            let target = strip_generic_arguments(&parts.target);
            let Some(ty) = table.find_by_display_name(&target).first() else {
                return false;
            };
            let members = table.members_of(&ty.metadata_name);
            let statics: HashSet<&str> = members
                .iter()
                .filter(|m| m.modifiers.is_static || m.modifiers.is_const)
                .map(|m| m.name.as_str())
                .chain(
                    table
                        .nested_types(&ty.metadata_name)
                        .into_iter()
                        .map(|t| t.name.as_str()),
                )
                .collect();
            let used = usage.heads.iter().any(|h| statics.contains(h.as_str()))
                || members.iter().any(|m| {
                    m.modifiers.is_extension && usage.member_names.contains(&m.name)
                });
            return !used;
        }

        let namespace = parts.target.as_str();
        let catalogued = self.catalog.and_then(|c| c.get(namespace));

        if table.is_namespace(namespace) {
            let exports: HashSet<&str> = table
                .types_in_namespace(namespace)
                .iter()
                .map(|t| t.name.as_str())
                .chain(table.child_namespaces(namespace))
                .collect();
            let used = usage.heads.iter().any(|h| exports.contains(h.as_str()))
                || table
                    .extension_methods_in(namespace)
                    .iter()
                    .any(|m| usage.member_names.contains(&m.name));
            if used {
                return false;
            }
            if catalogued.is_none() {
                return true;
            }
        }

        let Some(entry) = catalogued else {
            return false;
        };

        let used = usage.heads.iter().any(|h| entry.exports_type(h))
            || usage.member_names.iter().any(|m| entry.exports_extension(m))
            || (namespace == "System.Linq" && usage.has_query_syntax);
        if used {
            return false;
        }

        // Names nothing else explains may come from this namespace
        let Some(catalog) = self.catalog else {
            return false;
        };
        let others: Vec<&NamespaceEntry> = imported
            .iter()
            .filter(|ns| **ns != namespace)
            .filter_map(|ns| catalog.get(ns))
            .collect();
        let heads_explained = usage
            .unresolved
            .iter()
            .all(|head| others.iter().any(|other| other.exports_type(head)));
        let calls_explained = entry.extension_methods.is_empty()
            || usage.instance_calls.iter().all(|call| {
                !table.find_members_by_name(call).is_empty()
                    || others.iter().any(|other| other.exports_extension(call))
            });
        heads_explained && calls_explained
    }
}

/// Report every using directive of `compilation` that is unnecessary
fn unnecessary_usings(
    compilation: &Compilation,
    catalog: Option<&Catalog>,
    id: &'static str,
    message: &str,
) -> Vec<Diagnostic> {
    let judge = Judge { compilation, catalog };

    let usages: Vec<TreeUsage> = (0..compilation.units().len())
        .filter_map(|index| {
            let model = compilation.semantic_model(index)?;
            Some(TreeUsage::collect(&model, &compilation.units()[index].tree))
        })
        .collect();

    let mut project_usage = TreeUsage::default();
    for usage in &usages {
        project_usage.merge(usage);
    }

    let global_keys: HashSet<DirectiveKey> =
        compilation.global_usings().map(DirectiveKey::of).collect();
    let global_imports: HashSet<&str> = compilation
        .global_usings()
        .filter(|u| u.parts.alias.is_none() && !u.parts.is_static)
        .map(|u| u.parts.target.as_str())
        .collect();
    let project_imports: HashSet<&str> = compilation
        .units()
        .iter()
        .flat_map(|u| u.declarations.usings.iter())
        .filter(|u| u.parts.alias.is_none() && !u.parts.is_static)
        .map(|u| u.parts.target.as_str())
        .collect();

    let mut seen_globals = HashSet::new();
    let mut diagnostics = Vec::new();

    for (unit, usage) in compilation.units().iter().zip(&usages) {
        let mut seen = HashSet::new();
        let imported: HashSet<&str> = unit
            .declarations
            .usings
            .iter()
            .filter(|u| u.parts.alias.is_none() && !u.parts.is_static)
            .map(|u| u.parts.target.as_str())
            .chain(global_imports.iter().copied())
            .collect();

        for using in &unit.declarations.usings {
            let key = DirectiveKey::of(using);

            let unused = if using.parts.is_global {
                !seen_globals.insert(key)
                    || judge.is_unused(using, &project_usage, &project_imports)
            } else {
                global_keys.contains(&key)
                    || !seen.insert((key, using.scope.clone()))
                    || judge.is_unused(using, usage, &imported)
            };

            if unused {
                diagnostics.push(Diagnostic {
                    id,
                    message: message.to_string(),
                    location: DiagnosticLocation {
                        path: unit.tree.path().to_path_buf(),
                        start_byte: using.start_byte,
                        end_byte: using.end_byte,
                        line: using.line,
                    },
                });
            }
        }
    }

    diagnostics
}
