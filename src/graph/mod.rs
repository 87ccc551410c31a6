//! Semantic model of a C# compilation.
//!
//! The [`SymbolTable`] merges the declarations of every file visible to a
//! project. [`Compilation`] owns a table together with the project's syntax
//! trees and answers semantic queries through [`SemanticModel`].

pub mod catalog;
mod compilation;
pub mod diagnostics;
mod model;
mod symbol;

pub use catalog::Catalog;
pub use compilation::{Compilation, CompilationUnit, CompilationWithAnalyzers};
pub use diagnostics::{
    Diagnostic, DiagnosticAnalyzer, UnnecessaryImportsAnalyzer, UNNECESSARY_USING_COMPILER,
    UNNECESSARY_USING_IDE,
};
pub use model::{SemanticModel, SymbolInfo};
pub use symbol::{
    normalize_attribute_name, simple_name, Accessibility, Location, MethodKind, Modifiers,
    Parameter, Symbol, SymbolId, SymbolKind, TypeInfo, TypeKind,
};

use crate::parser::{FileDeclarations, MemberDecl, TypeDecl};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Types, members and namespaces declared in source
#[derive(Debug, Default)]
pub struct SymbolTable {
    /// Map from metadata name to type
    types: HashMap<String, Arc<TypeInfo>>,

    /// Map from display name (`Ns.Outer.Inner`) to types
    display_index: HashMap<String, Vec<Arc<TypeInfo>>>,

    /// Map from simple name to possible types (for resolution)
    name_index: HashMap<String, Vec<Arc<TypeInfo>>>,

    /// Map from namespace to its top-level types
    namespace_index: HashMap<String, Vec<Arc<TypeInfo>>>,

    /// Map from declaring type to members (for fast member lookup)
    members: HashMap<String, Vec<Arc<Symbol>>>,

    /// Map from member name to every member with that name
    member_names: HashMap<String, Vec<Arc<Symbol>>>,

    /// Map from declaration site to the declared member
    member_sites: HashMap<(PathBuf, usize), Arc<Symbol>>,

    /// Map from declaration site to the (possibly partial) type declared there
    type_sites: HashMap<(PathBuf, usize), Arc<TypeInfo>>,

    namespaces: HashSet<String>,
}

impl SymbolTable {
    /// Create a new empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from the declarations of a set of files
    pub fn build<'a>(files: impl IntoIterator<Item = &'a FileDeclarations>) -> Self {
        let mut table = Self::new();
        let mut merged: HashMap<String, TypeDecl> = HashMap::new();
        let mut sites: Vec<(PathBuf, usize, String)> = Vec::new();
        let mut members: Vec<&MemberDecl> = Vec::new();

        for file in files {
            table.namespaces.extend(file.namespaces.iter().cloned());

            for decl in &file.types {
                sites.push((
                    decl.location.file.clone(),
                    decl.location.start_byte,
                    decl.metadata_name.clone(),
                ));
                // Partial declarations merge into one type
                merged
                    .entry(decl.metadata_name.clone())
                    .and_modify(|existing| {
                        existing.is_static |= decl.is_static;
                        for base in &decl.base_types {
                            if !existing.base_types.contains(base) {
                                existing.base_types.push(base.clone());
                            }
                        }
                    })
                    .or_insert_with(|| decl.clone());
            }

            members.extend(file.members.iter());
        }

        let chains: HashMap<String, Vec<String>> = merged
            .keys()
            .map(|name| (name.clone(), base_chain(name, &merged)))
            .collect();

        let mut sorted: Vec<&TypeDecl> = merged.values().collect();
        sorted.sort_by(|a, b| a.metadata_name.cmp(&b.metadata_name));

        for decl in sorted {
            let info = Arc::new(TypeInfo {
                metadata_name: decl.metadata_name.clone(),
                display_name: decl.display_name.clone(),
                name: decl.name.clone(),
                namespace: decl.namespace.clone(),
                kind: decl.kind,
                accessibility: decl.accessibility,
                is_static: decl.is_static,
                type_parameter_count: decl.type_parameter_count,
                base_types: decl.base_types.clone(),
                base_chain: chains.get(&decl.metadata_name).cloned().unwrap_or_default(),
                containing_type: decl.containing_type.clone(),
                location: Some(decl.location.clone()),
            });
            table.add_type(info);
        }

        for (file, start, name) in sites {
            if let Some(info) = table.types.get(&name) {
                table.type_sites.insert((file, start), info.clone());
            }
        }

        for decl in members {
            let containing_type = table.types.get(&decl.container).cloned();
            let symbol = Arc::new(Symbol {
                id: SymbolId::new(decl.container.clone(), decl.name.clone(), decl.kind, decl.signature()),
                name: decl.name.clone(),
                kind: decl.kind,
                method_kind: decl.method_kind,
                accessibility: decl.accessibility,
                modifiers: decl.modifiers,
                containing_type,
                attributes: decl.attributes.clone(),
                parameters: decl.parameters.clone(),
                returns_void: decl.returns_void,
                declared_type: decl.declared_type.clone(),
                type_parameter_count: decl.type_parameter_count,
                type_arguments: Vec::new(),
                original_definition: None,
                associated_symbol: None,
                location: Some(decl.location.clone()),
            });
            table.add_member(symbol);
        }

        table
    }

    fn add_type(&mut self, info: Arc<TypeInfo>) {
        self.display_index
            .entry(info.display_name.clone())
            .or_default()
            .push(info.clone());
        self.name_index
            .entry(info.name.clone())
            .or_default()
            .push(info.clone());
        if info.containing_type.is_none() {
            self.namespace_index
                .entry(info.namespace.clone())
                .or_default()
                .push(info.clone());
        }
        self.types.insert(info.metadata_name.clone(), info);
    }

    fn add_member(&mut self, symbol: Arc<Symbol>) {
        if let Some(location) = &symbol.location {
            self.member_sites
                .insert((location.file.clone(), location.start_byte), symbol.clone());
        }
        self.member_names
            .entry(symbol.name.clone())
            .or_default()
            .push(symbol.clone());
        self.members
            .entry(symbol.id.container.clone())
            .or_default()
            .push(symbol);
    }

    /// Get a type by metadata name
    pub fn get_type(&self, metadata_name: &str) -> Option<&Arc<TypeInfo>> {
        self.types.get(metadata_name)
    }

    /// Find types by display name (`Ns.Outer.Inner`)
    pub fn find_by_display_name(&self, name: &str) -> &[Arc<TypeInfo>] {
        self.display_index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find types by simple name
    pub fn find_types_by_name(&self, name: &str) -> &[Arc<TypeInfo>] {
        self.name_index.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Top-level types of a namespace
    pub fn types_in_namespace(&self, namespace: &str) -> &[Arc<TypeInfo>] {
        self.namespace_index
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Types nested directly in `container`
    pub fn nested_types(&self, container: &str) -> Vec<&Arc<TypeInfo>> {
        self.types
            .values()
            .filter(|t| t.containing_type.as_deref() == Some(container))
            .collect()
    }

    /// Members declared directly in `container`
    pub fn members_of(&self, container: &str) -> &[Arc<Symbol>] {
        self.members.get(container).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every member named `name`, across all types
    pub fn find_members_by_name(&self, name: &str) -> &[Arc<Symbol>] {
        self.member_names.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Members named `name` in `container` or, failing that, its base types
    pub fn lookup_member(&self, container: &str, name: &str) -> Vec<Arc<Symbol>> {
        let declared: Vec<Arc<Symbol>> = self
            .members_of(container)
            .iter()
            .filter(|m| m.name == name)
            .cloned()
            .collect();
        if !declared.is_empty() {
            return declared;
        }

        let Some(info) = self.types.get(container) else {
            return Vec::new();
        };
        for base in &info.base_chain {
            let inherited: Vec<Arc<Symbol>> = self
                .members_of(base)
                .iter()
                .filter(|m| m.name == name && !m.is_constructor())
                .cloned()
                .collect();
            if !inherited.is_empty() {
                return inherited;
            }
        }
        Vec::new()
    }

    /// Constructors declared by `container`
    pub fn constructors_of(&self, container: &str) -> Vec<Arc<Symbol>> {
        self.members_of(container)
            .iter()
            .filter(|m| m.is_constructor() && !m.modifiers.is_static)
            .cloned()
            .collect()
    }

    /// Extension methods declared by top-level static types of a namespace
    pub fn extension_methods_in(&self, namespace: &str) -> Vec<&Arc<Symbol>> {
        self.types_in_namespace(namespace)
            .iter()
            .filter(|t| t.is_static)
            .flat_map(|t| self.members_of(&t.metadata_name))
            .filter(|m| m.modifiers.is_extension)
            .collect()
    }

    /// Member declared at a source location
    pub fn declared_at(&self, file: &Path, start_byte: usize) -> Option<&Arc<Symbol>> {
        self.member_sites.get(&(file.to_path_buf(), start_byte))
    }

    /// Type declared at a source location
    pub fn type_declared_at(&self, file: &Path, start_byte: usize) -> Option<&Arc<TypeInfo>> {
        self.type_sites.get(&(file.to_path_buf(), start_byte))
    }

    /// True when some file in the table declares `namespace`
    pub fn is_namespace(&self, namespace: &str) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Last segments of the namespaces directly below `namespace`
    pub fn child_namespaces(&self, namespace: &str) -> Vec<&str> {
        let prefix = format!("{}.", namespace);
        self.namespaces
            .iter()
            .filter_map(|ns| ns.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('.'))
            .collect()
    }

    /// First segments of every declared namespace (`App` for `App.Core`)
    pub fn root_namespaces(&self) -> HashSet<&str> {
        self.namespaces
            .iter()
            .filter_map(|ns| ns.split('.').next())
            .collect()
    }
}

/// Transitive base chain of a type. Bases declared in `types` are listed by
/// metadata name and followed; unknown bases are kept as written.
fn base_chain(name: &str, types: &HashMap<String, TypeDecl>) -> Vec<String> {
    let mut chain = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut pending: Vec<String> = vec![name.to_string()];
    visited.insert(name.to_string());

    while let Some(current) = pending.pop() {
        let Some(decl) = types.get(&current) else {
            continue;
        };
        for base in &decl.base_types {
            let resolved = resolve_base(base, decl, types).unwrap_or_else(|| base.clone());
            if visited.insert(resolved.clone()) {
                chain.push(resolved.clone());
                pending.push(resolved);
            }
        }
    }

    chain
}

/// Resolve a base type name relative to the declaring type
fn resolve_base(base: &str, decl: &TypeDecl, types: &HashMap<String, TypeDecl>) -> Option<String> {
    let base = base.trim_start_matches("global::");
    let simple = simple_name(base);

    let mut candidates: Vec<&TypeDecl> = types
        .values()
        .filter(|t| t.name == simple && t.metadata_name != decl.metadata_name)
        .filter(|t| base == simple || t.display_name.ends_with(base))
        .collect();

    // Prefer the candidate sharing the longest namespace prefix
    candidates.sort_by_key(|t| {
        let shared = t
            .namespace
            .split('.')
            .zip(decl.namespace.split('.'))
            .take_while(|(a, b)| a == b)
            .count();
        (std::cmp::Reverse(shared), t.metadata_name.clone())
    });

    candidates.first().map(|t| t.metadata_name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{CSharpBinder, SyntaxTree};

    fn table(sources: &[(&str, &str)]) -> SymbolTable {
        let decls: Vec<FileDeclarations> = sources
            .iter()
            .map(|(path, text)| {
                let tree = SyntaxTree::parse(*path, *text).unwrap();
                CSharpBinder::new(&tree).bind()
            })
            .collect();
        SymbolTable::build(decls.iter())
    }

    #[test]
    fn test_partial_types_merge() {
        let table = table(&[
            ("A.cs", "namespace App { partial class Home : BaseController { void A() {} } }"),
            ("B.cs", "namespace App { partial class Home : IDisposable { void B() {} } }"),
        ]);

        let home = table.get_type("App.Home").unwrap();
        assert_eq!(home.base_types.len(), 2);
        assert_eq!(table.members_of("App.Home").len(), 2);
        assert_eq!(table.find_types_by_name("Home").len(), 1);
    }

    #[test]
    fn test_base_chain_is_transitive() {
        let table = table(&[(
            "Web.cs",
            r#"
namespace App.Web
{
    public abstract class AppController : ControllerBase { }
    public class OrdersController : AppController { }
}
"#,
        )]);

        let orders = table.get_type("App.Web.OrdersController").unwrap();
        assert_eq!(
            orders.base_chain,
            vec!["App.Web.AppController".to_string(), "ControllerBase".to_string()]
        );
        assert!(orders.derives_from("ControllerBase"));
    }

    #[test]
    fn test_lookup_member_walks_bases() {
        let table = table(&[(
            "A.cs",
            "class Base { protected void Log() {} } class Derived : Base { void Run() { Log(); } }",
        )]);

        let found = table.lookup_member("Derived", "Log");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id.container, "Base");
    }

    #[test]
    fn test_namespaces_and_extensions() {
        let table = table(&[(
            "Ext.cs",
            "namespace App.Text.Formatting { public static class StringExt { public static string Trimmed(this string s) => s; } }",
        )]);

        assert!(table.is_namespace("App.Text"));
        assert_eq!(table.child_namespaces("App.Text"), vec!["Formatting"]);
        assert!(table.root_namespaces().contains("App"));
        let ext = table.extension_methods_in("App.Text.Formatting");
        assert_eq!(ext.len(), 1);
        assert_eq!(ext[0].name, "Trimmed");
    }
}
