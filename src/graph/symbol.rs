//! Symbols and their identities.
//!
//! A [`SymbolId`] names a declaration by its declaring type (in unbound
//! generic metadata form, e.g. ``Ns.Outer+Inner`1``), member name, kind and
//! parameter shape. Two references to `List<int>.Add` and `List<string>.Add`
//! therefore share one identity, while a constructed generic method such as
//! `Get<int>()` carries its type arguments until [`Symbol::unwrap_constructed`]
//! maps it back to `Get<T>()`.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Kinds of symbols tracked by the semantic model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SymbolKind {
    Method,
    Property,
    Field,
    NamedType,
}

impl SymbolKind {
    /// Methods, properties and fields are the only kinds reported as unused
    pub fn is_member(&self) -> bool {
        matches!(self, SymbolKind::Method | SymbolKind::Property | SymbolKind::Field)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SymbolKind::Method => "Method",
            SymbolKind::Property => "Property",
            SymbolKind::Field => "Field",
            SymbolKind::NamedType => "NamedType",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    Ordinary,
    Constructor,
    PropertyGet,
    PropertySet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    #[default]
    Private,
}

impl Accessibility {
    /// Accessibility from the modifier keywords of a declaration
    pub fn from_modifiers(modifiers: &[String], default: Accessibility) -> Self {
        let has = |m: &str| modifiers.iter().any(|x| x == m);
        match (has("public"), has("protected"), has("internal"), has("private")) {
            (true, _, _, _) => Accessibility::Public,
            (_, true, true, _) => Accessibility::ProtectedInternal,
            (_, true, _, true) => Accessibility::PrivateProtected,
            (_, true, _, _) => Accessibility::Protected,
            (_, _, true, _) => Accessibility::Internal,
            (_, _, _, true) => Accessibility::Private,
            _ => default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Record,
    Enum,
    Delegate,
}

/// Source location of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Starting byte offset
    pub start_byte: usize,
    /// Ending byte offset
    pub end_byte: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }

    pub fn from_node(file: &std::path::Path, node: tree_sitter::Node) -> Self {
        let start = node.start_position();
        Self::new(
            file.to_path_buf(),
            start.row + 1,    // tree-sitter uses 0-indexed lines
            start.column + 1, // tree-sitter uses 0-indexed columns
            node.start_byte(),
            node.end_byte(),
        )
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Canonical, comparable identity of a declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId {
    /// Declaring type in unbound generic metadata form
    pub container: String,
    pub name: String,
    pub kind: SymbolKind,
    /// Parameter shape and generic arity for methods; type arguments for
    /// constructed methods
    pub signature: String,
}

impl SymbolId {
    pub fn new(
        container: impl Into<String>,
        name: impl Into<String>,
        kind: SymbolKind,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            container: container.into(),
            name: name.into(),
            kind,
            signature: signature.into(),
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}{}", self.container, self.name, self.signature)
    }
}

/// A parameter of a method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    /// Normalized type text (`object`, `List<int>`, `EventArgs`)
    pub type_name: String,
    /// Declared with a default value (`int pad = 0`)
    pub has_default: bool,
    /// A `params` array, which binds any number of trailing arguments
    pub is_params: bool,
}

impl Parameter {
    /// Simple type name without namespace, generic arguments or nullability
    pub fn simple_type_name(&self) -> &str {
        simple_name(&self.type_name)
    }
}

/// Declared type information shared by its members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Metadata name: ``Ns.Outer+Inner`1``
    pub metadata_name: String,
    /// Display name: `Ns.Outer.Inner`
    pub display_name: String,
    pub name: String,
    pub namespace: String,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub type_parameter_count: usize,
    /// Direct base types as written (generic arguments stripped)
    pub base_types: Vec<String>,
    /// Transitive base chain: metadata names for types declared in source,
    /// names as written for external ones
    pub base_chain: Vec<String>,
    /// Metadata name of the enclosing type for nested types
    pub containing_type: Option<String>,
    pub location: Option<Location>,
}

impl TypeInfo {
    /// True when this type or any base in its chain has the simple name `name`
    pub fn derives_from(&self, name: &str) -> bool {
        self.base_chain.iter().any(|base| simple_name(base) == name)
    }
}

/// Modifier flags of a member
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_virtual: bool,
    pub is_override: bool,
    pub is_extern: bool,
    pub is_explicit_interface: bool,
    pub is_extension: bool,
    pub is_const: bool,
}

/// A resolved member or type symbol
#[derive(Debug, Clone)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub method_kind: Option<MethodKind>,
    pub accessibility: Accessibility,
    pub modifiers: Modifiers,
    pub containing_type: Option<Arc<TypeInfo>>,
    /// Attribute names, last segment with the `Attribute` suffix removed
    pub attributes: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub returns_void: bool,
    /// Declared type of a field or property, return type of a method
    pub declared_type: Option<String>,
    pub type_parameter_count: usize,
    /// Type arguments of a constructed generic method
    pub type_arguments: Vec<String>,
    /// Generic definition of a constructed method
    pub original_definition: Option<Arc<Symbol>>,
    /// Owning property of an accessor method
    pub associated_symbol: Option<Arc<Symbol>>,
    pub location: Option<Location>,
}

impl Symbol {
    pub fn is_constructor(&self) -> bool {
        self.method_kind == Some(MethodKind::Constructor)
    }

    pub fn is_accessor(&self) -> bool {
        matches!(
            self.method_kind,
            Some(MethodKind::PropertyGet) | Some(MethodKind::PropertySet)
        )
    }

    pub fn is_generic_method(&self) -> bool {
        self.kind == SymbolKind::Method && self.type_parameter_count > 0
    }

    /// A method is a definition unless it was constructed with type arguments
    pub fn is_definition(&self) -> bool {
        self.original_definition.is_none()
    }

    /// True when a call passing `count` arguments can bind to this member.
    /// The first `receiver` parameters are supplied by the call target.
    pub fn accepts_arguments(&self, count: usize, receiver: usize) -> bool {
        let parameters = self.parameters.get(receiver..).unwrap_or(&[]);
        let required = parameters
            .iter()
            .filter(|p| !p.has_default && !p.is_params)
            .count();
        let variadic = parameters.last().is_some_and(|p| p.is_params);
        count >= required && (variadic || count <= parameters.len())
    }

    pub fn has_attribute(&self, names: &[String]) -> bool {
        self.attributes.iter().any(|a| names.iter().any(|n| n == a))
    }

    /// Synthesized accessor method of a property
    pub fn accessor(property: &Arc<Symbol>, kind: MethodKind) -> Symbol {
        let prefix = if kind == MethodKind::PropertySet { "set_" } else { "get_" };
        let name = format!("{}{}", prefix, property.name);
        Symbol {
            id: SymbolId::new(
                property.id.container.clone(),
                name.clone(),
                SymbolKind::Method,
                "()",
            ),
            name,
            kind: SymbolKind::Method,
            method_kind: Some(kind),
            accessibility: property.accessibility,
            modifiers: property.modifiers,
            containing_type: property.containing_type.clone(),
            attributes: Vec::new(),
            parameters: Vec::new(),
            returns_void: kind == MethodKind::PropertySet,
            declared_type: property.declared_type.clone(),
            type_parameter_count: 0,
            type_arguments: Vec::new(),
            original_definition: None,
            associated_symbol: Some(property.clone()),
            location: property.location.clone(),
        }
    }

    /// Constructed instance of a generic method definition
    pub fn construct(definition: &Arc<Symbol>, type_arguments: Vec<String>) -> Symbol {
        let mut constructed = (**definition).clone();
        constructed.id.signature = format!(
            "{}<{}>",
            definition.id.signature,
            type_arguments.join(",")
        );
        constructed.type_arguments = type_arguments;
        constructed.original_definition = Some(definition.clone());
        constructed
    }

    /// Property accessor methods map to their owning property
    pub fn unwrap_accessor(self: Arc<Self>) -> Arc<Symbol> {
        if self.is_accessor() {
            if let Some(property) = &self.associated_symbol {
                return property.clone();
            }
        }
        self
    }

    /// Constructed generic methods map to their generic definition
    pub fn unwrap_constructed(self: Arc<Self>) -> Arc<Symbol> {
        if self.is_generic_method() && !self.is_definition() {
            if let Some(definition) = &self.original_definition {
                return definition.clone();
            }
        }
        self
    }

    /// Display name such as `Ns.Type.Method(int, string)` or `Ns.Type.Field`
    pub fn display_name(&self) -> String {
        let container = self
            .containing_type
            .as_ref()
            .map(|t| t.display_name.clone())
            .unwrap_or_else(|| self.id.container.replace('+', "."));
        let member = if self.is_constructor() {
            self.containing_type
                .as_ref()
                .map(|t| t.name.clone())
                .unwrap_or_else(|| self.name.clone())
        } else {
            self.name.clone()
        };

        match self.kind {
            SymbolKind::Method => {
                let params: Vec<&str> =
                    self.parameters.iter().map(|p| p.type_name.as_str()).collect();
                format!("{}.{}({})", container, member, params.join(", "))
            }
            _ => format!("{}.{}", container, member),
        }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl std::hash::Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Last segment of a dotted or nested type name, without generic arguments,
/// arity suffix or nullability marker
pub fn simple_name(name: &str) -> &str {
    let name = name.split('<').next().unwrap_or(name);
    let name = name.trim_end_matches(['?', '[', ']']);
    let name = name.rsplit(['.', '+', ':']).next().unwrap_or(name);
    name.split('`').next().unwrap_or(name)
}

/// Normalize an attribute name: `System.ObsoleteAttribute` -> `Obsolete`
pub fn normalize_attribute_name(name: &str) -> String {
    let simple = simple_name(name);
    simple
        .strip_suffix("Attribute")
        .filter(|s| !s.is_empty())
        .unwrap_or(simple)
        .to_string()
}
