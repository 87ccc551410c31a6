//! C# declaration binder.
//!
//! Walks one syntax tree and records the namespaces, types, members and
//! using directives it declares. Symbol resolution happens later, once the
//! declarations of every file of a project are merged into a symbol table.

use super::common::{child_by_field, children_of_kind, named_children, node_text, SyntaxTree};
use crate::graph::{
    normalize_attribute_name, Accessibility, Location, MethodKind, Modifiers, Parameter,
    SymbolKind, TypeKind,
};
use tree_sitter::Node;

/// Node kinds that declare a type
pub const TYPE_DECLARATION_KINDS: &[&str] = &[
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "record_struct_declaration",
    "enum_declaration",
    "delegate_declaration",
];

/// Node kinds that declare a member tracked by the analysis
pub const MEMBER_DECLARATION_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "property_declaration",
    "field_declaration",
];

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "protected", "internal", "static", "abstract", "virtual", "override",
    "sealed", "extern", "readonly", "const", "partial", "async", "unsafe", "new", "volatile",
    "required", "file",
];

/// A type declared in source
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub metadata_name: String,
    pub display_name: String,
    pub name: String,
    pub namespace: String,
    pub kind: TypeKind,
    pub accessibility: Accessibility,
    pub is_static: bool,
    pub is_partial: bool,
    pub type_parameter_count: usize,
    /// Base list entries as written, generic arguments stripped
    pub base_types: Vec<String>,
    pub containing_type: Option<String>,
    pub location: Location,
}

/// A method, constructor, property or field declared in source
#[derive(Debug, Clone)]
pub struct MemberDecl {
    /// Metadata name of the declaring type
    pub container: String,
    pub name: String,
    pub kind: SymbolKind,
    pub method_kind: Option<MethodKind>,
    pub accessibility: Accessibility,
    pub modifiers: Modifiers,
    pub attributes: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub returns_void: bool,
    pub declared_type: Option<String>,
    pub type_parameter_count: usize,
    /// Location of the declaration node (the variable declarator for fields)
    pub location: Location,
}

impl MemberDecl {
    /// Identity signature: generic arity and parameter types for methods
    pub fn signature(&self) -> String {
        match self.kind {
            SymbolKind::Method => method_signature(self.type_parameter_count, &self.parameters),
            _ => String::new(),
        }
    }
}

pub fn method_signature(type_parameter_count: usize, parameters: &[Parameter]) -> String {
    let params: Vec<&str> = parameters.iter().map(|p| p.type_name.as_str()).collect();
    if type_parameter_count > 0 {
        format!("`{}({})", type_parameter_count, params.join(","))
    } else {
        format!("({})", params.join(","))
    }
}

/// The parts of a using directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsingParts {
    pub is_global: bool,
    pub is_static: bool,
    pub alias: Option<String>,
    /// Imported namespace or type, rendered from its tokens
    pub target: String,
}

impl UsingParts {
    /// Name shown for the directive: `A.B`, `static A.B` or `X = A.B`
    pub fn imported_name(&self) -> String {
        match (&self.alias, self.is_static) {
            (Some(alias), _) => format!("{} = {}", alias, self.target),
            (None, true) => format!("static {}", self.target),
            (None, false) => self.target.clone(),
        }
    }
}

/// A using directive together with where it applies
#[derive(Debug, Clone)]
pub struct UsingDecl {
    pub parts: UsingParts,
    /// Enclosing namespace, empty at compilation-unit level
    pub scope: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub line: usize,
}

/// Everything one file declares
#[derive(Debug, Clone, Default)]
pub struct FileDeclarations {
    pub namespaces: Vec<String>,
    pub types: Vec<TypeDecl>,
    pub members: Vec<MemberDecl>,
    pub usings: Vec<UsingDecl>,
}

/// Binds declarations of a C# syntax tree
pub struct CSharpBinder<'a> {
    tree: &'a SyntaxTree,
    result: FileDeclarations,
}

impl<'a> CSharpBinder<'a> {
    pub fn new(tree: &'a SyntaxTree) -> Self {
        Self {
            tree,
            result: FileDeclarations::default(),
        }
    }

    pub fn bind(mut self) -> FileDeclarations {
        let root = self.tree.root();
        self.bind_namespace_members(root, "");
        self.result
    }

    fn source(&self) -> &'a str {
        self.tree.text()
    }

    fn bind_namespace_members(&mut self, node: Node<'a>, namespace: &str) {
        // A file-scoped namespace applies to every declaration after it
        let mut current = namespace.to_string();
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "using_directive" => self.bind_using(child, &current),
                "namespace_declaration" => {
                    let name = self.qualified(child, &current);
                    self.declare_namespace(&name);
                    if let Some(body) = child_by_field(child, "body")
                        .or_else(|| children_of_kind(child, "declaration_list").into_iter().next())
                    {
                        self.bind_namespace_members(body, &name);
                    }
                }
                "file_scoped_namespace_declaration" => {
                    let name = self.qualified(child, namespace);
                    self.declare_namespace(&name);
                    self.bind_namespace_members(child, &name);
                    current = name;
                }
                kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                    self.bind_type(child, &current, None);
                }
                _ => {}
            }
        }
    }

    fn qualified(&self, namespace_node: Node<'a>, parent: &str) -> String {
        let name = child_by_field(namespace_node, "name")
            .map(|n| render_name(n, self.source()))
            .unwrap_or_default();
        join_namespace(parent, &name)
    }

    fn declare_namespace(&mut self, name: &str) {
        let mut prefix = String::new();
        for segment in name.split('.') {
            prefix = join_namespace(&prefix, segment);
            if !self.result.namespaces.contains(&prefix) {
                self.result.namespaces.push(prefix.clone());
            }
        }
    }

    fn bind_using(&mut self, node: Node<'a>, scope: &str) {
        if let Some(parts) = using_parts(node, self.source()) {
            self.result.usings.push(UsingDecl {
                parts,
                scope: scope.to_string(),
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                line: node.start_position().row + 1,
            });
        }
    }

    fn bind_type(&mut self, node: Node<'a>, namespace: &str, outer: Option<&TypeDecl>) {
        let source = self.source();
        let Some(name_node) = child_by_field(node, "name") else {
            return;
        };
        let name = node_text(name_node, source).to_string();

        let kind = match node.kind() {
            "struct_declaration" | "record_struct_declaration" => TypeKind::Struct,
            "interface_declaration" => TypeKind::Interface,
            "record_declaration" => TypeKind::Record,
            "enum_declaration" => TypeKind::Enum,
            "delegate_declaration" => TypeKind::Delegate,
            _ => TypeKind::Class,
        };

        let modifiers = modifiers_of(node, source);
        let type_parameter_count = type_parameter_count(node);
        let arity = if type_parameter_count > 0 {
            format!("`{}", type_parameter_count)
        } else {
            String::new()
        };

        let (metadata_name, display_name, default_access) = match outer {
            Some(outer) => (
                format!("{}+{}{}", outer.metadata_name, name, arity),
                format!("{}.{}", outer.display_name, name),
                Accessibility::Private,
            ),
            None => (
                format!("{}{}", join_namespace(namespace, &name), arity),
                join_namespace(namespace, &name),
                Accessibility::Internal,
            ),
        };

        let base_types = children_of_kind(node, "base_list")
            .into_iter()
            .flat_map(named_children)
            .filter(|base| base.kind() != "argument_list")
            .map(|base| {
                // Primary-constructor base calls wrap the type
                let ty = child_by_field(base, "type")
                    .filter(|_| base.kind() == "primary_constructor_base_type")
                    .unwrap_or(base);
                strip_generic_arguments(&render_name(ty, source))
            })
            .filter(|b| !b.is_empty())
            .collect();

        let decl = TypeDecl {
            metadata_name,
            display_name,
            name,
            namespace: namespace.to_string(),
            kind,
            accessibility: Accessibility::from_modifiers(&modifiers, default_access),
            is_static: modifiers.iter().any(|m| m == "static"),
            is_partial: modifiers.iter().any(|m| m == "partial"),
            type_parameter_count,
            base_types,
            containing_type: outer.map(|o| o.metadata_name.clone()),
            location: Location::from_node(self.tree.path(), node),
        };
        self.result.types.push(decl.clone());

        let body = child_by_field(node, "body")
            .or_else(|| children_of_kind(node, "declaration_list").into_iter().next());
        if let Some(body) = body {
            if kind != TypeKind::Enum {
                self.bind_type_members(body, namespace, &decl);
            }
        }
    }

    fn bind_type_members(&mut self, body: Node<'a>, namespace: &str, owner: &TypeDecl) {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            match member.kind() {
                "method_declaration" => self.bind_method(member, owner),
                "constructor_declaration" => self.bind_constructor(member, owner),
                "property_declaration" => self.bind_property(member, owner),
                "field_declaration" => self.bind_field(member, owner),
                kind if TYPE_DECLARATION_KINDS.contains(&kind) => {
                    self.bind_type(member, namespace, Some(owner));
                }
                _ => {}
            }
        }
    }

    fn member_flags(&self, node: Node<'a>, modifiers: &[String], owner: &TypeDecl) -> Modifiers {
        let has = |m: &str| modifiers.iter().any(|x| x == m);
        let in_interface = owner.kind == TypeKind::Interface;
        let has_body = child_by_field(node, "body").is_some()
            || children_of_kind(node, "block").len() + children_of_kind(node, "arrow_expression_clause").len() > 0;

        Modifiers {
            is_static: has("static") || has("const"),
            // Interface members without a body are implicitly abstract
            is_abstract: has("abstract") || (in_interface && !has_body && !has("static")),
            is_virtual: has("virtual"),
            is_override: has("override"),
            is_extern: has("extern"),
            is_explicit_interface: !children_of_kind(node, "explicit_interface_specifier").is_empty(),
            is_extension: false,
            is_const: has("const"),
        }
    }

    fn default_member_access(owner: &TypeDecl) -> Accessibility {
        if owner.kind == TypeKind::Interface {
            Accessibility::Public
        } else {
            Accessibility::Private
        }
    }

    fn bind_method(&mut self, node: Node<'a>, owner: &TypeDecl) {
        let source = self.source();
        let Some(name_node) = child_by_field(node, "name") else {
            return;
        };

        let modifiers = modifiers_of(node, source);
        let mut flags = self.member_flags(node, &modifiers, owner);
        let (parameters, is_extension) = parameters_of(node, source);
        flags.is_extension = is_extension && owner.is_static && flags.is_static;

        let return_type = child_by_field(node, "returns")
            .or_else(|| child_by_field(node, "type"))
            .map(|t| render_name(t, source));

        self.result.members.push(MemberDecl {
            container: owner.metadata_name.clone(),
            name: node_text(name_node, source).to_string(),
            kind: SymbolKind::Method,
            method_kind: Some(MethodKind::Ordinary),
            accessibility: Accessibility::from_modifiers(&modifiers, Self::default_member_access(owner)),
            modifiers: flags,
            attributes: attributes_of(node, source),
            parameters,
            returns_void: return_type.as_deref() == Some("void"),
            declared_type: return_type,
            type_parameter_count: type_parameter_count(node),
            location: Location::from_node(self.tree.path(), node),
        });
    }

    fn bind_constructor(&mut self, node: Node<'a>, owner: &TypeDecl) {
        let source = self.source();
        let modifiers = modifiers_of(node, source);
        let flags = self.member_flags(node, &modifiers, owner);
        let (parameters, _) = parameters_of(node, source);
        let name = if flags.is_static { ".cctor" } else { ".ctor" };

        self.result.members.push(MemberDecl {
            container: owner.metadata_name.clone(),
            name: name.to_string(),
            kind: SymbolKind::Method,
            method_kind: Some(MethodKind::Constructor),
            accessibility: Accessibility::from_modifiers(&modifiers, Accessibility::Private),
            modifiers: flags,
            attributes: attributes_of(node, source),
            parameters,
            returns_void: true,
            declared_type: None,
            type_parameter_count: 0,
            location: Location::from_node(self.tree.path(), node),
        });
    }

    fn bind_property(&mut self, node: Node<'a>, owner: &TypeDecl) {
        let source = self.source();
        let Some(name_node) = child_by_field(node, "name") else {
            return;
        };

        let modifiers = modifiers_of(node, source);
        let mut flags = self.member_flags(node, &modifiers, owner);
        if owner.kind == TypeKind::Interface {
            // Auto-accessor lists in interfaces declare abstract properties
            flags.is_abstract = !modifiers.iter().any(|m| m == "static");
        }

        self.result.members.push(MemberDecl {
            container: owner.metadata_name.clone(),
            name: node_text(name_node, source).to_string(),
            kind: SymbolKind::Property,
            method_kind: None,
            accessibility: Accessibility::from_modifiers(&modifiers, Self::default_member_access(owner)),
            modifiers: flags,
            attributes: attributes_of(node, source),
            parameters: Vec::new(),
            returns_void: false,
            declared_type: child_by_field(node, "type").map(|t| render_name(t, source)),
            type_parameter_count: 0,
            location: Location::from_node(self.tree.path(), node),
        });
    }

    fn bind_field(&mut self, node: Node<'a>, owner: &TypeDecl) {
        let source = self.source();
        let modifiers = modifiers_of(node, source);
        let flags = self.member_flags(node, &modifiers, owner);
        let attributes = attributes_of(node, source);
        let accessibility =
            Accessibility::from_modifiers(&modifiers, Self::default_member_access(owner));

        for declaration in children_of_kind(node, "variable_declaration") {
            let declared_type = child_by_field(declaration, "type").map(|t| render_name(t, source));

            for declarator in children_of_kind(declaration, "variable_declarator") {
                let Some(name) = declarator_name(declarator, source) else {
                    continue;
                };

                self.result.members.push(MemberDecl {
                    container: owner.metadata_name.clone(),
                    name,
                    kind: SymbolKind::Field,
                    method_kind: None,
                    accessibility,
                    modifiers: flags,
                    attributes: attributes.clone(),
                    parameters: Vec::new(),
                    returns_void: false,
                    declared_type: declared_type.clone(),
                    type_parameter_count: 0,
                    location: Location::from_node(self.tree.path(), declarator),
                });
            }
        }
    }
}

/// Split a using directive into its parts without touching its raw text
pub fn using_parts(node: Node, source: &str) -> Option<UsingParts> {
    if node.kind() != "using_directive" {
        return None;
    }

    let mut is_global = false;
    let mut is_static = false;
    let mut alias = None;
    let mut names: Vec<Node> = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "global" => is_global = true,
            "static" => is_static = true,
            "using" | "unsafe" | ";" | "comment" => {}
            "name_equals" => {
                alias = named_children(child)
                    .first()
                    .map(|n| node_text(*n, source).to_string());
            }
            "=" => {
                // `using X = A.B;` without a name_equals wrapper
                alias = names.pop().map(|n| node_text(n, source).to_string());
            }
            _ if child.is_named() => names.push(child),
            _ => {}
        }
    }

    let target = names.last().map(|n| render_name(*n, source))?;
    Some(UsingParts {
        is_global,
        is_static,
        alias,
        target,
    })
}

/// Render a name or type from its leaf tokens, with a single space after commas
pub fn render_name(node: Node, source: &str) -> String {
    let mut rendered = String::new();
    let mut stack = vec![node];

    // Depth-first, left-to-right over leaves
    while let Some(current) = stack.pop() {
        if current.child_count() == 0 {
            let text = node_text(current, source);
            if current.kind() == "comment" {
                continue;
            }
            rendered.push_str(text);
            if text == "," {
                rendered.push(' ');
            }
            continue;
        }
        let mut cursor = current.walk();
        let children: Vec<Node> = current.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }

    rendered
}

/// `List<Dictionary<K, V>>` -> `List`
pub fn strip_generic_arguments(name: &str) -> String {
    name.split('<').next().unwrap_or(name).trim().to_string()
}

pub fn join_namespace(parent: &str, name: &str) -> String {
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (_, true) => parent.to_string(),
        _ => format!("{}.{}", parent, name),
    }
}

/// Modifier keywords of a declaration
pub fn modifiers_of(node: Node, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter_map(|child| {
            if child.kind() == "modifier" {
                Some(node_text(child, source).trim().to_string())
            } else if !child.is_named() && MODIFIER_KEYWORDS.contains(&child.kind()) {
                Some(child.kind().to_string())
            } else {
                None
            }
        })
        .collect()
}

/// Normalized attribute names applied to a declaration
pub fn attributes_of(node: Node, source: &str) -> Vec<String> {
    children_of_kind(node, "attribute_list")
        .into_iter()
        .flat_map(|list| children_of_kind(list, "attribute"))
        .filter_map(|attribute| child_by_field(attribute, "name"))
        .map(|name| normalize_attribute_name(&strip_generic_arguments(&render_name(name, source))))
        .collect()
}

/// Number of type parameters declared by a type or method
pub fn type_parameter_count(node: Node) -> usize {
    child_by_field(node, "type_parameters")
        .or_else(|| children_of_kind(node, "type_parameter_list").into_iter().next())
        .map(|list| children_of_kind(list, "type_parameter").len())
        .unwrap_or(0)
}

/// Parameters of a method or constructor, and whether the first one is `this`
pub fn parameters_of(node: Node, source: &str) -> (Vec<Parameter>, bool) {
    let Some(list) = child_by_field(node, "parameters")
        .or_else(|| children_of_kind(node, "parameter_list").into_iter().next())
    else {
        return (Vec::new(), false);
    };

    let mut is_extension = false;
    let mut parameters = Vec::new();
    // `params T[] name` is inlined into the list as bare tokens
    let mut params_type: Option<String> = None;
    let mut in_params = false;

    let mut cursor = list.walk();
    for child in list.children(&mut cursor) {
        match child.kind() {
            "parameter" => {
                if parameters.is_empty() && has_parameter_modifier(child, source, "this") {
                    is_extension = true;
                }
                parameters.push(Parameter {
                    name: child_by_field(child, "name")
                        .map(|n| node_text(n, source).to_string())
                        .unwrap_or_default(),
                    type_name: child_by_field(child, "type")
                        .map(|t| render_name(t, source))
                        .unwrap_or_default(),
                    has_default: has_default_value(child),
                    is_params: has_parameter_modifier(child, source, "params"),
                });
            }
            "params" => in_params = true,
            "identifier" if in_params => {
                parameters.push(Parameter {
                    name: node_text(child, source).to_string(),
                    type_name: params_type.take().unwrap_or_default(),
                    has_default: false,
                    is_params: true,
                });
                in_params = false;
            }
            _ if in_params && child.is_named() && child.kind() != "attribute_list" => {
                params_type = Some(render_name(child, source));
            }
            _ => {}
        }
    }

    (parameters, is_extension)
}

fn has_default_value(parameter: Node) -> bool {
    let mut cursor = parameter.walk();
    let found = parameter
        .children(&mut cursor)
        .any(|child| matches!(child.kind(), "=" | "equals_value_clause"));
    found
}

fn has_parameter_modifier(parameter: Node, source: &str, modifier: &str) -> bool {
    let mut cursor = parameter.walk();
    let found = parameter.children(&mut cursor).any(|child| {
        child.kind() == modifier
            || (matches!(child.kind(), "parameter_modifier" | "modifier")
                && node_text(child, source).trim() == modifier)
    });
    found
}

/// Name of a variable declarator
pub fn declarator_name(declarator: Node, source: &str) -> Option<String> {
    child_by_field(declarator, "name")
        .or_else(|| children_of_kind(declarator, "identifier").into_iter().next())
        .map(|n| node_text(n, source).to_string())
}
