//! Per-tree symbol resolution.
//!
//! Resolution is deliberately generous: when the receiver of a member access
//! cannot be typed, every member of that name in the table is returned as a
//! candidate. Over-reporting uses only hides dead code; under-reporting would
//! report live code as dead.

use super::compilation::{Compilation, CompilationUnit};
use super::symbol::{MethodKind, Symbol, SymbolKind, TypeInfo};
use crate::parser::{
    child_by_field, children_of_kind, declarator_name, descendants, enclosing, join_namespace,
    named_children, node_text, render_name, strip_generic_arguments, UsingDecl,
    TYPE_DECLARATION_KINDS,
};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;
use tree_sitter::Node;

/// Declarations whose bodies form one local scope
const SCOPE_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "property_declaration",
    "indexer_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "event_declaration",
    "field_declaration",
    "global_statement",
];

/// Nodes bounding the visibility of the locals declared inside them
const LOCAL_SCOPE_KINDS: &[&str] = &[
    "block",
    "switch_section",
    "for_statement",
    "for_each_statement",
    "using_statement",
    "fixed_statement",
    "catch_clause",
    "lambda_expression",
    "anonymous_method_expression",
    "local_function_statement",
    "query_expression",
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "property_declaration",
    "indexer_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "event_declaration",
    "field_declaration",
    "global_statement",
];

/// Parents whose `name` field declares something rather than using it
const NAME_DECLARING_KINDS: &[&str] = &[
    "variable_declarator",
    "parameter",
    "catch_declaration",
    "local_function_statement",
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "property_declaration",
    "event_declaration",
    "class_declaration",
    "struct_declaration",
    "interface_declaration",
    "record_declaration",
    "record_struct_declaration",
    "enum_declaration",
    "delegate_declaration",
    "enum_member_declaration",
    "namespace_declaration",
    "file_scoped_namespace_declaration",
    "type_parameter",
    "from_clause",
    "let_clause",
    "join_clause",
    "join_into_clause",
    "query_continuation",
    "declaration_pattern",
    "declaration_expression",
    "labeled_statement",
    "tuple_element",
    "extern_alias_directive",
    "using_directive",
];

/// Parents whose identifier children are always declarations or labels
const DECLARING_PARENTS: &[&str] = &[
    "single_variable_designation",
    "parenthesized_variable_designation",
    "type_parameter",
    "name_equals",
    "name_colon",
    "implicit_parameter",
    "tuple_pattern",
];

/// Identifiers that never name a member
const CONTEXTUAL_NAMES: &[&str] = &["var", "dynamic", "nameof", "value", "_", "args", "unmanaged", "notnull"];

/// Result of resolving a node
#[derive(Debug, Clone, Default)]
pub struct SymbolInfo {
    /// The single best match
    pub symbol: Option<Arc<Symbol>>,
    /// All plausible targets when no single match exists
    pub candidates: Vec<Arc<Symbol>>,
}

impl SymbolInfo {
    pub fn none() -> Self {
        Self::default()
    }

    fn from_symbols(mut symbols: Vec<Arc<Symbol>>) -> Self {
        if symbols.len() == 1 {
            Self {
                symbol: symbols.pop(),
                candidates: Vec::new(),
            }
        } else {
            Self {
                symbol: None,
                candidates: symbols,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.symbol.is_none() && self.candidates.is_empty()
    }

    /// The symbol followed by every candidate
    pub fn symbols(&self) -> impl Iterator<Item = &Arc<Symbol>> {
        self.symbol.iter().chain(self.candidates.iter())
    }
}

/// A local variable, parameter or range variable
#[derive(Debug)]
struct Local {
    /// Byte range of the scope the name is visible in
    scope: Range<usize>,
    declared_type: Option<String>,
}

/// Locals of one member body by name
type Locals = HashMap<String, Vec<Local>>;

/// Semantic queries over one syntax tree
pub struct SemanticModel<'c> {
    compilation: &'c Compilation,
    unit: &'c CompilationUnit,
    locals: RefCell<HashMap<usize, Rc<Locals>>>,
}

impl<'c> SemanticModel<'c> {
    pub(super) fn new(compilation: &'c Compilation, unit: &'c CompilationUnit) -> Self {
        Self {
            compilation,
            unit,
            locals: RefCell::new(HashMap::new()),
        }
    }

    fn source(&self) -> &'c str {
        self.unit.tree.text()
    }

    fn text(&self, node: Node) -> &'c str {
        node_text(node, self.source())
    }

    /// Member declared by a method, constructor, property or variable declarator node
    pub fn declared_symbol(&self, node: Node) -> Option<Arc<Symbol>> {
        match node.kind() {
            "method_declaration" | "constructor_declaration" | "property_declaration"
            | "variable_declarator" => self
                .compilation
                .symbol_table()
                .declared_at(self.unit.tree.path(), node.start_byte())
                .cloned(),
            _ => None,
        }
    }

    /// Symbols a node refers to
    pub fn symbol_info(&self, node: Node) -> SymbolInfo {
        match node.kind() {
            "identifier" => self.resolve_identifier(node),
            "generic_name" => self.resolve_generic_name(node),
            "member_access_expression" => self.resolve_member_access(node),
            "member_binding_expression" => self.resolve_member_binding(node),
            "invocation_expression" => self.resolve_invocation(node),
            "object_creation_expression" => self.resolve_object_creation(node),
            "implicit_object_creation_expression" => self.resolve_implicit_creation(node),
            "attribute" => self.resolve_attribute(node),
            "constructor_initializer" => self.resolve_constructor_initializer(node),
            "assignment_expression" => child_by_field(node, "left")
                .map(|left| self.symbol_info(left))
                .unwrap_or_default(),
            _ => SymbolInfo::none(),
        }
    }

    /// True when `node` is the name being declared rather than a use
    pub fn is_declaration_name(&self, node: Node) -> bool {
        let Some(parent) = node.parent() else {
            return false;
        };

        if DECLARING_PARENTS.contains(&parent.kind()) {
            return true;
        }
        if NAME_DECLARING_KINDS.contains(&parent.kind())
            && child_by_field(parent, "name") == Some(node)
        {
            return true;
        }

        match parent.kind() {
            "for_each_statement" => child_by_field(parent, "left") == Some(node),
            "lambda_expression" => child_by_field(parent, "parameters") == Some(node),
            "variable_declarator" => {
                children_of_kind(parent, "identifier").first() == Some(&node)
            }
            "declaration_pattern" | "declaration_expression" => {
                child_by_field(parent, "type") != Some(node)
            }
            _ => false,
        }
    }

    /// True when `name` resolves to something visible at `node`: a local,
    /// a member, a type parameter, a source type or a source namespace
    pub fn resolves_in_scope(&self, node: Node, name: &str) -> bool {
        let table = self.compilation.symbol_table();
        CONTEXTUAL_NAMES.contains(&name)
            || self.local_at(node, name).is_some()
            || self.type_parameters_in_scope(node).contains(name)
            || !self.lookup_unqualified(name, node).is_empty()
            || !table.find_types_by_name(name).is_empty()
            || table.root_namespaces().contains(name)
            || self.alias_target(name).is_some()
    }

    /// True when `name` at `node` names a local or a member rather than a type
    pub fn names_value(&self, node: Node, name: &str) -> bool {
        self.local_at(node, name).is_some() || !self.lookup_unqualified(name, node).is_empty()
    }

    fn resolve_identifier(&self, node: Node) -> SymbolInfo {
        if self.is_declaration_name(node) {
            return SymbolInfo::none();
        }
        let name = self.text(node);

        if let Some(parent) = node.parent() {
            let is_name = child_by_field(parent, "name") == Some(node);
            match parent.kind() {
                "member_access_expression" if is_name => return self.resolve_member_access(parent),
                "member_binding_expression" if is_name => return self.resolve_member_binding(parent),
                "qualified_name" | "alias_qualified_name" if is_name => return SymbolInfo::none(),
                // Roslyn-style generic names own their identifier
                "generic_name" => return SymbolInfo::none(),
                "attribute" if is_name => return SymbolInfo::none(),
                "subpattern" | "property_pattern_clause" | "positional_pattern_clause" => {
                    return SymbolInfo::from_symbols(self.members_named(name, |s| {
                        matches!(s.kind, SymbolKind::Property | SymbolKind::Field)
                    }));
                }
                "assignment_expression" if child_by_field(parent, "left") == Some(node) => {
                    if let Some(info) = self.resolve_initializer_target(parent, name) {
                        return info;
                    }
                }
                _ => {}
            }
        }

        self.resolve_simple(node, name, Vec::new())
    }

    fn resolve_generic_name(&self, node: Node) -> SymbolInfo {
        if let Some(parent) = node.parent() {
            if child_by_field(parent, "name") == Some(node) {
                match parent.kind() {
                    "member_access_expression" => return self.resolve_member_access(parent),
                    "member_binding_expression" => return self.resolve_member_binding(parent),
                    "qualified_name" => return SymbolInfo::none(),
                    _ => {}
                }
            }
        }

        let (name, type_args) = self.name_parts(node);
        self.resolve_simple(node, name, type_args)
    }

    fn resolve_simple(&self, node: Node, name: &str, type_args: Vec<String>) -> SymbolInfo {
        if self.local_at(node, name).is_some() {
            return SymbolInfo::none();
        }
        let symbols = self.lookup_unqualified(name, node);
        self.finish(node, symbols, false, type_args)
    }

    fn resolve_member_access(&self, node: Node) -> SymbolInfo {
        let Some(name_node) = child_by_field(node, "name") else {
            return SymbolInfo::none();
        };
        let receiver = child_by_field(node, "expression");
        self.resolve_member(node, receiver, name_node)
    }

    fn resolve_member_binding(&self, node: Node) -> SymbolInfo {
        let Some(name_node) = child_by_field(node, "name")
            .or_else(|| named_children(node).into_iter().last())
        else {
            return SymbolInfo::none();
        };
        // `a?.B`: the receiver is the condition of the conditional access
        let receiver = enclosing(node, &["conditional_access_expression"]).and_then(|access| {
            child_by_field(access, "condition").or_else(|| named_children(access).into_iter().next())
        });
        self.resolve_member(node, receiver, name_node)
    }

    fn resolve_member(&self, access: Node, receiver: Option<Node>, name_node: Node) -> SymbolInfo {
        let (name, type_args) = self.name_parts(name_node);
        let table = self.compilation.symbol_table();

        let symbols = match receiver.and_then(|r| self.infer_type(r)) {
            Some(ty) => {
                let found = table.lookup_member(&ty.metadata_name, name);
                if found.is_empty() {
                    // Extension methods and members of external bases
                    self.members_named(name, |s| !s.is_constructor())
                } else {
                    found
                }
            }
            None => self.members_named(name, |s| !s.is_constructor()),
        };

        self.finish(access, symbols, true, type_args)
    }

    fn resolve_invocation(&self, node: Node) -> SymbolInfo {
        let Some(function) = child_by_field(node, "function")
            .or_else(|| named_children(node).into_iter().next())
        else {
            return SymbolInfo::none();
        };
        match function.kind() {
            "identifier" | "generic_name" | "member_access_expression"
            | "member_binding_expression" => self.symbol_info(function),
            "conditional_access_expression" => named_children(function)
                .into_iter()
                .find(|n| n.kind() == "member_binding_expression")
                .map(|binding| self.resolve_member_binding(binding))
                .unwrap_or_default(),
            _ => SymbolInfo::none(),
        }
    }

    fn resolve_object_creation(&self, node: Node) -> SymbolInfo {
        let Some(ty) = child_by_field(node, "type").and_then(|t| self.resolve_type_name(&render_name(t, self.source()), node))
        else {
            return SymbolInfo::none();
        };
        self.constructors(&ty, argument_count(node))
    }

    fn resolve_implicit_creation(&self, node: Node) -> SymbolInfo {
        let args = argument_count(node);
        match self.implicit_creation_type(node) {
            Some(ty) => self.constructors(&ty, args),
            None => {
                let symbols = self.members_named(".ctor", |s| s.accepts_arguments(args, 0));
                SymbolInfo::from_symbols(symbols)
            }
        }
    }

    fn resolve_attribute(&self, node: Node) -> SymbolInfo {
        let Some(name_node) = child_by_field(node, "name") else {
            return SymbolInfo::none();
        };
        let name = strip_generic_arguments(&render_name(name_node, self.source()));
        let ty = self
            .resolve_type_name(&format!("{}Attribute", name), node)
            .or_else(|| self.resolve_type_name(&name, node));
        let Some(ty) = ty else {
            return SymbolInfo::none();
        };

        let arguments: Vec<Node> = children_of_kind(node, "attribute_argument_list")
            .into_iter()
            .flat_map(|list| children_of_kind(list, "attribute_argument"))
            .collect();
        let positional = arguments
            .iter()
            .filter(|a| {
                children_of_kind(**a, "name_equals").is_empty()
                    && children_of_kind(**a, "name_colon").is_empty()
            })
            .count();

        let mut symbols = filter_by_arity(self.compilation.symbol_table().constructors_of(&ty.metadata_name), positional, false);

        // Named arguments assign properties of the attribute
        for argument in &arguments {
            for name_equals in children_of_kind(*argument, "name_equals") {
                if let Some(property) = named_children(name_equals).first() {
                    let found = self
                        .compilation
                        .symbol_table()
                        .lookup_member(&ty.metadata_name, self.text(*property));
                    symbols.extend(as_setters(found));
                }
            }
        }

        SymbolInfo::from_symbols(symbols)
    }

    fn resolve_constructor_initializer(&self, node: Node) -> SymbolInfo {
        let Some(own) = self.enclosing_type(node) else {
            return SymbolInfo::none();
        };

        let mut cursor = node.walk();
        let calls_base = node
            .children(&mut cursor)
            .any(|c| matches!(c.kind(), "base" | "base_expression"));

        let target = if calls_base {
            own.base_chain
                .iter()
                .find_map(|b| self.compilation.symbol_table().get_type(b).cloned())
        } else {
            Some(own)
        };

        match target {
            Some(ty) => self.constructors(&ty, argument_count(node)),
            None => SymbolInfo::none(),
        }
    }

    /// `new Foo { Name = x }`: `Name` is a member of the created type
    fn resolve_initializer_target(&self, assignment: Node, name: &str) -> Option<SymbolInfo> {
        let initializer = assignment.parent().filter(|p| p.kind() == "initializer_expression")?;
        let creation = initializer.parent()?;

        let ty = match creation.kind() {
            "object_creation_expression" => child_by_field(creation, "type")
                .and_then(|t| self.resolve_type_name(&render_name(t, self.source()), creation)),
            "implicit_object_creation_expression" => self.implicit_creation_type(creation),
            _ => return None,
        };

        let found = match ty {
            Some(ty) => self.compilation.symbol_table().lookup_member(&ty.metadata_name, name),
            None => self.members_named(name, |s| {
                matches!(s.kind, SymbolKind::Property | SymbolKind::Field)
            }),
        };
        Some(SymbolInfo::from_symbols(as_setters(found)))
    }

    /// Apply invocation arity, generic construction and setter mapping
    fn finish(
        &self,
        node: Node,
        symbols: Vec<Arc<Symbol>>,
        via_member_access: bool,
        type_args: Vec<String>,
    ) -> SymbolInfo {
        let mut symbols = symbols;

        if let Some(count) = invocation_arity(node) {
            symbols = filter_by_arity(symbols, count, via_member_access);
        }

        if !type_args.is_empty() {
            symbols = construct_generic(symbols, type_args);
        }

        if is_assignment_target(node) {
            symbols = as_setters(symbols);
        }

        SymbolInfo::from_symbols(symbols)
    }

    fn constructors(&self, ty: &TypeInfo, args: usize) -> SymbolInfo {
        let ctors = self.compilation.symbol_table().constructors_of(&ty.metadata_name);
        SymbolInfo::from_symbols(filter_by_arity(ctors, args, false))
    }

    fn members_named(&self, name: &str, keep: impl Fn(&Symbol) -> bool) -> Vec<Arc<Symbol>> {
        self.compilation
            .symbol_table()
            .find_members_by_name(name)
            .iter()
            .filter(|s| keep(s))
            .cloned()
            .collect()
    }

    /// Identifier text and rendered type arguments of a simple name
    fn name_parts(&self, node: Node) -> (&'c str, Vec<String>) {
        if node.kind() != "generic_name" {
            return (self.text(node), Vec::new());
        }
        let name = children_of_kind(node, "identifier")
            .first()
            .map(|n| self.text(*n))
            .unwrap_or("");
        let args = child_by_field(node, "type_arguments")
            .or_else(|| children_of_kind(node, "type_argument_list").into_iter().next())
            .map(|list| {
                named_children(list)
                    .into_iter()
                    .map(|a| render_name(a, self.source()))
                    .collect()
            })
            .unwrap_or_default();
        (name, args)
    }

    /// Members named `name` visible without qualification at `node`
    fn lookup_unqualified(&self, name: &str, node: Node) -> Vec<Arc<Symbol>> {
        let table = self.compilation.symbol_table();

        for ty in self.type_scope_chain(node) {
            let found = table.lookup_member(&ty.metadata_name, name);
            if !found.is_empty() {
                return found;
            }
        }

        for using in self.usings().filter(|u| u.parts.is_static && u.parts.alias.is_none()) {
            if let Some(ty) = self.resolve_type_name(&using.parts.target, node) {
                let found: Vec<Arc<Symbol>> = table
                    .lookup_member(&ty.metadata_name, name)
                    .into_iter()
                    .filter(|s| s.modifiers.is_static)
                    .collect();
                if !found.is_empty() {
                    return found;
                }
            }
        }

        Vec::new()
    }

    /// Static type of an expression when it is declared in source
    fn infer_type(&self, expr: Node) -> Option<Arc<TypeInfo>> {
        match expr.kind() {
            "this_expression" | "this" => self.enclosing_type(expr),
            "base_expression" | "base" => {
                let own = self.enclosing_type(expr)?;
                own.base_chain
                    .iter()
                    .find_map(|b| self.compilation.symbol_table().get_type(b).cloned())
            }
            "identifier" => {
                let name = self.text(expr);
                if let Some(declared) = self.local_at(expr, name) {
                    return declared
                        .as_ref()
                        .and_then(|ty| self.resolve_type_name(ty, expr));
                }
                let member = self
                    .lookup_unqualified(name, expr)
                    .into_iter()
                    .find(|s| matches!(s.kind, SymbolKind::Property | SymbolKind::Field));
                match member {
                    Some(member) => member
                        .declared_type
                        .as_ref()
                        .and_then(|ty| self.resolve_type_name(ty, expr)),
                    None => self.resolve_type_name(name, expr),
                }
            }
            "generic_name" | "qualified_name" | "predefined_type" => {
                self.resolve_type_name(&render_name(expr, self.source()), expr)
            }
            "member_access_expression" => {
                let info = self.resolve_member_access(expr);
                let member = info
                    .symbols()
                    .find(|s| matches!(s.kind, SymbolKind::Property | SymbolKind::Field))
                    .cloned();
                match member {
                    Some(member) => member
                        .declared_type
                        .as_ref()
                        .and_then(|ty| self.resolve_type_name(ty, expr)),
                    None => self.resolve_type_name(&render_name(expr, self.source()), expr),
                }
            }
            "object_creation_expression" | "cast_expression" => child_by_field(expr, "type")
                .and_then(|t| self.resolve_type_name(&render_name(t, self.source()), expr)),
            "parenthesized_expression" => named_children(expr)
                .into_iter()
                .next()
                .and_then(|inner| self.infer_type(inner)),
            "invocation_expression" => {
                let info = self.resolve_invocation(expr);
                let method = info.symbol.as_ref()?;
                if method.is_constructor() {
                    return None;
                }
                method
                    .declared_type
                    .as_ref()
                    .and_then(|ty| self.resolve_type_name(ty, expr))
            }
            _ => None,
        }
    }

    /// Target type of `new(...)` from its surrounding declaration or assignment
    fn implicit_creation_type(&self, node: Node) -> Option<Arc<TypeInfo>> {
        let mut parent = node.parent()?;
        if parent.kind() == "equals_value_clause" {
            parent = parent.parent()?;
        }

        let declared = match parent.kind() {
            "variable_declarator" => parent
                .parent()
                .and_then(|decl| child_by_field(decl, "type")),
            "property_declaration" => child_by_field(parent, "type"),
            "assignment_expression" => {
                let left = child_by_field(parent, "left")?;
                return self.infer_type(left);
            }
            "return_statement" | "arrow_expression_clause" => {
                enclosing(node, &["method_declaration", "property_declaration"]).and_then(|m| {
                    child_by_field(m, "returns").or_else(|| child_by_field(m, "type"))
                })
            }
            _ => None,
        }?;

        let text = render_name(declared, self.source());
        if text == "var" {
            return None;
        }
        self.resolve_type_name(&text, node)
    }

    /// Resolve a type name as written at `node` to a type declared in source
    pub fn resolve_type_name(&self, name: &str, node: Node) -> Option<Arc<TypeInfo>> {
        let name = strip_generic_arguments(name.trim_start_matches("global::"));
        let name = name.trim_end_matches(['?', '[', ']']);
        if name.is_empty() {
            return None;
        }
        let table = self.compilation.symbol_table();
        let namespaces = namespace_chain(&self.namespace_at(node));

        if let Some((head, rest)) = name.split_once('.') {
            if let Some(target) = self.alias_target(head) {
                let expanded = format!("{}.{}", target, rest);
                return table.find_by_display_name(&expanded).first().cloned();
            }
            for ns in &namespaces {
                if let Some(found) = table.find_by_display_name(&join_namespace(ns, name)).first() {
                    return Some(found.clone());
                }
            }
            for using in self.usings().filter(|u| u.parts.alias.is_none()) {
                let candidate = join_namespace(&using.parts.target, name);
                if let Some(found) = table.find_by_display_name(&candidate).first() {
                    return Some(found.clone());
                }
            }
            return None;
        }

        // Enclosing types and their nested types
        for ty in self.type_scope_chain(node) {
            if ty.name == name {
                return Some(ty);
            }
            if let Some(nested) = table.nested_types(&ty.metadata_name).into_iter().find(|t| t.name == name) {
                return Some(nested.clone());
            }
        }

        for ns in &namespaces {
            if let Some(found) = table.types_in_namespace(ns).iter().find(|t| t.name == name) {
                return Some(found.clone());
            }
        }

        for using in self.usings() {
            match (&using.parts.alias, using.parts.is_static) {
                (Some(alias), _) if alias == name => {
                    let target = strip_generic_arguments(&using.parts.target);
                    return table.find_by_display_name(&target).first().cloned();
                }
                (None, false) => {
                    if let Some(found) = table
                        .types_in_namespace(&using.parts.target)
                        .iter()
                        .find(|t| t.name == name)
                    {
                        return Some(found.clone());
                    }
                }
                _ => {}
            }
        }

        table.find_types_by_name(name).first().cloned()
    }

    fn alias_target(&self, alias: &str) -> Option<String> {
        self.usings()
            .find(|u| u.parts.alias.as_deref() == Some(alias))
            .map(|u| strip_generic_arguments(&u.parts.target))
    }

    /// Using directives of this file plus the project's global usings
    fn usings(&self) -> impl Iterator<Item = &'c UsingDecl> {
        self.unit
            .declarations
            .usings
            .iter()
            .chain(self.compilation.global_usings())
    }

    /// Innermost type declaration enclosing `node`
    fn enclosing_type(&self, node: Node) -> Option<Arc<TypeInfo>> {
        let decl = enclosing(node, TYPE_DECLARATION_KINDS)?;
        self.compilation
            .symbol_table()
            .type_declared_at(self.unit.tree.path(), decl.start_byte())
            .cloned()
    }

    /// Enclosing type followed by its outer types
    fn type_scope_chain(&self, node: Node) -> Vec<Arc<TypeInfo>> {
        let table = self.compilation.symbol_table();
        let mut chain = Vec::new();
        let mut current = self.enclosing_type(node);
        while let Some(ty) = current {
            current = ty
                .containing_type
                .as_ref()
                .and_then(|outer| table.get_type(outer).cloned());
            chain.push(ty);
        }
        chain
    }

    fn namespace_at(&self, node: Node) -> String {
        if let Some(ty) = self.enclosing_type(node) {
            return ty.namespace.clone();
        }

        let mut parts = Vec::new();
        let mut current = node.parent();
        while let Some(parent) = current {
            if parent.kind() == "namespace_declaration" {
                if let Some(name) = child_by_field(parent, "name") {
                    parts.push(render_name(name, self.source()));
                }
            }
            current = parent.parent();
        }
        parts.reverse();

        // Depending on grammar version the file-scoped namespace either wraps
        // the declarations after it or precedes them as a sibling
        let root = self.unit.tree.root();
        let file_scoped = enclosing(node, &["file_scoped_namespace_declaration"])
            .or_else(|| {
                children_of_kind(root, "file_scoped_namespace_declaration")
                    .into_iter()
                    .find(|ns| ns.start_byte() <= node.start_byte())
            })
            .and_then(|ns| child_by_field(ns, "name"))
            .map(|n| render_name(n, self.source()));

        let mut namespace = file_scoped.unwrap_or_default();
        for part in parts {
            namespace = join_namespace(&namespace, &part);
        }
        namespace
    }

    fn type_parameters_in_scope(&self, node: Node) -> HashSet<&'c str> {
        let mut names = HashSet::new();
        let mut current = node.parent();
        while let Some(parent) = current {
            for list in children_of_kind(parent, "type_parameter_list") {
                for param in children_of_kind(list, "type_parameter") {
                    let name = child_by_field(param, "name")
                        .or_else(|| children_of_kind(param, "identifier").into_iter().next());
                    if let Some(name) = name {
                        names.insert(self.text(name));
                    }
                }
            }
            current = parent.parent();
        }
        names
    }

    /// Local variables, parameters and other body-scoped names around `node`
    fn locals_for(&self, node: Node) -> Rc<Locals> {
        let root = self.unit.tree.root();
        let scope = enclosing(node, SCOPE_KINDS)
            .map(|s| if s.kind() == "global_statement" { root } else { s })
            .unwrap_or(root);

        if let Some(cached) = self.locals.borrow().get(&scope.id()) {
            return cached.clone();
        }

        let locals = Rc::new(self.collect_locals(scope));
        self.locals.borrow_mut().insert(scope.id(), locals.clone());
        locals
    }

    /// Declared type of the innermost local named `name` visible at `node`,
    /// `None` when no such local is in scope there
    fn local_at(&self, node: Node, name: &str) -> Option<Option<String>> {
        let locals = self.locals_for(node);
        let at = node.byte_range();
        locals
            .get(name)?
            .iter()
            .filter(|local| local.scope.start <= at.start && at.end <= local.scope.end)
            .min_by_key(|local| local.scope.len())
            .map(|local| local.declared_type.clone())
    }

    fn collect_locals(&self, scope: Node) -> Locals {
        let source = self.source();
        let root = self.unit.tree.root();
        let mut locals = Locals::new();

        // Top-level statements share one scope
        let range_of = |scope: Node| {
            if scope.kind() == "global_statement" {
                root.byte_range()
            } else {
                scope.byte_range()
            }
        };
        let scope_of = |node: Node| {
            enclosing(node, LOCAL_SCOPE_KINDS)
                .map(range_of)
                .unwrap_or_else(|| root.byte_range())
        };

        let mut declare = |name: &str, scope: Range<usize>, ty: Option<String>| {
            let ty = ty.filter(|t| t != "var");
            let declared = locals.entry(name.to_string()).or_default();
            match declared.iter_mut().find(|local| local.scope == scope) {
                Some(local) => {
                    if local.declared_type.is_none() {
                        local.declared_type = ty;
                    }
                }
                None => declared.push(Local { scope, declared_type: ty }),
            }
        };

        let typed = |node: Node| child_by_field(node, "type").map(|t| render_name(t, source));

        let top_level = scope.kind() == "compilation_unit";

        for node in descendants(scope) {
            // Top-level statements do not see the bodies of declared types
            if top_level
                && enclosing(node, SCOPE_KINDS)
                    .map(|s| s.kind() != "global_statement")
                    .unwrap_or(false)
            {
                continue;
            }

            match node.kind() {
                "variable_declarator" => {
                    let Some(declaration) = node.parent() else { continue };
                    let in_member = declaration
                        .parent()
                        .map(|p| matches!(p.kind(), "field_declaration" | "event_field_declaration"))
                        .unwrap_or(false);
                    if in_member {
                        continue;
                    }
                    if let Some(name) = declarator_name(node, source) {
                        let declared = typed(declaration).filter(|t| t != "var").or_else(|| {
                            descendants(node)
                                .find(|n| n.kind() == "object_creation_expression")
                                .and_then(|creation| typed(creation))
                        });
                        declare(&name, scope_of(node), declared);
                    }
                }
                "parameter" | "catch_declaration" | "declaration_pattern" | "declaration_expression" => {
                    if let Some(name) = child_by_field(node, "name") {
                        if name.kind() == "identifier" {
                            declare(node_text(name, source), scope_of(node), typed(node));
                        }
                    }
                }
                "parameter_list" => {
                    // `params T[] name` sits directly in the list
                    let mut cursor = node.walk();
                    let children: Vec<Node> = node.children(&mut cursor).collect();
                    if let Some(at) = children.iter().position(|c| c.kind() == "params") {
                        let rest = &children[at + 1..];
                        let ty = rest.iter().find(|c| c.kind() != "identifier" && c.is_named());
                        if let Some(name) = rest.iter().find(|c| c.kind() == "identifier") {
                            declare(
                                node_text(*name, source),
                                scope_of(node),
                                ty.map(|t| render_name(*t, source)),
                            );
                        }
                    }
                }
                "for_each_statement" => {
                    if let Some(left) = child_by_field(node, "left").filter(|l| l.kind() == "identifier") {
                        declare(node_text(left, source), range_of(node), typed(node));
                    }
                }
                "lambda_expression" => {
                    if let Some(param) = child_by_field(node, "parameters").filter(|p| p.kind() == "identifier") {
                        declare(node_text(param, source), range_of(node), None);
                    }
                }
                "local_function_statement" | "from_clause" | "let_clause" | "join_clause"
                | "join_into_clause" | "query_continuation" => {
                    if let Some(name) = child_by_field(node, "name") {
                        declare(node_text(name, source), scope_of(node), typed(node));
                    }
                }
                "single_variable_designation" | "parenthesized_variable_designation"
                | "tuple_pattern" | "implicit_parameter" => {
                    if node.kind() == "implicit_parameter" {
                        declare(node_text(node, source), scope_of(node), None);
                    }
                    for child in children_of_kind(node, "identifier") {
                        declare(node_text(child, source), scope_of(node), None);
                    }
                }
                _ => {}
            }
        }

        locals
    }
}

/// Argument count of an invocation whose callee is `node`
fn invocation_arity(node: Node) -> Option<usize> {
    let parent = node.parent()?;
    if parent.kind() == "invocation_expression" && child_by_field(parent, "function") == Some(node) {
        return Some(argument_count(parent));
    }
    None
}

/// Number of arguments passed by a call-like node
fn argument_count(node: Node) -> usize {
    child_by_field(node, "arguments")
        .or_else(|| children_of_kind(node, "argument_list").into_iter().next())
        .map(|list| children_of_kind(list, "argument").len())
        .unwrap_or(0)
}

fn is_assignment_target(node: Node) -> bool {
    node.parent()
        .map(|p| p.kind() == "assignment_expression" && child_by_field(p, "left") == Some(node))
        .unwrap_or(false)
}

/// Keep the overloads accepting `count` arguments, when any does
fn filter_by_arity(symbols: Vec<Arc<Symbol>>, count: usize, via_member_access: bool) -> Vec<Arc<Symbol>> {
    let accepts = |s: &Symbol| {
        let receiver = usize::from(via_member_access && s.modifiers.is_extension);
        s.accepts_arguments(count, receiver)
    };

    let any_method_matches = symbols
        .iter()
        .any(|s| s.kind == SymbolKind::Method && accepts(s));
    if !any_method_matches {
        return symbols;
    }

    symbols
        .into_iter()
        .filter(|s| s.kind != SymbolKind::Method || accepts(s))
        .collect()
}

/// Construct generic methods with explicit type arguments
fn construct_generic(symbols: Vec<Arc<Symbol>>, type_args: Vec<String>) -> Vec<Arc<Symbol>> {
    let arity_matches = symbols
        .iter()
        .any(|s| s.is_generic_method() && s.type_parameter_count == type_args.len());

    symbols
        .into_iter()
        .map(|s| {
            let constructible = s.is_generic_method()
                && (!arity_matches || s.type_parameter_count == type_args.len());
            if constructible {
                Arc::new(Symbol::construct(&s, type_args.clone()))
            } else {
                s
            }
        })
        .collect()
}

/// Properties used as assignment targets resolve to their setter
fn as_setters(symbols: Vec<Arc<Symbol>>) -> Vec<Arc<Symbol>> {
    symbols
        .into_iter()
        .map(|s| {
            if s.kind == SymbolKind::Property {
                Arc::new(Symbol::accessor(&s, MethodKind::PropertySet))
            } else {
                s
            }
        })
        .collect()
}

/// `A.B.C` -> [`A.B.C`, `A.B`, `A`, ``]
fn namespace_chain(namespace: &str) -> Vec<String> {
    let mut chain = Vec::new();
    let mut current = namespace.to_string();
    loop {
        chain.push(current.clone());
        match current.rfind('.') {
            Some(index) => current.truncate(index),
            None if !current.is_empty() => current.clear(),
            None => break,
        }
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::CompilationUnit;
    use crate::parser::{CSharpBinder, SyntaxTree};

    fn compile(sources: &[(&str, &str)]) -> Compilation {
        let units = sources
            .iter()
            .map(|(path, text)| {
                let tree = Arc::new(SyntaxTree::parse(*path, *text).unwrap());
                let declarations = Arc::new(CSharpBinder::new(&tree).bind());
                CompilationUnit { tree, declarations }
            })
            .collect();
        Compilation::new("Test", units, &[])
    }

    /// Every resolved symbol in the first tree, accessors and constructed
    /// methods left as the model returns them
    fn resolved(compilation: &Compilation) -> Vec<Arc<Symbol>> {
        let model = compilation.semantic_model(0).unwrap();
        let tree = &compilation.units()[0].tree;
        descendants(tree.root())
            .flat_map(|node| model.symbol_info(node).symbols().cloned().collect::<Vec<_>>())
            .collect()
    }

    fn names(symbols: &[Arc<Symbol>]) -> Vec<String> {
        symbols.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_namespace_chain() {
        assert_eq!(namespace_chain("A.B"), vec!["A.B", "A", ""]);
        assert_eq!(namespace_chain(""), vec![""]);
    }

    #[test]
    fn test_unqualified_call_resolves_in_containing_type() {
        let compilation = compile(&[(
            "A.cs",
            "class A { void Run() { Helper(); } void Helper() {} void Unused() {} }",
        )]);
        let names = names(&resolved(&compilation));
        assert!(names.contains(&"Helper".to_string()));
        assert!(!names.contains(&"Unused".to_string()));
        assert!(!names.contains(&"Run".to_string()));
    }

    #[test]
    fn test_locals_shadow_members() {
        let compilation = compile(&[(
            "A.cs",
            "class A { int count; void Run() { var count = 1; count++; } }",
        )]);
        assert!(!names(&resolved(&compilation)).contains(&"count".to_string()));
    }

    #[test]
    fn test_lambda_parameter_does_not_shadow_outside_the_lambda() {
        let compilation = compile(&[(
            "A.cs",
            "class A { int count; int Run(System.Collections.Generic.List<int> xs) { xs.ForEach(count => Use(count)); return count; } void Use(int n) {} }",
        )]);
        let counts = names(&resolved(&compilation))
            .into_iter()
            .filter(|n| n == "count")
            .count();
        assert_eq!(counts, 1);
    }

    #[test]
    fn test_block_local_does_not_shadow_after_the_block() {
        let compilation = compile(&[(
            "A.cs",
            "class A { int total; int Run(bool b) { if (b) { var total = 2; total++; } return total; } }",
        )]);
        let totals = names(&resolved(&compilation))
            .into_iter()
            .filter(|n| n == "total")
            .count();
        assert_eq!(totals, 1);
    }

    #[test]
    fn test_params_array_is_a_local() {
        let compilation = compile(&[(
            "A.cs",
            "class A { int[] values; int Sum(params int[] values) => values.Length; }",
        )]);
        assert!(!names(&resolved(&compilation)).contains(&"values".to_string()));
    }

    #[test]
    fn test_overloads_are_filtered_by_arity() {
        let compilation = compile(&[(
            "A.cs",
            "class A { void Run() { Log(\"x\"); } void Log(string m) {} void Log(string m, int l) {} }",
        )]);
        let logs: Vec<_> = resolved(&compilation)
            .into_iter()
            .filter(|s| s.name == "Log")
            .collect();
        assert!(!logs.is_empty());
        assert!(logs.iter().all(|s| s.parameters.len() == 1));
    }

    #[test]
    fn test_optional_parameters_keep_overload_candidates() {
        let compilation = compile(&[(
            "A.cs",
            "class W { void Run() { Write(\"x\"); } void Write(int n) {} void Write(string s, int pad = 0) {} void Write() {} }",
        )]);
        let writes: Vec<_> = resolved(&compilation)
            .into_iter()
            .filter(|s| s.name == "Write")
            .map(|s| s.parameters.len())
            .collect();
        assert!(writes.contains(&2));
        assert!(!writes.contains(&0));
    }

    #[test]
    fn test_params_array_accepts_any_argument_count() {
        let compilation = compile(&[(
            "A.cs",
            "class L { void Run() { Log(); Log(1, 2, 3); } void Log(params int[] values) {} void Log(int a, int b) {} }",
        )]);
        let logs: Vec<_> = resolved(&compilation)
            .into_iter()
            .filter(|s| s.name == "Log")
            .collect();
        assert!(!logs.is_empty());
        assert!(logs.iter().all(|s| s.parameters.len() == 1 && s.parameters[0].is_params));
    }

    #[test]
    fn test_member_access_uses_receiver_type() {
        let compilation = compile(&[(
            "A.cs",
            r#"
class Repo { public void Save() {} }
class Cache { public void Save() {} }
class Service
{
    private readonly Repo _repo = new Repo();
    void Run() { _repo.Save(); }
}
"#,
        )]);
        let saves: Vec<_> = resolved(&compilation)
            .into_iter()
            .filter(|s| s.name == "Save")
            .collect();
        assert!(!saves.is_empty());
        assert!(saves.iter().all(|s| s.id.container == "Repo"));
    }

    #[test]
    fn test_unknown_receiver_falls_back_to_all_candidates() {
        let compilation = compile(&[(
            "A.cs",
            r#"
class Repo { public void Save() {} }
class Cache { public void Save() {} }
class Service { void Run(dynamic x) { x.Save(); } }
"#,
        )]);
        let containers: HashSet<String> = resolved(&compilation)
            .into_iter()
            .filter(|s| s.name == "Save")
            .map(|s| s.id.container.clone())
            .collect();
        assert!(containers.contains("Repo"));
        assert!(containers.contains("Cache"));
    }

    #[test]
    fn test_property_assignment_yields_setter() {
        let compilation = compile(&[(
            "A.cs",
            "class A { int Total { get; set; } void Run() { Total = 3; } }",
        )]);
        let symbols = resolved(&compilation);
        let setter = symbols.iter().find(|s| s.name == "set_Total").unwrap();
        assert!(setter.is_accessor());
        assert_eq!(setter.clone().unwrap_accessor().name, "Total");
    }

    #[test]
    fn test_generic_call_yields_constructed_method() {
        let compilation = compile(&[(
            "A.cs",
            "class A { T Get<T>() => default; void Run() { Get<int>(); } }",
        )]);
        let get = resolved(&compilation)
            .into_iter()
            .find(|s| s.name == "Get")
            .unwrap();
        assert!(!get.is_definition());
        assert_eq!(get.type_arguments, vec!["int".to_string()]);
        assert!(get.unwrap_constructed().is_definition());
    }

    #[test]
    fn test_object_creation_and_initializer() {
        let compilation = compile(&[(
            "A.cs",
            r#"
class User
{
    private User(int id) {}
    public User() {}
    public string Name { get; set; }
}
class Factory { User Make() => new User { Name = "x" }; }
"#,
        )]);
        let symbols = resolved(&compilation);
        let ctors: Vec<_> = symbols.iter().filter(|s| s.is_constructor()).collect();
        assert_eq!(ctors.len(), 1);
        assert!(ctors[0].parameters.is_empty());
        assert!(symbols.iter().any(|s| s.name == "set_Name"));
    }

    #[test]
    fn test_constructor_initializer_resolves() {
        let compilation = compile(&[(
            "A.cs",
            "class A { private A(int x) {} public A() : this(1) {} }",
        )]);
        let ctors: Vec<_> = resolved(&compilation)
            .into_iter()
            .filter(|s| s.is_constructor())
            .collect();
        assert_eq!(ctors.len(), 1);
        assert_eq!(ctors[0].parameters.len(), 1);
    }

    #[test]
    fn test_using_static_members_resolve() {
        let compilation = compile(&[
            (
                "Program.cs",
                "using static App.Guards;\nnamespace App { class P { void Run() { NotNull(1); } } }",
            ),
            (
                "Guards.cs",
                "namespace App { static class Guards { public static void NotNull(object o) {} } }",
            ),
        ]);
        assert!(names(&resolved(&compilation)).contains(&"NotNull".to_string()));
    }

    #[test]
    fn test_declared_symbol_by_node() {
        let compilation = compile(&[("A.cs", "class A { int a, b; void M() {} }")]);
        let model = compilation.semantic_model(0).unwrap();
        let tree = &compilation.units()[0].tree;

        let declared: Vec<String> = descendants(tree.root())
            .filter_map(|n| model.declared_symbol(n))
            .map(|s| s.name.clone())
            .collect();
        assert_eq!(declared, vec!["a", "b", "M"]);
    }
}
