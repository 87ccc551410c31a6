use crate::error::Result;
use std::path::{Path, PathBuf};
use tree_sitter::{Node, Parser as TsParser, Tree};

/// One parsed C# compilation unit
#[derive(Debug)]
pub struct SyntaxTree {
    path: PathBuf,
    text: String,
    tree: Tree,
}

impl SyntaxTree {
    /// Parse `text` as C#. Malformed input still yields a tree with error nodes.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self> {
        let path = path.into();
        let text = text.into();

        let mut parser = TsParser::new();
        parser.set_language(&tree_sitter_c_sharp::language())?;

        let tree = parser.parse(&text, None).ok_or_else(|| {
            crate::error::Error::ProjectLoad {
                path: path.clone(),
                reason: "parser returned no tree".to_string(),
            }
        })?;

        Ok(Self { path, text, tree })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Text covered by `node`
    pub fn node_text<'a>(&'a self, node: Node<'a>) -> &'a str {
        node_text(node, &self.text)
    }
}

/// Extract text from a node
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// 1-based line on which `node` starts
pub fn line_of(node: Node) -> usize {
    node.start_position().row + 1
}

/// Find child node by field name
pub fn child_by_field<'a>(node: Node<'a>, field: &str) -> Option<Node<'a>> {
    node.child_by_field_name(field)
}

/// Find all children of a specific kind
pub fn children_of_kind<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// All named children of a node
pub fn named_children(node: Node) -> Vec<Node> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Closest ancestor (excluding `node`) whose kind is in `kinds`
pub fn enclosing<'a>(node: Node<'a>, kinds: &[&str]) -> Option<Node<'a>> {
    let mut current = node.parent();
    while let Some(parent) = current {
        if kinds.contains(&parent.kind()) {
            return Some(parent);
        }
        current = parent.parent();
    }
    None
}

/// Iterator over all descendant nodes
pub fn descendants(node: Node) -> impl Iterator<Item = Node> {
    DescendantIterator::new(node)
}

struct DescendantIterator<'a> {
    cursor: tree_sitter::TreeCursor<'a>,
    done: bool,
}

impl<'a> DescendantIterator<'a> {
    fn new(node: Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'a> Iterator for DescendantIterator<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        // Try to go to first child
        if self.cursor.goto_first_child() {
            return Some(node);
        }

        // Try to go to next sibling
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }

            // Go up to parent
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}
