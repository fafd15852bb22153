//! Concrete syntax tree representation.
//!
//! Nodes live in a single arena owned by [`SyntaxTree`] and are addressed by
//! integer [`NodeId`] handles; children are an ordered mix of child nodes and
//! token leaves. The leaf sequence of the whole tree, read in order,
//! reproduces the original token stream exactly.

mod kind;
mod printer;

pub use kind::NodeKind;
pub use printer::dump_tree;

use crate::token::Token;

/// Handle of a node inside a [`SyntaxTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An ordered child of a node: either a nested node or a token leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Node(NodeId),
    /// Index into the tree's token vector
    Token(u32),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<Child>,
}

/// The parse output: a node-labeled, token-leaved ordered tree spanning the
/// entire input without gaps.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) tokens: Vec<Token>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.index()].kind
    }

    pub fn children(&self, id: NodeId) -> &[Child] {
        &self.nodes[id.index()].children
    }

    /// Child nodes of `id`, skipping token leaves.
    pub fn child_nodes(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id.index()]
            .children
            .iter()
            .filter_map(|child| match child {
                Child::Node(node) => Some(*node),
                Child::Token(_) => None,
            })
    }

    pub fn token(&self, index: u32) -> &Token {
        &self.tokens[index as usize]
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// All token leaves under `id`, in order.
    pub fn node_tokens(&self, id: NodeId) -> Vec<&Token> {
        let mut out = Vec::new();
        self.collect_tokens(id, &mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, id: NodeId, out: &mut Vec<&'a Token>) {
        for child in &self.nodes[id.index()].children {
            match child {
                Child::Node(node) => self.collect_tokens(*node, out),
                Child::Token(tok) => out.push(&self.tokens[*tok as usize]),
            }
        }
    }

    /// Concatenated leaf text under `id`.
    pub fn node_text(&self, id: NodeId) -> String {
        let mut text = String::new();
        for token in self.node_tokens(id) {
            text.push_str(&token.text);
        }
        text
    }

    /// Full round-trip text of the tree.
    pub fn text(&self) -> String {
        self.node_text(self.root)
    }

    /// Depth-first search for the first node of `kind`.
    pub fn find(&self, kind: NodeKind) -> Option<NodeId> {
        self.find_from(self.root, kind)
    }

    fn find_from(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        if self.kind(id) == kind {
            return Some(id);
        }
        for child in self.child_nodes(id).collect::<Vec<_>>() {
            if let Some(found) = self.find_from(child, kind) {
                return Some(found);
            }
        }
        None
    }

    /// All nodes of `kind`, in document order.
    pub fn find_all(&self, kind: NodeKind) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_kind(self.root, kind, &mut out);
        out
    }

    fn collect_kind(&self, id: NodeId, kind: NodeKind, out: &mut Vec<NodeId>) {
        if self.kind(id) == kind {
            out.push(id);
        }
        for child in self.child_nodes(id).collect::<Vec<_>>() {
            self.collect_kind(child, kind, out);
        }
    }
}
