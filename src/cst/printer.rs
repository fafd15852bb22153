//! Debug rendering of a syntax tree.

use super::{Child, NodeId, SyntaxTree};
use crate::token::TokenKind;

/// Render the tree as an indented kind-per-line dump.
///
/// Token leaves print as `KIND "text"`; whitespace leaves are elided to keep
/// dumps readable (they still round-trip through [`SyntaxTree::text`]).
pub fn dump_tree(tree: &SyntaxTree) -> String {
    let mut printer = TreePrinter {
        tree,
        indent_level: 0,
        output: String::new(),
    };
    printer.print_node(tree.root());
    printer.output
}

struct TreePrinter<'a> {
    tree: &'a SyntaxTree,
    indent_level: usize,
    output: String,
}

impl TreePrinter<'_> {
    fn print_node(&mut self, id: NodeId) {
        self.writeln(&format!("{:?}", self.tree.kind(id)));
        self.indent_level += 2;
        for child in self.tree.children(id).to_vec() {
            match child {
                Child::Node(node) => self.print_node(node),
                Child::Token(index) => {
                    let token = self.tree.token(index);
                    if token.kind != TokenKind::Whitespace {
                        self.writeln(&format!("{:?} {:?}", token.kind, token.text));
                    }
                }
            }
        }
        self.indent_level -= 2;
    }

    fn writeln(&mut self, line: &str) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
        self.output.push_str(line);
        self.output.push('\n');
    }
}
