//! nasm-syntax
//!
//! An error-tolerant concrete-syntax-tree parser for a NASM-family assembly
//! dialect, including its full macro-preprocessor language (conditional
//! assembly, single- and multi-line macros, context stacks, repeat and
//! structure blocks, builtin functions).
//!
//! ## Architecture
//!
//! The crate consumes an already-classified token stream and produces a
//! lossless concrete syntax tree:
//!
//! - **token**: the input contract — [`Token`], [`TokenKind`], [`Location`]
//! - **parser**: the grammar rules and the marker/backtracking engine
//! - **cst**: the output — arena-backed [`SyntaxTree`] with [`NodeKind`]
//!   labels and token leaves
//! - **error**: [`Diagnostic`] annotations and the strict-mode [`Error`]
//! - **config**: [`ParseConfig`] recursion and error limits
//!
//! ## Flow
//!
//! ```text
//! Vec<Token> → parse_program → Parse { SyntaxTree, Vec<Diagnostic> }
//! ```
//!
//! Parsing never fails: malformed input degrades to a best-effort tree with
//! positioned diagnostics, and the tree's leaf sequence always reproduces
//! the input token stream exactly. Lexing, macro expansion, constant
//! evaluation and instruction encoding are out of scope; the lexer is an
//! external collaborator and downstream tools walk the tree.

pub mod config;
pub mod cst;
pub mod error;
pub mod parser;
pub mod token;

pub use config::ParseConfig;
pub use cst::{dump_tree, Child, NodeId, NodeKind, SyntaxTree};
pub use error::{Diagnostic, Error, Result};
pub use parser::{parse_program, parse_program_with, parse_strict, Parse};
pub use token::{Location, Token, TokenKind};
