//! The parsing engine.
//!
//! Grammar rules are plain functions over a [`builder::Parser`] value; the
//! modules mirror the grammar's rule groups:
//!
//! - **builder**: marker/event engine, backtracking, diagnostics
//! - **expr**: the 13-level expression precedence chain
//! - **operand**: operands, memory references, decorators
//! - **directive**: pseudo-instructions and assembler directives
//! - **preproc**: macro and preprocessor forms, token runs
//! - **line**: per-line dispatch, block constructs, the program rule

mod builder;
mod directive;
mod expr;
mod line;
mod operand;
mod preproc;

use crate::config::ParseConfig;
use crate::cst::SyntaxTree;
use crate::error::{Diagnostic, Result};
use crate::token::Token;

/// The outcome of one parse: a best-effort tree plus zero or more
/// positioned diagnostics. The tree is always produced and always spans the
/// full token stream.
#[derive(Debug, Clone)]
pub struct Parse {
    pub tree: SyntaxTree,
    pub errors: Vec<Diagnostic>,
}

impl Parse {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse a token stream with the default configuration.
pub fn parse_program(tokens: Vec<Token>) -> Parse {
    parse_program_with(tokens, &ParseConfig::default())
}

/// Parse a token stream with explicit limits.
pub fn parse_program_with(tokens: Vec<Token>, config: &ParseConfig) -> Parse {
    log::debug!("parsing {} tokens", tokens.len());
    let mut parser = builder::Parser::new(tokens, config.clone());
    line::program(&mut parser);
    let (tree, errors) = parser.finish();
    log::debug!("parse complete, {} diagnostics", errors.len());
    Parse { tree, errors }
}

/// Parse a token stream, promoting the first diagnostic to a hard error.
///
/// Error tolerance is the library default; this wrapper is for callers that
/// want any syntax error to fail the whole operation.
pub fn parse_strict(tokens: Vec<Token>) -> Result<SyntaxTree> {
    let parse = parse_program(tokens);
    match parse.errors.into_iter().next() {
        Some(diagnostic) => Err(diagnostic.into()),
        None => Ok(parse.tree),
    }
}
