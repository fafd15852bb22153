//! Expression grammar: a 13-level precedence chain.
//!
//! Every binary level is `lower (op lower)*`, written iteratively so long
//! operator chains cost loop iterations, not stack frames. Each level closes
//! its marker in collapse mode: a level that contributes no operator
//! disappears, and a level that does contribute produces one flat
//! `Expression` node whose children alternate operand / operator. Consumers
//! rely on that flat shape.

use super::builder::Parser;
use super::{operand, preproc};
use crate::cst::NodeKind;
use crate::token::TokenKind;

/// `comparison_expr [wrt_suffix]`
pub(super) fn expression(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !comparison_expr(p, level + 1) {
        return p.rollback(m);
    }
    wrt_suffix(p, level + 1);
    p.close_collapse(m, NodeKind::Expression);
    true
}

/// Alias kept for rules that read better asking for a constant expression.
pub(super) fn const_expr(p: &mut Parser, level: u32) -> bool {
    expression(p, level)
}

/// `WRT (symbol_ref | WRT_SUFFIX)`, pinned on `wrt`.
fn wrt_suffix(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) || !p.at(TokenKind::Wrt) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !symbol_ref(p, level + 1) && !p.eat(TokenKind::WrtSuffix) {
        p.error("expected symbol after `wrt`");
    }
    p.abandon(m);
    true
}

fn binary_chain(
    p: &mut Parser,
    level: u32,
    lower: fn(&mut Parser, u32) -> bool,
    is_op: fn(TokenKind) -> bool,
) -> bool {
    let m = p.open();
    if !lower(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if is_op(p.current()) {
            p.bump();
            if lower(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close_collapse(m, NodeKind::Expression);
    true
}

pub(super) fn comparison_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, logical_or_expr, TokenKind::is_comparison_op)
}

fn logical_or_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, logical_xor_expr, |k| k == TokenKind::BooleanOr)
}

fn logical_xor_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, logical_and_expr, |k| k == TokenKind::BooleanXor)
}

fn logical_and_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, or_expr, |k| k == TokenKind::BooleanAnd)
}

fn or_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, xor_expr, |k| k == TokenKind::Pipe)
}

fn xor_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, and_expr, |k| k == TokenKind::Caret)
}

fn and_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, shift_expr, |k| k == TokenKind::Amp)
}

fn shift_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, add_expr, TokenKind::is_shift_op)
}

fn add_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level)
        && binary_chain(p, level, mul_expr, |k| {
            k == TokenKind::Plus || k == TokenKind::Minus
        })
}

fn mul_expr(p: &mut Parser, level: u32) -> bool {
    p.guard(level) && binary_chain(p, level, unary_expr, TokenKind::is_mul_op)
}

/// `unary_op unary_expr | postfix_expr`
fn unary_expr(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    if p.current().is_unary_op() {
        let m = p.open();
        p.bump();
        if unary_expr(p, level + 1) {
            p.close_collapse(m, NodeKind::Expression);
            return true;
        }
        p.rollback(m);
    }
    postfix_expr(p, level)
}

/// `atom_expr (PASTE_OP atom_expr)*` — always wraps in an `Expression` node,
/// which is what the collapse levels above it fold onto.
fn postfix_expr(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !atom_expr(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::PasteOp) {
            p.bump();
            if atom_expr(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::Expression);
    true
}

/// Atom alternatives, in binding order. Several start with the same
/// lookahead token class; the order decides how far each may commit.
pub(super) fn atom_expr(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = paren_expr(p, level + 1)
        || brace_sequence(p, level + 1)
        || preproc::function_macro_call(p, level + 1)
        || preproc::builtin_function(p, level + 1)
        || preproc::macro_expansion(p, level + 1)
        || preproc::env_var_ref(p, level + 1)
        || float_format(p, level + 1)
        || operand::register(p, level + 1)
        || symbol_ref(p, level + 1)
        || p.eat(TokenKind::Number)
        || p.eat(TokenKind::String)
        || p.eat(TokenKind::Float)
        || p.eat(TokenKind::SpecialFloat);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::AtomExpr);
    true
}

/// `LPAREN expression RPAREN`
fn paren_expr(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::LParen) {
        return false;
    }
    let m = p.open();
    p.bump();
    if expression(p, level + 1) && p.eat(TokenKind::RParen) {
        p.abandon(m);
        true
    } else {
        p.rollback(m)
    }
}

/// `LBRACE brace_token_sequence RBRACE` — an unevaluated token run handed
/// through to macro machinery.
fn brace_sequence(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::LBrace) {
        return false;
    }
    let m = p.open();
    p.bump();
    if preproc::brace_token_sequence(p, level + 1) && p.eat(TokenKind::RBrace) {
        p.abandon(m);
        true
    } else {
        p.rollback(m)
    }
}

/// `FLOAT_FUNC LPAREN float_value RPAREN`, pinned after the paren.
fn float_format(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::FloatFunc) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::LParen) {
        return p.rollback(m);
    }
    if !float_value(p, level + 1) {
        p.error("expected float value");
    }
    p.expect(TokenKind::RParen);
    p.close(m, NodeKind::FloatFormat);
    true
}

fn float_value(p: &mut Parser, _level: u32) -> bool {
    if !p.at_any(&[
        TokenKind::Float,
        TokenKind::Number,
        TokenKind::SpecialFloat,
    ]) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::FloatValue);
    true
}

/// `macro_param_concat | IDENTIFIER | local_label | special_symbol |
/// macro_param_ref | context_local_ref`
pub(super) fn symbol_ref(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = preproc::macro_param_concat(p, level + 1)
        || p.eat(TokenKind::Identifier)
        || local_label(p, level + 1)
        || special_symbol(p, level + 1)
        || preproc::macro_param_ref(p, level + 1)
        || preproc::context_local_ref(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::SymbolRef);
    true
}

/// `DOT_DOT? IDENTIFIER | MACRO_LOCAL_REF`
pub(super) fn local_label(p: &mut Parser, _level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::MacroLocalRef) {
        p.close(m, NodeKind::LocalLabel);
        return true;
    }
    p.eat(TokenKind::DotDot);
    if !p.eat(TokenKind::Identifier) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::LocalLabel);
    true
}

/// `DOLLAR | DOUBLE_DOLLAR | CONTEXT_LOCAL_REF`
fn special_symbol(p: &mut Parser, _level: u32) -> bool {
    if !p.at_any(&[
        TokenKind::Dollar,
        TokenKind::DoubleDollar,
        TokenKind::ContextLocalRef,
    ]) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::SpecialSymbol);
    true
}
