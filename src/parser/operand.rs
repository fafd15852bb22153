//! Operand and addressing-mode grammar.
//!
//! An operand is a sized/plain expression, a memory reference, a conditional
//! operand, a far-jump pair, or a register, followed by zero or more
//! decorators — or, for destination-only masking forms, decorators with no
//! base operand at all. Memory references wrap an effective address: an
//! additive chain of scaled registers, RIP-relative symbols, constants and
//! symbols.

use super::builder::Parser;
use super::{expr, preproc};
use crate::cst::NodeKind;
use crate::token::TokenKind;

/// `REGISTER | SEG_REGISTER | MASK_REG` (transparent token consume)
pub(super) fn register(p: &mut Parser, _level: u32) -> bool {
    if !p.current().is_register() {
        return false;
    }
    p.bump();
    true
}

/// `operand (COMMA operand?)*`, pinned after the first operand.
pub(super) fn operand_list(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !operand(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        if !operand_tail(p, level + 1) {
            break;
        }
    }
    p.close(m, NodeKind::OperandList);
    true
}

/// `COMMA operand?` — a trailing comma is tolerated, a malformed operand
/// after a comma is not silently re-interpreted.
fn operand_tail(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::Comma) {
        return false;
    }
    let m = p.open();
    p.bump();
    operand(p, level + 1);
    p.abandon(m);
    true
}

/// `expanded_operand decorator* | decorator+`
pub(super) fn operand(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if expanded_operand(p, level + 1) {
        while decorator(p, level + 1) {}
        p.close(m, NodeKind::Operand);
        return true;
    }
    if !decorator(p, level + 1) {
        return p.rollback(m);
    }
    while decorator(p, level + 1) {}
    p.close(m, NodeKind::Operand);
    true
}

/// Operand body alternatives, in binding order. Memory expressions are tried
/// before plain expressions, registers before expressions; the order is what
/// keeps shared-prefix forms deterministic.
fn expanded_operand(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = sized_operand(p, level + 1)
        || memory_expr(p, level + 1)
        || conditional_operand(p, level + 1)
        || far_jump_operand(p, level + 1)
        || register(p, level + 1)
        || expr::const_expr(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::ExpandedOperand);
    true
}

/// `SIZE_SPEC const_expr | SIZE_SPEC register` (transparent)
fn sized_operand(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::SizeSpec) {
        return false;
    }
    let m = p.open();
    p.bump();
    if expr::const_expr(p, level + 1) || register(p, level + 1) {
        p.abandon(m);
        true
    } else {
        p.rollback(m)
    }
}

/// `const_expr COLON const_expr` — far jump target, pinned on the colon.
fn far_jump_operand(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !expr::const_expr(p, level + 1) || !p.eat(TokenKind::Colon) {
        return p.rollback(m);
    }
    if !expr::const_expr(p, level + 1) {
        p.error("expected offset after `:`");
    }
    p.abandon(m);
    true
}

/// `%if`-wrapped per-branch operands, pinned on `%if`.
fn conditional_operand(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroIf) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !preproc::condition(p, level + 1) {
        p.error("expected condition");
    }
    p.expect(TokenKind::Crlf);
    if !operand(p, level + 1) {
        p.error("expected operand");
    }
    p.expect(TokenKind::Crlf);
    loop {
        let branch = p.open();
        if p.eat(TokenKind::MacroElif)
            && preproc::condition(p, level + 1)
            && p.eat(TokenKind::Crlf)
            && operand(p, level + 1)
            && p.eat(TokenKind::Crlf)
        {
            p.abandon(branch);
            continue;
        }
        p.rollback(branch);
        break;
    }
    let else_branch = p.open();
    if p.eat(TokenKind::MacroElse)
        && p.eat(TokenKind::Crlf)
        && operand(p, level + 1)
        && p.eat(TokenKind::Crlf)
    {
        p.abandon(else_branch);
    } else {
        p.rollback(else_branch);
    }
    p.expect(TokenKind::MacroEndif);
    p.close(m, NodeKind::ConditionalOperand);
    true
}

// --- memory references ---------------------------------------------------

/// `size_spec memory_ref | segment_override memory_ref | memory_ref`
fn memory_expr(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let with_size = p.open();
    if size_spec(p, level + 1) && memory_ref(p, level + 1) {
        p.abandon(with_size);
        p.close(m, NodeKind::MemoryExpr);
        return true;
    }
    p.rollback(with_size);
    let with_segment = p.open();
    if segment_override(p, level + 1) && memory_ref(p, level + 1) {
        p.abandon(with_segment);
        p.close(m, NodeKind::MemoryExpr);
        return true;
    }
    p.rollback(with_segment);
    if memory_ref(p, level + 1) {
        p.close(m, NodeKind::MemoryExpr);
        return true;
    }
    p.rollback(m)
}

/// `SIZE_SPEC SIZE_SPEC*` (transparent)
fn size_spec(p: &mut Parser, _level: u32) -> bool {
    if !p.eat(TokenKind::SizeSpec) {
        return false;
    }
    while p.eat(TokenKind::SizeSpec) {}
    true
}

/// `segment_reg COLON`
pub(super) fn segment_override(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if segment_reg(p, level + 1) && p.eat(TokenKind::Colon) {
        p.close(m, NodeKind::SegmentOverride);
        true
    } else {
        p.rollback(m)
    }
}

fn segment_reg(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::SegRegister) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::SegmentReg);
    true
}

/// `LBRACKET effective_addr RBRACKET`
fn memory_ref(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::LBracket) {
        return false;
    }
    let m = p.open();
    p.bump();
    if effective_addr(p, level + 1) && p.eat(TokenKind::RBracket) {
        p.close(m, NodeKind::MemoryRef);
        true
    } else {
        p.rollback(m)
    }
}

/// `[segment_reg COLON] ea_expr`
fn effective_addr(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let seg = p.open();
    if segment_reg(p, level + 1) && p.eat(TokenKind::Colon) {
        p.abandon(seg);
    } else {
        p.rollback(seg);
    }
    if !ea_expr(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::EffectiveAddr);
    true
}

/// `ea_term ((PLUS | MINUS) ea_term)*`
fn ea_expr(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !ea_term(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Plus) || p.at(TokenKind::Minus) {
            p.bump();
            if ea_term(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::EaExpr);
    true
}

/// `REL symbol_ref | register MUL scale | register | const_expr |
/// symbol_ref | macro_expansion`
fn ea_term(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if p.at(TokenKind::Rel) {
        p.bump();
        if expr::symbol_ref(p, level + 1) {
            p.close(m, NodeKind::EaTerm);
            return true;
        }
        return p.rollback(m);
    }
    let scaled = p.open();
    if register(p, level + 1) && p.at(TokenKind::Mul) {
        p.bump();
        if scale(p, level + 1) {
            p.abandon(scaled);
            p.close(m, NodeKind::EaTerm);
            return true;
        }
    }
    p.rollback(scaled);
    let ok = register(p, level + 1)
        || expr::const_expr(p, level + 1)
        || expr::symbol_ref(p, level + 1)
        || preproc::macro_expansion(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::EaTerm);
    true
}

fn scale(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Number) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::Scale);
    true
}

// --- decorators ----------------------------------------------------------

/// `LBRACE decorator_list RBRACE`, pinned once the list has matched.
fn decorator(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::LBrace) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !decorator_list(p, level + 1) {
        return p.rollback(m);
    }
    p.expect(TokenKind::RBrace);
    p.close(m, NodeKind::Decorator);
    true
}

/// `decorator_item (COMMA decorator_item)*`
fn decorator_list(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !decorator_item(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if decorator_item(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::DecoratorList);
    true
}

/// `MASK_REG | ZEROING | BROADCAST | ROUNDING | SAE`
fn decorator_item(p: &mut Parser, _level: u32) -> bool {
    if !p.current().is_decorator_item() {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::DecoratorItem);
    true
}

// --- instruction prefixes (shared with the line grammar) -----------------

/// `[times_expr] [INSTRUCTION_PREFIX] [lock_prefix] [segment_override]
/// [size_override] [vex_prefix]` (transparent; always succeeds)
pub(super) fn instruction_prefixes(p: &mut Parser, level: u32) -> bool {
    times_expr(p, level + 1);
    p.eat(TokenKind::InstructionPrefix);
    lock_prefix(p, level + 1);
    segment_override(p, level + 1);
    size_override(p, level + 1);
    vex_prefix(p, level + 1);
    true
}

/// `TIMES const_expr | MACRO_REP const_expr`
pub(super) fn times_expr(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::Times) && !p.at(TokenKind::MacroRep) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::const_expr(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::TimesExpr);
    true
}

fn lock_prefix(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::InstructionPrefix) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::LockPrefix);
    true
}

fn size_override(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::InstructionPrefix) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::SizeOverride);
    true
}

fn vex_prefix(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::InstructionPrefix) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::VexPrefix);
    true
}
