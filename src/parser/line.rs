//! Line grammar: the per-line dispatch and the block constructs that recurse
//! back into it.
//!
//! Dispatch order is part of the grammar. A label followed directly by a
//! data definition (`foo db 1`) must be tried before unlabeled content, or
//! `db` would be taken for a mnemonic; `equ` lines come first because their
//! commit token sits one token in.

use super::builder::Parser;
use super::{directive, expr, operand, preproc};
use crate::cst::NodeKind;
use crate::token::TokenKind;

/// Top-level rule: one `SourceLines` region plus per-run error recovery for
/// tokens no line form can start.
pub(super) fn program(p: &mut Parser) {
    let m = p.open();
    while !p.at_end() {
        let before = p.pos();
        if source_line(p, 1) && p.pos() > before {
            continue;
        }
        recovery_run(p);
    }
    p.close(m, NodeKind::SourceLines);
}

/// Collect a contiguous run of unparsable tokens (through the next line
/// break) into an `Error` node with a single diagnostic, then resume.
fn recovery_run(p: &mut Parser) {
    log::trace!("recovering from unparsable token run");
    let m = p.open();
    p.error("unexpected token");
    while !p.at_end() {
        let at_line_break = p.at(TokenKind::Crlf);
        p.bump();
        if at_line_break {
            break;
        }
    }
    p.close(m, NodeKind::Error);
}

/// `source_line*`
pub(super) fn source_lines(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    loop {
        let before = p.pos();
        if !source_line(p, level + 1) || p.pos() == before {
            break;
        }
    }
    p.close(m, NodeKind::SourceLines);
    true
}

/// The 13 line forms, tried in declaration order.
pub(super) fn source_line(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = preproc::equ_line(p, level + 1)
        || label_with_colon_line(p, level + 1)
        || preproc::pp_assignment_line(p, level + 1)
        || times_prefixed_line(p, level + 1)
        || label_with_data_line(p, level + 1)
        || unlabeled_content(p, level + 1)
        || preproc::preprocessor_line(p, level + 1)
        || conditional_block(p, level + 1)
        || multi_line_macro(p, level + 1)
        || rep_block(p, level + 1)
        || struc_block(p, level + 1)
        || istruc_block(p, level + 1)
        || p.eat(TokenKind::Crlf);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::SourceLine);
    true
}

// --- labels --------------------------------------------------------------

/// `macro_param_concat | context_ref | IDENTIFIER`
fn global_label(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = preproc::macro_param_concat(p, level + 1)
        || preproc::context_ref(p, level + 1)
        || p.eat(TokenKind::Identifier);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::GlobalLabel);
    true
}

/// `global_label COLON | local_label COLON`
fn label_with_colon(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let global = p.open();
    if global_label(p, level + 1) && p.at(TokenKind::Colon) {
        p.bump();
        p.abandon(global);
        p.close(m, NodeKind::LabelDef);
        return true;
    }
    p.rollback(global);
    let local = p.open();
    if expr::local_label(p, level + 1) && p.at(TokenKind::Colon) {
        p.bump();
        p.abandon(local);
        p.close(m, NodeKind::LabelDef);
        return true;
    }
    p.rollback(local);
    p.rollback(m)
}

/// `global_label | local_label` — only valid directly before a data or
/// space definition.
fn label_without_colon(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !global_label(p, level + 1) && !expr::local_label(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::LabelDef);
    true
}

/// `label_with_colon [non_assignment_statement] [CRLF]` (transparent)
fn label_with_colon_line(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !label_with_colon(p, level + 1) {
        return p.rollback(m);
    }
    non_assignment_statement(p, level + 1);
    p.eat(TokenKind::Crlf);
    p.abandon(m);
    true
}

/// `label_without_colon (data_def | space_def) [CRLF]` (transparent)
fn label_with_data_line(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !label_without_colon(p, level + 1) {
        return p.rollback(m);
    }
    if !directive::data_def(p, level + 1) && !directive::space_def(p, level + 1) {
        return p.rollback(m);
    }
    p.eat(TokenKind::Crlf);
    p.abandon(m);
    true
}

// --- statements ----------------------------------------------------------

/// `non_assignment_statement [CRLF]` (transparent)
fn unlabeled_content(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !non_assignment_statement(p, level + 1) {
        return p.rollback(m);
    }
    p.eat(TokenKind::Crlf);
    p.abandon(m);
    true
}

/// `instruction | pseudo_instruction | bracketed_directive | invocation |
/// at_directive`
fn non_assignment_statement(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    instruction(p, level + 1)
        || directive::pseudo_instruction(p, level + 1)
        || directive::bracketed_directive(p, level + 1)
        || preproc::invocation(p, level + 1)
        || directive::at_directive(p, level + 1)
}

/// `[instruction_prefixes] mnemonic operand_list?`
fn instruction(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    operand::instruction_prefixes(p, level + 1);
    if !mnemonic(p, level + 1) {
        return p.rollback(m);
    }
    operand::operand_list(p, level + 1);
    p.close(m, NodeKind::Instruction);
    true
}

/// `macro_param_concat | IDENTIFIER | macro_expansion` — mnemonics arrive
/// from the lexer as plain identifiers.
fn mnemonic(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = preproc::macro_param_concat(p, level + 1)
        || p.eat(TokenKind::Identifier)
        || preproc::macro_expansion(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::Mnemonic);
    true
}

/// `TIMES times_repeat_count times_content [CRLF]`, pinned on `times`
/// (transparent).
fn times_prefixed_line(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::Times) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !times_repeat_count(p, level + 1) {
        p.error("expected repeat count");
    }
    if !times_content(p, level + 1) {
        p.error("expected statement after `times`");
    }
    p.eat(TokenKind::Crlf);
    p.abandon(m);
    true
}

/// `macro_param_ref | const_expr` (transparent)
fn times_repeat_count(p: &mut Parser, level: u32) -> bool {
    preproc::macro_param_ref(p, level + 1) || expr::const_expr(p, level + 1)
}

/// `times_instruction | DATA_SIZE data_list | invocation` (transparent)
fn times_content(p: &mut Parser, level: u32) -> bool {
    if times_instruction(p, level + 1) {
        return true;
    }
    let m = p.open();
    if p.eat(TokenKind::DataSize) && directive::data_list(p, level + 1) {
        p.abandon(m);
        return true;
    }
    p.rollback(m);
    preproc::invocation(p, level + 1)
}

/// `mnemonic operand_list?` — the repeated statement of a `times` line.
fn times_instruction(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !mnemonic(p, level + 1) {
        return p.rollback(m);
    }
    operand::operand_list(p, level + 1);
    p.close(m, NodeKind::Instruction);
    true
}

// --- block constructs ----------------------------------------------------

/// `if_dir CRLF conditional_content endif_dir [CRLF]`, pinned on the head.
/// Once the head has matched, each remaining element is still attempted
/// after a failure so one bad branch costs one diagnostic, not the block.
fn conditional_block(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !preproc::if_dir(p, level + 1) {
        return p.rollback(m);
    }
    p.expect(TokenKind::Crlf);
    conditional_content(p, level + 1);
    if !preproc::endif_dir(p, level + 1) {
        p.error("expected %endif");
    }
    p.eat(TokenKind::Crlf);
    p.close(m, NodeKind::ConditionalBlock);
    true
}

/// `conditional_source_lines elif_or_else_part?` (transparent)
fn conditional_content(p: &mut Parser, level: u32) -> bool {
    conditional_source_lines(p, level + 1);
    elif_or_else_part(p, level + 1);
    true
}

/// `(!conditional_marker source_line)*` — the body stops, without consuming,
/// at the first `%elif`/`%elifmacro`/`%else`/`%endif`.
fn conditional_source_lines(p: &mut Parser, level: u32) -> bool {
    loop {
        if p.current().is_conditional_marker() {
            break;
        }
        let before = p.pos();
        if !source_line(p, level + 1) || p.pos() == before {
            break;
        }
    }
    true
}

/// `elif_blocks else_block? | else_block` (transparent)
fn elif_or_else_part(p: &mut Parser, level: u32) -> bool {
    if elif_block(p, level + 1) {
        while elif_block(p, level + 1) {}
        else_block(p, level + 1);
        return true;
    }
    else_block(p, level + 1)
}

/// `elif_dir CRLF conditional_source_lines`, pinned on the head
/// (transparent).
fn elif_block(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !preproc::elif_dir(p, level + 1) {
        return p.rollback(m);
    }
    p.expect(TokenKind::Crlf);
    conditional_source_lines(p, level + 1);
    p.abandon(m);
    true
}

/// `else_dir CRLF conditional_source_lines`, pinned on the head
/// (transparent).
fn else_block(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !preproc::else_dir(p, level + 1) {
        return p.rollback(m);
    }
    p.expect(TokenKind::Crlf);
    conditional_source_lines(p, level + 1);
    p.abandon(m);
    true
}

/// `macro_start_line macro_lines macro_end_line`, pinned once the start
/// line has matched.
fn multi_line_macro(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroStart) {
        return false;
    }
    let m = p.open();
    if !preproc::macro_start_line(p, level + 1) {
        return p.rollback(m);
    }
    macro_lines(p, level + 1);
    if !preproc::macro_end_line(p, level + 1) {
        p.error("expected %endmacro");
    }
    p.close(m, NodeKind::MultiLineMacro);
    true
}

/// `source_lines` under its own node: the macro body is kept intact for
/// tools that re-expand it.
fn macro_lines(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    source_lines(p, level + 1);
    p.close(m, NodeKind::MacroLines);
    true
}

/// `%rep const_expr CRLF source_lines CRLF* %endrep`, pinned on `%rep`.
fn rep_block(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroRep) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::const_expr(p, level + 1) {
        p.error("expected repeat count");
    }
    p.expect(TokenKind::Crlf);
    source_lines(p, level + 1);
    while p.eat(TokenKind::Crlf) {}
    if !p.eat(TokenKind::MacroEndrep) {
        p.error("expected %endrep");
    }
    p.close(m, NodeKind::RepBlock);
    true
}

/// `struc IDENTIFIER CRLF source_lines CRLF* endstruc`, pinned on `struc`.
fn struc_block(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::StrucKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::Identifier);
    p.expect(TokenKind::Crlf);
    source_lines(p, level + 1);
    while p.eat(TokenKind::Crlf) {}
    if !p.eat(TokenKind::EndstrucKw) {
        p.error("expected endstruc");
    }
    p.close(m, NodeKind::StrucBlock);
    true
}

/// `istruc IDENTIFIER CRLF source_lines CRLF* iend`, pinned on `istruc`.
fn istruc_block(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::IstrucKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::Identifier);
    p.expect(TokenKind::Crlf);
    source_lines(p, level + 1);
    while p.eat(TokenKind::Crlf) {}
    if !p.eat(TokenKind::IendKw) {
        p.error("expected iend");
    }
    p.close(m, NodeKind::IstrucBlock);
    true
}
