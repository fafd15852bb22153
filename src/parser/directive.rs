//! Pseudo-instructions: data and space definitions, section/segment
//! directives, symbol visibility directives, and the bracketed and `at`
//! directive forms.

use super::builder::Parser;
use super::{expr, operand, preproc};
use crate::cst::NodeKind;
use crate::token::TokenKind;

/// Directive dispatch, in declaration order.
pub(super) fn pseudo_instruction(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = data_def(p, level + 1)
        || space_def(p, level + 1)
        || include_dir(p, level + 1)
        || section_dir(p, level + 1)
        || global_dir(p, level + 1)
        || extern_dir(p, level + 1)
        || common_dir(p, level + 1)
        || align_dir(p, level + 1)
        || org_dir(p, level + 1)
        || bits_dir(p, level + 1)
        || cpu_dir(p, level + 1)
        || float_dir(p, level + 1)
        || default_dir(p, level + 1)
        || absolute_dir(p, level + 1)
        || use_package(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::PseudoInstruction);
    true
}

// --- data definitions ----------------------------------------------------

/// `[times_expr] DATA_SIZE data_list`, pinned on the size keyword.
pub(super) fn data_def(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    operand::times_expr(p, level + 1);
    if !p.eat(TokenKind::DataSize) {
        return p.rollback(m);
    }
    if !data_list(p, level + 1) {
        p.error("expected data item");
    }
    p.close(m, NodeKind::DataDef);
    true
}

/// `data_item (COMMA data_item)*`
pub(super) fn data_list(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !data_item(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if data_item(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::DataList);
    true
}

/// Data-item alternatives. `string_function` must come before
/// `conditional_data` — both can open ambiguously from the same lookahead.
fn data_item(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = preproc::string_function(p, level + 1)
        || conditional_data(p, level + 1)
        || p.eat(TokenKind::QuestionMark)
        || data_expr(p, level + 1)
        || preproc::macro_expansion(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::DataItem);
    true
}

/// `const_expr [DUP LPAREN data_list RPAREN]` (transparent)
fn data_expr(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !expr::const_expr(p, level + 1) {
        return p.rollback(m);
    }
    let dup = p.open();
    if p.eat(TokenKind::Dup)
        && p.eat(TokenKind::LParen)
        && data_list(p, level + 1)
        && p.eat(TokenKind::RParen)
    {
        p.abandon(dup);
    } else {
        p.rollback(dup);
    }
    p.abandon(m);
    true
}

/// `%if`-wrapped per-branch data items, pinned on `%if`.
fn conditional_data(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroIf) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !preproc::condition(p, level + 1) {
        p.error("expected condition");
    }
    p.expect(TokenKind::Crlf);
    if !data_item(p, level + 1) {
        p.error("expected data item");
    }
    p.expect(TokenKind::Crlf);
    loop {
        let branch = p.open();
        if p.eat(TokenKind::MacroElif)
            && preproc::condition(p, level + 1)
            && p.eat(TokenKind::Crlf)
            && data_item(p, level + 1)
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
        && data_item(p, level + 1)
        && p.eat(TokenKind::Crlf)
    {
        p.abandon(else_branch);
    } else {
        p.rollback(else_branch);
    }
    p.expect(TokenKind::MacroEndif);
    p.close(m, NodeKind::ConditionalData);
    true
}

/// `SPACE_SIZE const_expr`, pinned on the reserve keyword.
pub(super) fn space_def(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::SpaceSize) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::const_expr(p, level + 1) {
        p.error("expected size expression");
    }
    p.close(m, NodeKind::SpaceDef);
    true
}

// --- file inclusion ------------------------------------------------------

/// `INCBIN str [, expr [, expr]] | %include string_or_env | %use package`
fn include_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = if p.eat(TokenKind::IncbinKw) {
        let named = p.eat(TokenKind::String);
        if named && p.eat(TokenKind::Comma) {
            expr::const_expr(p, level + 1);
            if p.eat(TokenKind::Comma) {
                expr::const_expr(p, level + 1);
            }
        }
        named
    } else if p.eat(TokenKind::MacroInclude) {
        string_or_env(p, level + 1)
    } else if p.eat(TokenKind::MacroUse) {
        package_name(p, level + 1)
    } else {
        false
    };
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::IncludeDir);
    true
}

/// `STRING | LT IDENTIFIER GT | env_var_ref`
fn string_or_env(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = p.eat(TokenKind::String)
        || (p.eat(TokenKind::Lt) && p.eat(TokenKind::Identifier) && p.eat(TokenKind::Gt))
        || preproc::env_var_ref(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::StringOrEnv);
    true
}

fn package_name(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::PackageName);
    true
}

/// `%use package_name`, pinned on the directive.
fn use_package(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroUse) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !package_name(p, level + 1) {
        p.error("expected package name");
    }
    p.close(m, NodeKind::UsePackage);
    true
}

// --- sections and symbols ------------------------------------------------

/// `(SECTION | SEGMENT) section_name [section_attrs]`, pinned on the
/// keyword.
fn section_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::SectionKw) && !p.at(TokenKind::SegmentKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !section_name(p, level + 1) {
        p.error("expected section name");
    }
    section_attrs(p, level + 1);
    p.close(m, NodeKind::SectionDir);
    true
}

/// `IDENTIFIER | STRING`
fn section_name(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) && !p.at(TokenKind::String) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::SectionName);
    true
}

/// `section_attr+`
fn section_attrs(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !section_attr(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let before = p.pos();
        if !section_attr(p, level + 1) || p.pos() == before {
            break;
        }
    }
    p.close(m, NodeKind::SectionAttrs);
    true
}

/// `section_attr_name EQ const_expr | section_attr_name`
fn section_attr(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !section_attr_name(p, level + 1) {
        return p.rollback(m);
    }
    let valued = p.open();
    if p.eat(TokenKind::Eq) && expr::const_expr(p, level + 1) {
        p.abandon(valued);
    } else {
        p.rollback(valued);
    }
    p.close(m, NodeKind::SectionAttr);
    true
}

/// `IDENTIFIER | SECTION_ATTR_KW | ALIGN_KW | BITS_KW | ORG_KW`
fn section_attr_name(p: &mut Parser, _level: u32) -> bool {
    if !p.at_any(&[
        TokenKind::Identifier,
        TokenKind::SectionAttrKw,
        TokenKind::AlignKw,
        TokenKind::BitsKw,
        TokenKind::OrgKw,
    ]) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::SectionAttrName);
    true
}

/// `GLOBAL_KW symbol_list | MACRO_PUSH symbol_list`
fn global_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::GlobalKw) && !p.at(TokenKind::MacroPush) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !symbol_list(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::GlobalDir);
    true
}

/// `EXTERN_KW symbol_list`, pinned on the keyword.
fn extern_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::ExternKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !symbol_list(p, level + 1) {
        p.error("expected symbol");
    }
    p.close(m, NodeKind::ExternDir);
    true
}

/// `COMMON_KW IDENTIFIER const_expr`, pinned on the keyword.
fn common_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::CommonKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::Identifier);
    if !expr::const_expr(p, level + 1) {
        p.error("expected size expression");
    }
    p.close(m, NodeKind::CommonDir);
    true
}

/// `symbol_decl (COMMA symbol_decl)*`
fn symbol_list(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !symbol_decl(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if symbol_decl(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::SymbolList);
    true
}

/// `symbol_name [COLON symbol_name]` — the second name carries visibility
/// attributes such as `sym:function`.
fn symbol_decl(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !symbol_name(p, level + 1) {
        return p.rollback(m);
    }
    let attr = p.open();
    if p.eat(TokenKind::Colon) && symbol_name(p, level + 1) {
        p.abandon(attr);
    } else {
        p.rollback(attr);
    }
    p.close(m, NodeKind::SymbolDecl);
    true
}

/// `IDENTIFIER | SECTION_ATTR_KW | SIZE_SPEC | keyword_as_name`
fn symbol_name(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = p.eat(TokenKind::Identifier)
        || p.eat(TokenKind::SectionAttrKw)
        || p.eat(TokenKind::SizeSpec)
        || keyword_as_name(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::SymbolName);
    true
}

/// Operand keywords admissible where a plain name is expected.
pub(super) fn keyword_as_name(p: &mut Parser, _level: u32) -> bool {
    if !p.current().is_keyword_as_name() {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::KeywordAsName);
    true
}

// --- layout directives ---------------------------------------------------

/// `(ALIGN | ALIGNB) const_expr [, align_fill] | SECTALIGN const_expr`
fn align_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::AlignKw) || p.eat(TokenKind::AlignbKw) {
        if !expr::const_expr(p, level + 1) {
            return p.rollback(m);
        }
        let fill = p.open();
        if p.eat(TokenKind::Comma) && align_fill(p, level + 1) {
            p.abandon(fill);
        } else {
            p.rollback(fill);
        }
        p.close(m, NodeKind::AlignDir);
        return true;
    }
    if p.eat(TokenKind::SectalignKw) && expr::const_expr(p, level + 1) {
        p.close(m, NodeKind::AlignDir);
        return true;
    }
    p.rollback(m)
}

/// `DATA_SIZE data_list | const_expr` (transparent)
fn align_fill(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::DataSize) {
        if data_list(p, level + 1) {
            p.abandon(m);
            return true;
        }
        return p.rollback(m);
    }
    if expr::const_expr(p, level + 1) {
        p.abandon(m);
        return true;
    }
    p.rollback(m)
}

/// `ORG_KW const_expr`, pinned on the keyword.
fn org_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::OrgKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::const_expr(p, level + 1) {
        p.error("expected origin address");
    }
    p.close(m, NodeKind::OrgDir);
    true
}

/// `BITS const_expr | USE16 | USE32 | USE64`
fn bits_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::BitsKw) {
        if !expr::const_expr(p, level + 1) {
            return p.rollback(m);
        }
        p.close(m, NodeKind::BitsDir);
        return true;
    }
    if p.eat(TokenKind::Use16Kw) || p.eat(TokenKind::Use32Kw) || p.eat(TokenKind::Use64Kw) {
        p.close(m, NodeKind::BitsDir);
        return true;
    }
    p.rollback(m)
}

/// `CPU_KW IDENTIFIER`, pinned on the keyword.
fn cpu_dir(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::CpuKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::Identifier);
    p.close(m, NodeKind::CpuDir);
    true
}

/// `FLOAT_KW IDENTIFIER`, pinned on the keyword.
fn float_dir(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::FloatKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::Identifier);
    p.close(m, NodeKind::FloatDir);
    true
}

/// `DEFAULT_KW default_option`, pinned on the keyword.
fn default_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::DefaultKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !default_option(p, level + 1) {
        p.error("expected `rel`, `abs` or a prefix");
    }
    p.close(m, NodeKind::DefaultDir);
    true
}

/// `REL | ABS | INSTRUCTION_PREFIX`
pub(super) fn default_option(p: &mut Parser, _level: u32) -> bool {
    if !p.at_any(&[
        TokenKind::Rel,
        TokenKind::Abs,
        TokenKind::InstructionPrefix,
    ]) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::DefaultOption);
    true
}

/// `ABSOLUTE_KW const_expr`, pinned on the keyword.
fn absolute_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::AbsoluteKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::const_expr(p, level + 1) {
        p.error("expected address expression");
    }
    p.close(m, NodeKind::AbsoluteDir);
    true
}

// --- bracketed and `at` directives ---------------------------------------

/// `[DEFAULT option] | [ident ident+]`
pub(super) fn bracketed_directive(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::LBracket) {
        return false;
    }
    let m = p.open();
    p.bump();
    if p.eat(TokenKind::DefaultKw) {
        if default_option(p, level + 1) && p.eat(TokenKind::RBracket) {
            p.close(m, NodeKind::BracketedDirective);
            return true;
        }
        return p.rollback(m);
    }
    if p.eat(TokenKind::Identifier) && p.eat(TokenKind::Identifier) {
        while p.eat(TokenKind::Identifier) {}
        if p.eat(TokenKind::RBracket) {
            p.close(m, NodeKind::BracketedDirective);
            return true;
        }
    }
    p.rollback(m)
}

/// `AT_KW symbol_ref COMMA data_def` — istruc field initializer, pinned on
/// `at`.
pub(super) fn at_directive(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::AtKw) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::symbol_ref(p, level + 1) {
        p.error("expected field name");
    }
    p.expect(TokenKind::Comma);
    if !data_def(p, level + 1) {
        p.error("expected data definition");
    }
    p.close(m, NodeKind::AtDirective);
    true
}
