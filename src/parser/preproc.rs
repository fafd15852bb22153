//! Preprocessor grammar: macro definitions and invocations, context-stack
//! directives, builtin functions, and the flat token-run constructs used for
//! macro bodies and arguments.
//!
//! Token runs (`token_sequence` and friends) are one-or-more of any token
//! that is not the matching closing delimiter. They do not balance nested
//! delimiters of the same kind; an inner `}` ends the run. That is the
//! documented behavior of the dialect, not an oversight.

use super::builder::Parser;
use super::{directive, expr};
use crate::cst::NodeKind;
use crate::token::TokenKind;

// --- small named terminals ----------------------------------------------

/// A bare `%directive` token the lexer did not special-case.
pub(super) fn preprocessor_id(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::PreprocessorDirective) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::PreprocessorId);
    true
}

/// `%$name` or `%%name`, as a named node.
pub(super) fn context_ref(p: &mut Parser, _level: u32) -> bool {
    if !p.at_any(&[TokenKind::MacroLocalRef, TokenKind::ContextLocalRef]) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::ContextRef);
    true
}

/// Same token set as [`context_ref`], consumed transparently.
pub(super) fn context_local_ref(p: &mut Parser, _level: u32) -> bool {
    p.eat(TokenKind::ContextLocalRef) || p.eat(TokenKind::MacroLocalRef)
}

/// `%1`, `%+1`, `%-1`, `%{1}`, `%{1:default}`
pub(super) fn macro_param_ref(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::MacroParam)
        || p.eat(TokenKind::MacroParamGreedy)
        || p.eat(TokenKind::MacroParamReverse)
    {
        p.close(m, NodeKind::MacroParamRef);
        return true;
    }
    if p.at(TokenKind::MacroExplicitStart) {
        p.bump();
        if p.eat(TokenKind::Number) {
            if p.eat(TokenKind::RBrace) {
                p.close(m, NodeKind::MacroParamRef);
                return true;
            }
            if p.eat(TokenKind::Colon)
                && default_value(p, level + 1)
                && p.eat(TokenKind::RBrace)
            {
                p.close(m, NodeKind::MacroParamRef);
                return true;
            }
        }
    }
    p.rollback(m)
}

/// Implicit concatenation such as `%1_end` or `%$foo_end` (transparent).
pub(super) fn macro_param_concat(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let head = macro_param_ref(p, level + 1)
        || context_local_ref(p, level + 1)
        || macro_expansion(p, level + 1);
    if head && p.eat(TokenKind::Identifier) {
        p.abandon(m);
        true
    } else {
        p.rollback(m)
    }
}

/// `%!name` or `%!"name"`
pub(super) fn env_var_ref(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::EnvVarPrefix) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::Identifier) && !p.eat(TokenKind::String) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::EnvVarRef);
    true
}

/// `%!name` inside token runs (stringize), kept distinct from
/// [`env_var_ref`] because it admits only identifiers.
fn stringize_op(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::EnvVarPrefix) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::Identifier) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::StringizeOp);
    true
}

// --- token runs ----------------------------------------------------------

fn operator_token(p: &mut Parser) -> bool {
    if !p.current().is_operator() {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::Operator);
    true
}

fn separator_token(p: &mut Parser) -> bool {
    if !p.current().is_separator() {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::Separator);
    true
}

/// Any single token admissible inside a token run (transparent).
fn base_token_element(p: &mut Parser, level: u32) -> bool {
    if preprocessor_id(p, level + 1)
        || macro_expansion(p, level + 1)
        || macro_param_ref(p, level + 1)
        || context_ref(p, level + 1)
        || stringize_op(p, level + 1)
    {
        return true;
    }
    if p.at_any(&[
        TokenKind::Identifier,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Register,
        TokenKind::SegRegister,
        TokenKind::MaskReg,
        TokenKind::SizeSpec,
        TokenKind::DataSize,
        TokenKind::SpaceSize,
        TokenKind::BuiltinFunc,
        TokenKind::StringFunc,
        TokenKind::Float,
        TokenKind::SpecialFloat,
    ]) {
        p.bump();
        return true;
    }
    operator_token(p) || separator_token(p)
}

/// `preprocessor_function | base_token_element`
fn preprocessor_token(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !preprocessor_function(p, level + 1) && !base_token_element(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::PreprocessorToken);
    true
}

/// `preprocessor_token+`
pub(super) fn token_sequence(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !preprocessor_token(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let before = p.pos();
        if !preprocessor_token(p, level + 1) || p.pos() == before {
            break;
        }
    }
    p.close(m, NodeKind::TokenSequence);
    true
}

/// `(!RBRACE preprocessor_token)+` — stops at the first `}` (transparent).
pub(super) fn brace_token_sequence(p: &mut Parser, level: u32) -> bool {
    let mut any = false;
    loop {
        if p.at(TokenKind::RBrace) {
            break;
        }
        let before = p.pos();
        if !preprocessor_token(p, level + 1) || p.pos() == before {
            break;
        }
        any = true;
    }
    any
}

/// `%[ ... ]` or `%{ ... }` — a flat run up to the first closer.
pub(super) fn macro_expansion(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    if p.at(TokenKind::MacroExpansionStart) {
        let m = p.open();
        p.bump();
        if expansion_content(p, level + 1, TokenKind::RBracket) && p.eat(TokenKind::RBracket) {
            p.close(m, NodeKind::MacroExpansion);
            return true;
        }
        return p.rollback(m);
    }
    if p.at(TokenKind::MacroExplicitStart) {
        let m = p.open();
        p.bump();
        if expansion_content(p, level + 1, TokenKind::RBrace) && p.eat(TokenKind::RBrace) {
            p.close(m, NodeKind::MacroExpansion);
            return true;
        }
        return p.rollback(m);
    }
    false
}

/// `(!closer base_token_element)+`
fn expansion_content(p: &mut Parser, level: u32, closer: TokenKind) -> bool {
    let mut any = false;
    loop {
        if p.at(closer) {
            break;
        }
        let before = p.pos();
        if !base_token_element(p, level + 1) || p.pos() == before {
            break;
        }
        any = true;
    }
    any
}

// --- assignments and single-line definitions -----------------------------

/// `(IDENTIFIER | context_ref | macro_param_concat) EQU const_expr`,
/// pinned on `equ`.
pub(super) fn equ_definition(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let name = p.eat(TokenKind::Identifier)
        || context_ref(p, level + 1)
        || macro_param_concat(p, level + 1);
    if !name || !p.eat(TokenKind::Equ) {
        return p.rollback(m);
    }
    if !expr::const_expr(p, level + 1) {
        p.error("expected expression after `equ`");
    }
    p.close(m, NodeKind::EquDefinition);
    true
}

/// `%assign IDENTIFIER const_expr`, pinned on the directive.
pub(super) fn pp_assign_stmt(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroAssign) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::Identifier);
    if !expr::const_expr(p, level + 1) {
        p.error("expected expression");
    }
    p.close(m, NodeKind::PpAssignStmt);
    true
}

/// `%define macro_name [macro_params] [macro_body_inline]`, pinned on the
/// directive.
pub(super) fn pp_define_stmt(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroDefine) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !macro_name(p, level + 1) {
        p.error("expected macro name");
    }
    macro_params(p, level + 1);
    macro_body_inline(p, level + 1);
    p.close(m, NodeKind::PpDefineStmt);
    true
}

/// `IDENTIFIER | preprocessor_id | context_ref | keyword_as_name | SIZE_SPEC`
pub(super) fn macro_name(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = p.eat(TokenKind::Identifier)
        || preprocessor_id(p, level + 1)
        || context_ref(p, level + 1)
        || directive::keyword_as_name(p, level + 1)
        || p.eat(TokenKind::SizeSpec);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::MacroName);
    true
}

/// `LPAREN param_list RPAREN`
fn macro_params(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::LParen) {
        return false;
    }
    let m = p.open();
    p.bump();
    if param_list(p, level + 1) && p.eat(TokenKind::RParen) {
        p.close(m, NodeKind::MacroParams);
        true
    } else {
        p.rollback(m)
    }
}

/// `param_spec (COMMA param_spec)*`
fn param_list(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !param_spec(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if param_spec(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::ParamList);
    true
}

/// `param_name [param_qualifier]`
fn param_spec(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !param_name(p, level + 1) {
        return p.rollback(m);
    }
    param_qualifier(p, level + 1);
    p.close(m, NodeKind::ParamSpec);
    true
}

fn param_name(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::ParamName);
    true
}

/// `= default | + [default] | * [default] | ! [default]` — default values,
/// greedy, at-least-one, and must-not-be-empty qualifiers.
fn param_qualifier(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::Eq) {
        if !default_value(p, level + 1) {
            return p.rollback(m);
        }
        p.close(m, NodeKind::ParamQualifier);
        return true;
    }
    if p.eat(TokenKind::Plus) || p.eat(TokenKind::Mul) || p.eat(TokenKind::Exclaim) {
        default_value(p, level + 1);
        p.close(m, NodeKind::ParamQualifier);
        return true;
    }
    p.rollback(m)
}

fn default_value(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !token_sequence(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::DefaultValue);
    true
}

fn macro_body_inline(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !token_sequence(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::MacroBodyInline);
    true
}

// --- multi-line macro pieces ---------------------------------------------

/// `%macro macro_name param_count [param_defaults] [macro_flags]`
pub(super) fn macro_start_line(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroStart) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !macro_name(p, level + 1) || !param_count(p, level + 1) {
        return p.rollback(m);
    }
    param_defaults(p, level + 1);
    macro_flags(p, level + 1);
    p.abandon(m);
    true
}

/// `NUMBER [MINUS NUMBER]` — parameter count with optional variadic range,
/// pinned on the first number.
pub(super) fn param_count(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Number) {
        return false;
    }
    let m = p.open();
    p.bump();
    let tail = p.open();
    if p.at(TokenKind::Minus) {
        p.bump();
        if p.expect(TokenKind::Number) {
            p.abandon(tail);
        } else {
            p.rollback(tail);
        }
    } else {
        p.rollback(tail);
    }
    p.close(m, NodeKind::ParamCount);
    true
}

/// `NUMBER (COMMA NUMBER)*` (transparent)
fn param_defaults(p: &mut Parser, _level: u32) -> bool {
    let m = p.open();
    if !p.eat(TokenKind::Number) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if p.eat(TokenKind::Number) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.abandon(m);
    true
}

/// `+ | * | - *` — greedy / at-least-one / reversed-greedy flags.
fn macro_flags(p: &mut Parser, _level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::Plus) || p.eat(TokenKind::Mul) {
        p.close(m, NodeKind::MacroFlags);
        return true;
    }
    if p.at(TokenKind::Minus) {
        p.bump();
        if p.eat(TokenKind::Mul) {
            p.close(m, NodeKind::MacroFlags);
            return true;
        }
    }
    p.rollback(m)
}

pub(super) fn macro_end_line(p: &mut Parser, _level: u32) -> bool {
    p.eat(TokenKind::MacroEnd)
}

// --- invocations ---------------------------------------------------------

/// `macro_call | smacro_expansion | builtin_function | macro_param_invocation`
pub(super) fn invocation(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = macro_call(p, level + 1)
        || smacro_expansion(p, level + 1)
        || builtin_function(p, level + 1)
        || macro_param_invocation(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::Invocation);
    true
}

/// `IDENTIFIER macro_args` — classic multi-line macro call with bare
/// arguments.
fn macro_call(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !p.eat(TokenKind::Identifier) || !macro_args(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::MacroCall);
    true
}

/// Bare single-line macro or `%[...]` expansion used in statement position.
fn smacro_expansion(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::Identifier) {
        p.close(m, NodeKind::SmacroExpansion);
        return true;
    }
    if p.at(TokenKind::MacroExpansionStart) {
        p.bump();
        if token_sequence(p, level + 1) && p.eat(TokenKind::RBracket) {
            p.close(m, NodeKind::SmacroExpansion);
            return true;
        }
        return p.rollback(m);
    }
    if preprocessor_id(p, level + 1) {
        p.close(m, NodeKind::SmacroExpansion);
        return true;
    }
    p.rollback(m)
}

/// `%1 macro_args?` — a macro parameter used in call position.
fn macro_param_invocation(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !macro_param_ref(p, level + 1) {
        return p.rollback(m);
    }
    macro_args(p, level + 1);
    p.abandon(m);
    true
}

/// `macro_arg (COMMA macro_arg)*`
fn macro_args(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !macro_arg(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if macro_arg(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::MacroArgs);
    true
}

/// `LBRACE token_sequence RBRACE | macro_arg_tokens`
fn macro_arg(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if p.at(TokenKind::LBrace) {
        let braced = p.open();
        p.bump();
        if token_sequence(p, level + 1) && p.eat(TokenKind::RBrace) {
            p.abandon(braced);
            p.close(m, NodeKind::MacroArg);
            return true;
        }
        p.rollback(braced);
    }
    if !macro_arg_tokens(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::MacroArg);
    true
}

/// `(!(COMMA | RPAREN) base_token_element)+` (transparent)
pub(super) fn macro_arg_tokens(p: &mut Parser, level: u32) -> bool {
    let mut any = false;
    loop {
        if p.at(TokenKind::Comma) || p.at(TokenKind::RParen) {
            break;
        }
        let before = p.pos();
        if !base_token_element(p, level + 1) || p.pos() == before {
            break;
        }
        any = true;
    }
    any
}

/// `IDENTIFIER LPAREN [macro_arg_list] RPAREN` — function-like macro call,
/// pinned after the open paren.
pub(super) fn function_macro_call(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::LParen) {
        return p.rollback(m);
    }
    macro_arg_list(p, level + 1);
    p.expect(TokenKind::RParen);
    p.close(m, NodeKind::FunctionMacroCall);
    true
}

/// `macro_arg (COMMA macro_arg)*` (transparent)
fn macro_arg_list(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !macro_arg(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if macro_arg(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.abandon(m);
    true
}

// --- builtin functions ---------------------------------------------------

/// Four families, disambiguated purely by the introducing keyword token.
pub(super) fn builtin_function(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = integer_function(p, level + 1)
        || preprocessor_function(p, level + 1)
        || string_transform(p, level + 1)
        || query_function(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::BuiltinFunction);
    true
}

/// `BUILTIN_FUNC LPAREN const_expr RPAREN`, pinned after the paren.
fn integer_function(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::BuiltinFunc) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::LParen) {
        return p.rollback(m);
    }
    if !expr::const_expr(p, level + 1) {
        p.error("expected expression");
    }
    p.expect(TokenKind::RParen);
    p.close(m, NodeKind::IntegerFunction);
    true
}

/// `(%strlen | %substr | %strcat | %directive) LPAREN args RPAREN`, pinned
/// after the paren.
pub(super) fn preprocessor_function(p: &mut Parser, level: u32) -> bool {
    if !p.at_any(&[
        TokenKind::MacroStrlen,
        TokenKind::MacroSubstr,
        TokenKind::MacroStrcat,
        TokenKind::PreprocessorDirective,
    ]) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::LParen) {
        return p.rollback(m);
    }
    if !preprocessor_function_args(p, level + 1) {
        p.error("expected arguments");
    }
    p.expect(TokenKind::RParen);
    p.close(m, NodeKind::PreprocessorFunction);
    true
}

/// `const_expr (COMMA const_expr)*` (transparent)
fn preprocessor_function_args(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !expr::const_expr(p, level + 1) {
        return p.rollback(m);
    }
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if expr::const_expr(p, level + 1) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.abandon(m);
    true
}

/// `STRING_FUNC LPAREN STRING RPAREN` in expression position, pinned after
/// the paren.
fn string_transform(p: &mut Parser, level: u32) -> bool {
    string_call(p, level, NodeKind::StringTransform)
}

/// Same surface as [`string_transform`], used in data-item position where it
/// must win against `conditional_data`.
pub(super) fn string_function(p: &mut Parser, level: u32) -> bool {
    string_call(p, level, NodeKind::StringFunction)
}

fn string_call(p: &mut Parser, _level: u32, kind: NodeKind) -> bool {
    if !p.at(TokenKind::StringFunc) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !p.eat(TokenKind::LParen) {
        return p.rollback(m);
    }
    if !p.eat(TokenKind::String) {
        p.error("expected string literal");
    }
    p.expect(TokenKind::RParen);
    p.close(m, kind);
    true
}

/// `%? id | %?? id | defined(id)`
fn query_function(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if p.eat(TokenKind::Query) || p.eat(TokenKind::QueryExpand) {
        if !p.eat(TokenKind::Identifier) {
            return p.rollback(m);
        }
        p.close(m, NodeKind::QueryFunction);
        return true;
    }
    if defined_func(p, level + 1) {
        p.close(m, NodeKind::QueryFunction);
        return true;
    }
    p.rollback(m)
}

/// `DEFINED LPAREN IDENTIFIER RPAREN`, pinned on `defined`.
fn defined_func(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Defined) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.expect(TokenKind::LParen);
    p.expect(TokenKind::Identifier);
    p.expect(TokenKind::RParen);
    p.close(m, NodeKind::DefinedFunc);
    true
}

// --- preprocessor directive lines ----------------------------------------

/// `macro_dir | context_dir | message_dir | line_dir | clear_dir | exit_dir`
pub(super) fn preprocessor_line(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    let ok = macro_dir(p, level + 1)
        || context_dir(p, level + 1)
        || message_dir(p, level + 1)
        || line_dir(p, level + 1)
        || clear_dir(p, level + 1)
        || exit_dir(p, level + 1);
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::PreprocessorLine);
    true
}

/// String/debug directives plus the catch-all bare `%directive`.
fn macro_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = if p.eat(TokenKind::MacroRotate) {
        expr::const_expr(p, level + 1)
    } else if p.eat(TokenKind::MacroStrlen) {
        p.eat(TokenKind::Identifier)
            && (p.eat(TokenKind::String) || p.eat(TokenKind::Identifier))
    } else if p.eat(TokenKind::MacroSubstr) {
        let head = p.eat(TokenKind::Identifier)
            && (p.eat(TokenKind::String) || p.eat(TokenKind::Identifier))
            && expr::const_expr(p, level + 1);
        if head {
            expr::const_expr(p, level + 1);
        }
        head
    } else if p.eat(TokenKind::MacroStrcat) {
        let mut any = false;
        if p.eat(TokenKind::Identifier) {
            while p.eat(TokenKind::String) || p.eat(TokenKind::Identifier) {
                any = true;
            }
        }
        any
    } else if p.eat(TokenKind::MacroPathsearch) {
        p.eat(TokenKind::Identifier) && p.eat(TokenKind::String)
    } else if p.eat(TokenKind::MacroDepend) {
        p.eat(TokenKind::String)
    } else if p.eat(TokenKind::MacroAliases) {
        p.eat(TokenKind::Identifier)
    } else {
        p.eat(TokenKind::PreprocessorDirective)
    };
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::MacroDir);
    true
}

/// Context-stack directives; the stack semantics live in a downstream
/// expander, this grammar only shapes the lines.
fn context_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = if p.eat(TokenKind::MacroPush) {
        context_name(p, level + 1);
        true
    } else if p.eat(TokenKind::MacroPop) {
        true
    } else if p.eat(TokenKind::MacroRepl) {
        context_name(p, level + 1)
    } else if p.eat(TokenKind::MacroArgDecl) {
        arg_directive(p, level + 1)
    } else if p.eat(TokenKind::MacroStacksize) {
        expr::const_expr(p, level + 1)
    } else if p.eat(TokenKind::MacroLocal) {
        local_directive(p, level + 1)
    } else {
        false
    };
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::ContextDir);
    true
}

fn context_name(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::ContextName);
    true
}

/// `IDENTIFIER (COMMA IDENTIFIER)*`
fn arg_directive(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if p.eat(TokenKind::Identifier) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::ArgDirective);
    true
}

/// `IDENTIFIER (COMMA IDENTIFIER)*`
fn local_directive(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    loop {
        let tail = p.open();
        if p.at(TokenKind::Comma) {
            p.bump();
            if p.eat(TokenKind::Identifier) {
                p.abandon(tail);
                continue;
            }
        }
        p.rollback(tail);
        break;
    }
    p.close(m, NodeKind::LocalDirective);
    true
}

/// `%error message_text`, pinned on the directive.
fn message_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroError) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !message_text(p, level + 1) {
        p.error("expected message");
    }
    p.close(m, NodeKind::MessageDir);
    true
}

/// `STRING | token_sequence`
fn message_text(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !p.eat(TokenKind::String) && !token_sequence(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::MessageText);
    true
}

/// `%line const_expr [STRING]`, pinned on the directive.
fn line_dir(p: &mut Parser, level: u32) -> bool {
    if !p.at(TokenKind::MacroLine) {
        return false;
    }
    let m = p.open();
    p.bump();
    if !expr::const_expr(p, level + 1) {
        p.error("expected line number");
    }
    p.eat(TokenKind::String);
    p.close(m, NodeKind::LineDir);
    true
}

/// `%clear [target] | %undef id | %unmacro id [param_count]`
fn clear_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = if p.eat(TokenKind::MacroClear) {
        clear_target(p, level + 1);
        true
    } else if p.eat(TokenKind::MacroUndef) {
        p.eat(TokenKind::Identifier)
    } else if p.eat(TokenKind::MacroUnmacro) {
        let named = p.eat(TokenKind::Identifier);
        if named {
            param_count(p, level + 1);
        }
        named
    } else {
        false
    };
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::ClearDir);
    true
}

fn clear_target(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::ClearTarget);
    true
}

/// `%exitmacro | %exitrep`
fn exit_dir(p: &mut Parser, _level: u32) -> bool {
    if !p.at_any(&[TokenKind::MacroExitmacro, TokenKind::MacroExitrep]) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::ExitDir);
    true
}

// --- conditional heads and conditions ------------------------------------

/// `%if cond? | %ifdef ref | %ifndef ref | %ifmacro ref param_count`
pub(super) fn if_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = if p.eat(TokenKind::MacroIf) {
        condition(p, level + 1);
        true
    } else if p.eat(TokenKind::MacroIfdef) || p.eat(TokenKind::MacroIfndef) {
        macro_ref(p, level + 1)
    } else if p.eat(TokenKind::MacroIfmacro) {
        macro_ref(p, level + 1) && param_count(p, level + 1)
    } else {
        false
    };
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::IfDir);
    true
}

/// `%elif cond? | %elifmacro ref param_count`
pub(super) fn elif_dir(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    let ok = if p.eat(TokenKind::MacroElif) {
        condition(p, level + 1);
        true
    } else if p.eat(TokenKind::MacroElifmacro) {
        macro_ref(p, level + 1) && param_count(p, level + 1)
    } else {
        false
    };
    if !ok {
        return p.rollback(m);
    }
    p.close(m, NodeKind::ElifDir);
    true
}

pub(super) fn else_dir(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::MacroElse) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::ElseDir);
    true
}

pub(super) fn endif_dir(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::MacroEndif) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::EndifDir);
    true
}

pub(super) fn macro_ref(p: &mut Parser, _level: u32) -> bool {
    if !p.at(TokenKind::Identifier) {
        return false;
    }
    let m = p.open();
    p.bump();
    p.close(m, NodeKind::MacroRef);
    true
}

/// `token_comparison | const_expr` — the comma form serves `%ifidn`-style
/// token equality, so it must win when a comma is present.
pub(super) fn condition(p: &mut Parser, level: u32) -> bool {
    if !p.guard(level) {
        return false;
    }
    let m = p.open();
    if !token_comparison(p, level + 1) && !expr::const_expr(p, level + 1) {
        return p.rollback(m);
    }
    p.close(m, NodeKind::Condition);
    true
}

/// `token_operand COMMA token_operand`
fn token_comparison(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if token_operand(p, level + 1)
        && p.eat(TokenKind::Comma)
        && token_operand(p, level + 1)
    {
        p.close(m, NodeKind::TokenComparison);
        true
    } else {
        p.rollback(m)
    }
}

/// `(!(comparison_op | COMMA) base_token_element)+` (transparent)
fn token_operand(p: &mut Parser, level: u32) -> bool {
    let mut any = false;
    loop {
        if p.current().is_comparison_op() || p.at(TokenKind::Comma) {
            break;
        }
        let before = p.pos();
        if !base_token_element(p, level + 1) || p.pos() == before {
            break;
        }
        any = true;
    }
    any
}

// --- line-level assignment dispatch (used by line.rs) --------------------

/// `equ_definition [CRLF]` (transparent)
pub(super) fn equ_line(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !equ_definition(p, level + 1) {
        return p.rollback(m);
    }
    p.eat(TokenKind::Crlf);
    p.abandon(m);
    true
}

/// `pp_assign_stmt [CRLF] | pp_define_stmt [CRLF]` (transparent)
pub(super) fn pp_assignment_line(p: &mut Parser, level: u32) -> bool {
    let m = p.open();
    if !pp_assign_stmt(p, level + 1) && !pp_define_stmt(p, level + 1) {
        return p.rollback(m);
    }
    p.eat(TokenKind::Crlf);
    p.abandon(m);
    true
}
