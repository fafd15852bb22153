//! Shared test support: a reference tokenizer and parse helpers.
//!
//! The library's contract starts at an already-classified token stream, so
//! the grammar tests need a lexer of their own to be written against source
//! text. This one covers the dialect far enough for the test corpus; it is
//! test support, not a public API.
#![allow(dead_code)]

use logos::Logos;
use once_cell::sync::Lazy;
use std::collections::HashMap;

use nasm_syntax::{parse_program, parse_program_with, Location, Parse, ParseConfig, Token, TokenKind};

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum RawToken {
    #[regex(r"[ \t]+")]
    Whitespace,
    #[regex(r";[^\n]*")]
    Comment,
    #[regex(r"\r?\n")]
    Crlf,

    // Literals
    #[regex(r#""[^"\n]*""#)]
    #[regex(r"'[^'\n]*'")]
    #[regex(r"`[^`\n]*`")]
    String,
    #[regex(r"[0-9][0-9a-fA-F_]*[hH]")]
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    #[regex(r"0[bB][01_]+")]
    #[regex(r"[0-9][0-9_]*")]
    Number,
    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    Float,

    // Identifier-shaped; classified against the keyword table below.
    #[regex(r"\.?[A-Za-z_][A-Za-z0-9_.]*")]
    Word,

    // Decorator payloads
    #[regex(r"[0-9]+to[0-9]+")]
    Broadcast,
    #[regex(r"r[nduz]-sae")]
    Rounding,

    // WRT suffixes win over DOT_DOT by length
    #[regex(r"\.\.(gotpc|gotoff|gottpoff|got|plt|sym|tlsie|tlsgd)")]
    WrtSuffix,

    // Preprocessor tokens
    #[regex(r"%[A-Za-z][A-Za-z0-9]*")]
    Directive,
    #[regex(r"%[0-9]+")]
    MacroParam,
    #[regex(r"%\+[0-9]+")]
    MacroParamGreedy,
    #[regex(r"%-[0-9]+")]
    MacroParamReverse,
    #[regex(r"%%[A-Za-z_][A-Za-z0-9_]*")]
    MacroLocalRef,
    #[regex(r"%\$+[A-Za-z_][A-Za-z0-9_]*")]
    ContextLocalRef,
    #[token("%{")]
    MacroExplicitStart,
    #[token("%[")]
    MacroExpansionStart,
    #[token("%!")]
    EnvVarPrefix,
    #[token("%??")]
    QueryExpand,
    #[token("%?")]
    Query,
    #[token("%+")]
    PasteOp,
    #[token("%%")]
    SignedMod,
    #[token("%")]
    Mod,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Mul,
    #[token("//")]
    SignedDiv,
    #[token("/")]
    Div,
    #[token("&&")]
    BooleanAnd,
    #[token("&")]
    Amp,
    #[token("||")]
    BooleanOr,
    #[token("|")]
    Pipe,
    #[token("^^")]
    BooleanXor,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("!=")]
    NotEqual1,
    #[token("!")]
    Exclaim,
    #[token("<<<")]
    LshiftComplete,
    #[token("<<")]
    Lshift,
    #[token(">>>")]
    RshiftComplete,
    #[token(">>")]
    Rshift,
    #[token("==")]
    EqEq,
    #[token("<=>")]
    Spaceship,
    #[token("<>")]
    NotEqual2,
    #[token("<=")]
    Lte,
    #[token("<")]
    Lt,
    #[token(">=")]
    Gte,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,

    // Separators and specials
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("?")]
    QuestionMark,
    #[token("$$")]
    DoubleDollar,
    #[token("$")]
    Dollar,
    #[token("..")]
    DotDot,
}

fn put(map: &mut HashMap<String, TokenKind>, names: &[&str], kind: TokenKind) {
    for name in names {
        map.insert((*name).to_string(), kind);
    }
}

/// Identifier-shaped keywords, registers and builtin names of the dialect.
static WORDS: Lazy<HashMap<String, TokenKind>> = Lazy::new(|| {
    let mut map = HashMap::new();

    put(
        &mut map,
        &["byte", "word", "dword", "qword", "tword", "oword", "yword", "zword"],
        TokenKind::SizeSpec,
    );
    put(&mut map, &["db", "dw", "dd", "dq", "dt", "do", "dy", "dz"], TokenKind::DataSize);
    put(
        &mut map,
        &["resb", "resw", "resd", "resq", "rest", "reso", "resy", "resz"],
        TokenKind::SpaceSize,
    );
    put(&mut map, &["equ"], TokenKind::Equ);
    put(&mut map, &["section"], TokenKind::SectionKw);
    put(&mut map, &["segment"], TokenKind::SegmentKw);
    put(&mut map, &["global"], TokenKind::GlobalKw);
    put(&mut map, &["extern"], TokenKind::ExternKw);
    put(&mut map, &["common"], TokenKind::CommonKw);
    put(&mut map, &["bits"], TokenKind::BitsKw);
    put(&mut map, &["use16"], TokenKind::Use16Kw);
    put(&mut map, &["use32"], TokenKind::Use32Kw);
    put(&mut map, &["use64"], TokenKind::Use64Kw);
    put(&mut map, &["align"], TokenKind::AlignKw);
    put(&mut map, &["alignb"], TokenKind::AlignbKw);
    put(&mut map, &["sectalign"], TokenKind::SectalignKw);
    put(&mut map, &["org"], TokenKind::OrgKw);
    put(&mut map, &["cpu"], TokenKind::CpuKw);
    put(&mut map, &["float"], TokenKind::FloatKw);
    put(&mut map, &["default"], TokenKind::DefaultKw);
    put(&mut map, &["absolute"], TokenKind::AbsoluteKw);
    put(&mut map, &["incbin"], TokenKind::IncbinKw);
    put(&mut map, &["struc"], TokenKind::StrucKw);
    put(&mut map, &["endstruc"], TokenKind::EndstrucKw);
    put(&mut map, &["istruc"], TokenKind::IstrucKw);
    put(&mut map, &["iend"], TokenKind::IendKw);
    put(&mut map, &["at"], TokenKind::AtKw);
    put(&mut map, &["times"], TokenKind::Times);
    put(
        &mut map,
        &["exec", "write", "nobits", "progbits", "alloc", "noalloc", "noexec", "nowrite"],
        TokenKind::SectionAttrKw,
    );
    put(
        &mut map,
        &[
            "lock", "rep", "repe", "repne", "repz", "repnz", "xacquire", "xrelease", "bnd",
            "o16", "o32", "o64", "a16", "a32", "a64",
        ],
        TokenKind::InstructionPrefix,
    );
    put(&mut map, &["abs"], TokenKind::Abs);
    put(&mut map, &["rel"], TokenKind::Rel);
    put(&mut map, &["seg"], TokenKind::Seg);
    put(&mut map, &["wrt"], TokenKind::Wrt);
    put(&mut map, &["strict"], TokenKind::Strict);
    put(&mut map, &["dup"], TokenKind::Dup);
    put(&mut map, &["defined"], TokenKind::Defined);
    put(&mut map, &["z"], TokenKind::Zeroing);
    put(&mut map, &["sae"], TokenKind::Sae);
    put(
        &mut map,
        &["__ilog2e__", "__ilog2w__", "__ilog2f__", "__ilog2c__"],
        TokenKind::BuiltinFunc,
    );
    put(
        &mut map,
        &["__utf16__", "__utf16le__", "__utf16be__", "__utf32__", "__utf32le__", "__utf32be__"],
        TokenKind::StringFunc,
    );
    put(
        &mut map,
        &[
            "__float8__", "__float16__", "__bfloat16__", "__float32__", "__float64__",
            "__float80m__", "__float80e__", "__float128l__", "__float128h__",
        ],
        TokenKind::FloatFunc,
    );
    put(
        &mut map,
        &["__infinity__", "__nan__", "__snan__", "__qnan__"],
        TokenKind::SpecialFloat,
    );

    put(&mut map, &["cs", "ds", "es", "fs", "gs", "ss"], TokenKind::SegRegister);
    for i in 0..8 {
        map.insert(format!("k{i}"), TokenKind::MaskReg);
        map.insert(format!("st{i}"), TokenKind::Register);
        map.insert(format!("mm{i}"), TokenKind::Register);
        map.insert(format!("dr{i}"), TokenKind::Register);
        map.insert(format!("cr{i}"), TokenKind::Register);
    }
    put(
        &mut map,
        &[
            "al", "ah", "bl", "bh", "cl", "ch", "dl", "dh", "spl", "bpl", "sil", "dil",
            "ax", "bx", "cx", "dx", "sp", "bp", "si", "di",
            "eax", "ebx", "ecx", "edx", "esp", "ebp", "esi", "edi",
            "rax", "rbx", "rcx", "rdx", "rsp", "rbp", "rsi", "rdi",
            "ip", "eip", "rip",
        ],
        TokenKind::Register,
    );
    for i in 8..16 {
        for suffix in ["", "b", "w", "d"] {
            map.insert(format!("r{i}{suffix}"), TokenKind::Register);
        }
    }
    for i in 0..16 {
        map.insert(format!("xmm{i}"), TokenKind::Register);
        map.insert(format!("ymm{i}"), TokenKind::Register);
    }
    for i in 0..32 {
        map.insert(format!("zmm{i}"), TokenKind::Register);
    }

    map
});

/// `%directive` spellings the lexer contract special-cases.
static DIRECTIVES: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("%macro", TokenKind::MacroStart),
        ("%imacro", TokenKind::MacroStart),
        ("%endmacro", TokenKind::MacroEnd),
        ("%define", TokenKind::MacroDefine),
        ("%idefine", TokenKind::MacroDefine),
        ("%xdefine", TokenKind::MacroDefine),
        ("%assign", TokenKind::MacroAssign),
        ("%iassign", TokenKind::MacroAssign),
        ("%if", TokenKind::MacroIf),
        ("%ifdef", TokenKind::MacroIfdef),
        ("%ifndef", TokenKind::MacroIfndef),
        ("%ifmacro", TokenKind::MacroIfmacro),
        ("%elif", TokenKind::MacroElif),
        ("%elifmacro", TokenKind::MacroElifmacro),
        ("%else", TokenKind::MacroElse),
        ("%endif", TokenKind::MacroEndif),
        ("%rep", TokenKind::MacroRep),
        ("%endrep", TokenKind::MacroEndrep),
        ("%exitrep", TokenKind::MacroExitrep),
        ("%exitmacro", TokenKind::MacroExitmacro),
        ("%while", TokenKind::MacroWhile),
        ("%endwhile", TokenKind::MacroEndwhile),
        ("%include", TokenKind::MacroInclude),
        ("%use", TokenKind::MacroUse),
        ("%push", TokenKind::MacroPush),
        ("%pop", TokenKind::MacroPop),
        ("%repl", TokenKind::MacroRepl),
        ("%arg", TokenKind::MacroArgDecl),
        ("%stacksize", TokenKind::MacroStacksize),
        ("%local", TokenKind::MacroLocal),
        ("%rotate", TokenKind::MacroRotate),
        ("%strlen", TokenKind::MacroStrlen),
        ("%substr", TokenKind::MacroSubstr),
        ("%strcat", TokenKind::MacroStrcat),
        ("%pathsearch", TokenKind::MacroPathsearch),
        ("%depend", TokenKind::MacroDepend),
        ("%aliases", TokenKind::MacroAliases),
        ("%clear", TokenKind::MacroClear),
        ("%undef", TokenKind::MacroUndef),
        ("%unmacro", TokenKind::MacroUnmacro),
        ("%error", TokenKind::MacroError),
        ("%warning", TokenKind::MacroError),
        ("%fatal", TokenKind::MacroError),
        ("%line", TokenKind::MacroLine),
        ("%pragma", TokenKind::MacroPragma),
    ])
});

fn classify(raw: RawToken, text: &str) -> TokenKind {
    match raw {
        RawToken::Whitespace => TokenKind::Whitespace,
        RawToken::Comment => TokenKind::Comment,
        RawToken::Crlf => TokenKind::Crlf,
        RawToken::String => TokenKind::String,
        RawToken::Number => TokenKind::Number,
        RawToken::Float => TokenKind::Float,
        RawToken::Word => WORDS
            .get(&text.to_ascii_lowercase())
            .copied()
            .unwrap_or(TokenKind::Identifier),
        RawToken::Broadcast => TokenKind::Broadcast,
        RawToken::Rounding => TokenKind::Rounding,
        RawToken::WrtSuffix => TokenKind::WrtSuffix,
        RawToken::Directive => DIRECTIVES
            .get(text.to_ascii_lowercase().as_str())
            .copied()
            .unwrap_or(TokenKind::PreprocessorDirective),
        RawToken::MacroParam => TokenKind::MacroParam,
        RawToken::MacroParamGreedy => TokenKind::MacroParamGreedy,
        RawToken::MacroParamReverse => TokenKind::MacroParamReverse,
        RawToken::MacroLocalRef => TokenKind::MacroLocalRef,
        RawToken::ContextLocalRef => TokenKind::ContextLocalRef,
        RawToken::MacroExplicitStart => TokenKind::MacroExplicitStart,
        RawToken::MacroExpansionStart => TokenKind::MacroExpansionStart,
        RawToken::EnvVarPrefix => TokenKind::EnvVarPrefix,
        RawToken::QueryExpand => TokenKind::QueryExpand,
        RawToken::Query => TokenKind::Query,
        RawToken::PasteOp => TokenKind::PasteOp,
        RawToken::SignedMod => TokenKind::SignedMod,
        RawToken::Mod => TokenKind::Mod,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Mul => TokenKind::Mul,
        RawToken::SignedDiv => TokenKind::SignedDiv,
        RawToken::Div => TokenKind::Div,
        RawToken::BooleanAnd => TokenKind::BooleanAnd,
        RawToken::Amp => TokenKind::Amp,
        RawToken::BooleanOr => TokenKind::BooleanOr,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::BooleanXor => TokenKind::BooleanXor,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::NotEqual1 => TokenKind::NotEqual1,
        RawToken::Exclaim => TokenKind::Exclaim,
        RawToken::LshiftComplete => TokenKind::LshiftComplete,
        RawToken::Lshift => TokenKind::Lshift,
        RawToken::RshiftComplete => TokenKind::RshiftComplete,
        RawToken::Rshift => TokenKind::Rshift,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::Spaceship => TokenKind::Spaceship,
        RawToken::NotEqual2 => TokenKind::NotEqual2,
        RawToken::Lte => TokenKind::Lte,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gte => TokenKind::Gte,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Eq => TokenKind::Eq,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Colon => TokenKind::Colon,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::QuestionMark => TokenKind::QuestionMark,
        RawToken::DoubleDollar => TokenKind::DoubleDollar,
        RawToken::Dollar => TokenKind::Dollar,
        RawToken::DotDot => TokenKind::DotDot,
    }
}

/// Tokenize a source string into the parser's input contract.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();
    let mut line = 1usize;
    let mut column = 1usize;
    let mut offset = 0usize;

    while let Some(raw) = lexer.next() {
        let text = lexer.slice();
        let raw = match raw {
            Ok(raw) => raw,
            Err(()) => panic!("unexpected character {:?} at {}:{}", text, line, column),
        };
        let kind = classify(raw, text);
        tokens.push(Token::new(kind, text, Location::new(line, column, offset)));
        offset += text.len();
        for ch in text.chars() {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
    }
    tokens
}

pub fn parse(source: &str) -> Parse {
    parse_program(tokenize(source))
}

pub fn parse_with(source: &str, config: &ParseConfig) -> Parse {
    parse_program_with(tokenize(source), config)
}

/// Parse and assert the two universal invariants: no diagnostics and exact
/// round-trip.
pub fn parse_clean(source: &str) -> Parse {
    let parse = parse(source);
    assert!(
        parse.errors.is_empty(),
        "unexpected diagnostics for {:?}: {:?}",
        source,
        parse.errors
    );
    assert_eq!(parse.tree.text(), source, "round-trip mismatch");
    parse
}
