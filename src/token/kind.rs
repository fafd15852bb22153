//! The closed token-kind enumeration produced by the external lexer.
//!
//! Kind names mirror the lexer's classification one-to-one and are part of
//! the parser's input contract. A handful of kinds (`MapKw`, `StaticKw`,
//! `RequiredKw`, `MacroPragma`, `MacroWhile`, `MacroEndwhile`) are emitted
//! by lexers but consumed by no grammar rule; they surface through error
//! recovery instead.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals and names
    Identifier,
    Number,
    String,
    Float,
    SpecialFloat,

    // Register classes
    Register,
    SegRegister,
    MaskReg,

    // Size and storage keywords
    SizeSpec,
    DataSize,
    SpaceSize,

    // Assembler keywords
    Equ,
    SectionKw,
    SegmentKw,
    GlobalKw,
    ExternKw,
    CommonKw,
    BitsKw,
    Use16Kw,
    Use32Kw,
    Use64Kw,
    AlignKw,
    AlignbKw,
    SectalignKw,
    OrgKw,
    CpuKw,
    FloatKw,
    DefaultKw,
    AbsoluteKw,
    IncbinKw,
    StrucKw,
    EndstrucKw,
    IstrucKw,
    IendKw,
    AtKw,
    MapKw,
    StaticKw,
    RequiredKw,
    SectionAttrKw,
    InstructionPrefix,
    Times,

    // Operand keywords
    Abs,
    Rel,
    Seg,
    Wrt,
    WrtSuffix,
    Strict,
    Dup,
    Defined,

    // Decorators
    Zeroing,
    Broadcast,
    Rounding,
    Sae,

    // Builtin function names
    BuiltinFunc,
    StringFunc,
    FloatFunc,

    // Preprocessor directives
    MacroStart,
    MacroEnd,
    MacroDefine,
    MacroAssign,
    MacroIf,
    MacroIfdef,
    MacroIfndef,
    MacroIfmacro,
    MacroElif,
    MacroElifmacro,
    MacroElse,
    MacroEndif,
    MacroRep,
    MacroEndrep,
    MacroExitrep,
    MacroExitmacro,
    MacroWhile,
    MacroEndwhile,
    MacroInclude,
    MacroUse,
    MacroPush,
    MacroPop,
    MacroRepl,
    MacroArgDecl,
    MacroStacksize,
    MacroLocal,
    MacroRotate,
    MacroStrlen,
    MacroSubstr,
    MacroStrcat,
    MacroPathsearch,
    MacroDepend,
    MacroAliases,
    MacroClear,
    MacroUndef,
    MacroUnmacro,
    MacroError,
    MacroLine,
    MacroPragma,
    /// Catch-all for `%identifier` directives the lexer does not special-case
    PreprocessorDirective,

    // Preprocessor operand tokens
    MacroParam,
    MacroParamGreedy,
    MacroParamReverse,
    MacroLocalRef,
    ContextLocalRef,
    MacroExpansionStart,
    MacroExplicitStart,
    EnvVarPrefix,
    Query,
    QueryExpand,
    PasteOp,

    // Operators
    Plus,
    Minus,
    Mul,
    Div,
    SignedDiv,
    Mod,
    SignedMod,
    Amp,
    Pipe,
    Caret,
    Tilde,
    Exclaim,
    Lshift,
    LshiftComplete,
    Rshift,
    RshiftComplete,
    BooleanAnd,
    BooleanOr,
    BooleanXor,
    EqEq,
    NotEqual1,
    NotEqual2,
    Lt,
    Lte,
    Gt,
    Gte,
    Spaceship,
    Eq,

    // Separators and special symbols
    Comma,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    QuestionMark,
    Dollar,
    DoubleDollar,
    DotDot,

    // Structure tokens
    Crlf,
    Whitespace,
    Comment,
    Eof,
}

impl TokenKind {
    /// Tokens the grammar never matches directly; they are attached to the
    /// tree as leaves but skipped by rule lookahead.
    pub fn is_trivia(self) -> bool {
        matches!(self, TokenKind::Whitespace | TokenKind::Comment)
    }

    pub fn is_register(self) -> bool {
        matches!(
            self,
            TokenKind::Register | TokenKind::SegRegister | TokenKind::MaskReg
        )
    }

    pub fn is_comparison_op(self) -> bool {
        matches!(
            self,
            TokenKind::EqEq
                | TokenKind::NotEqual1
                | TokenKind::NotEqual2
                | TokenKind::Lt
                | TokenKind::Lte
                | TokenKind::Gt
                | TokenKind::Gte
                | TokenKind::Spaceship
        )
    }

    pub fn is_mul_op(self) -> bool {
        matches!(
            self,
            TokenKind::Mul
                | TokenKind::Div
                | TokenKind::SignedDiv
                | TokenKind::Mod
                | TokenKind::SignedMod
        )
    }

    pub fn is_shift_op(self) -> bool {
        matches!(
            self,
            TokenKind::Lshift
                | TokenKind::LshiftComplete
                | TokenKind::Rshift
                | TokenKind::RshiftComplete
        )
    }

    pub fn is_unary_op(self) -> bool {
        matches!(
            self,
            TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Tilde
                | TokenKind::Exclaim
                | TokenKind::Seg
        )
    }

    /// The `operator` terminal class of the token-sequence grammar.
    pub fn is_operator(self) -> bool {
        self.is_mul_op()
            || self.is_shift_op()
            || self.is_comparison_op()
            || matches!(
                self,
                TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Amp
                    | TokenKind::Pipe
                    | TokenKind::Caret
                    | TokenKind::Tilde
                    | TokenKind::Exclaim
                    | TokenKind::BooleanAnd
                    | TokenKind::BooleanOr
                    | TokenKind::BooleanXor
                    | TokenKind::QuestionMark
                    | TokenKind::PasteOp
                    | TokenKind::Seg
                    | TokenKind::Wrt
            )
    }

    /// The `separator` terminal class of the token-sequence grammar.
    pub fn is_separator(self) -> bool {
        matches!(
            self,
            TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::LBrace
                | TokenKind::RBrace
        )
    }

    pub fn is_decorator_item(self) -> bool {
        matches!(
            self,
            TokenKind::MaskReg
                | TokenKind::Zeroing
                | TokenKind::Broadcast
                | TokenKind::Rounding
                | TokenKind::Sae
        )
    }

    /// Keywords usable as plain symbol names in symbol lists.
    pub fn is_keyword_as_name(self) -> bool {
        matches!(
            self,
            TokenKind::Abs
                | TokenKind::Rel
                | TokenKind::Seg
                | TokenKind::Strict
                | TokenKind::Dup
                | TokenKind::Wrt
                | TokenKind::AtKw
                | TokenKind::DefaultKw
        )
    }

    /// Directive tokens that terminate a conditional body without being
    /// consumed by it.
    pub fn is_conditional_marker(self) -> bool {
        matches!(
            self,
            TokenKind::MacroElif
                | TokenKind::MacroElifmacro
                | TokenKind::MacroElse
                | TokenKind::MacroEndif
        )
    }
}
