//! The closed node-kind enumeration of the concrete syntax tree.
//!
//! One variant per grammar non-terminal that produces a node, plus
//! [`NodeKind::Program`] for the root and [`NodeKind::Error`] for recovery
//! spans. Kind names mirror the grammar's non-terminals.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root node spanning the whole input
    Program,
    /// Recovery span wrapping tokens no rule could start
    Error,

    // Lines and blocks
    SourceLine,
    SourceLines,
    ConditionalBlock,
    MultiLineMacro,
    RepBlock,
    StrucBlock,
    IstrucBlock,

    // Expressions
    Expression,
    AtomExpr,

    // Labels and symbols
    LabelDef,
    GlobalLabel,
    LocalLabel,
    SymbolRef,
    SymbolDecl,
    SymbolList,
    SymbolName,
    SpecialSymbol,
    KeywordAsName,

    // Instructions and operands
    Instruction,
    PseudoInstruction,
    Mnemonic,
    Operand,
    OperandList,
    ExpandedOperand,
    ConditionalOperand,
    MemoryExpr,
    MemoryRef,
    EffectiveAddr,
    EaExpr,
    EaTerm,
    Scale,
    SegmentOverride,
    SegmentReg,
    SizeOverride,
    LockPrefix,
    VexPrefix,
    Decorator,
    DecoratorList,
    DecoratorItem,
    TimesExpr,

    // Data definitions
    DataDef,
    DataItem,
    DataList,
    ConditionalData,
    SpaceDef,

    // Assembler directives
    EquDefinition,
    AbsoluteDir,
    AlignDir,
    AtDirective,
    BitsDir,
    BracketedDirective,
    CommonDir,
    CpuDir,
    DefaultDir,
    DefaultOption,
    ExternDir,
    FloatDir,
    GlobalDir,
    IncludeDir,
    OrgDir,
    SectionDir,
    SectionName,
    SectionAttr,
    SectionAttrs,
    SectionAttrName,
    UsePackage,
    PackageName,
    StringOrEnv,

    // Preprocessor: conditionals
    Condition,
    IfDir,
    ElifDir,
    ElseDir,
    EndifDir,
    TokenComparison,

    // Preprocessor: macros
    PpAssignStmt,
    PpDefineStmt,
    MacroName,
    MacroParams,
    MacroParamRef,
    MacroRef,
    MacroFlags,
    MacroLines,
    MacroArgs,
    MacroArg,
    MacroBodyInline,
    MacroCall,
    MacroExpansion,
    SmacroExpansion,
    FunctionMacroCall,
    Invocation,
    ParamCount,
    ParamList,
    ParamSpec,
    ParamName,
    ParamQualifier,
    DefaultValue,

    // Preprocessor: directives
    PreprocessorLine,
    MacroDir,
    ContextDir,
    ContextName,
    ContextRef,
    ClearDir,
    ClearTarget,
    ExitDir,
    LineDir,
    MessageDir,
    MessageText,
    ArgDirective,
    LocalDirective,
    PreprocessorId,

    // Preprocessor: builtin functions
    BuiltinFunction,
    IntegerFunction,
    PreprocessorFunction,
    StringFunction,
    StringTransform,
    QueryFunction,
    DefinedFunc,
    FloatFormat,
    FloatValue,
    EnvVarRef,
    StringizeOp,

    // Token sequences
    TokenSequence,
    PreprocessorToken,
    Operator,
    Separator,
}
