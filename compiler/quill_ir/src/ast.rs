//! Statement and expression trees, functions, and modules.
//!
//! The tree is owned and mutable: lowering passes edit it in place by
//! detaching blocks, splicing replacement statements, and replacing
//! compound nodes with their rewritten forms. Resolution and type
//! checking run before any middle-end pass, so every resolved call node
//! carries a bound [`FuncId`] and every catch binding has a known type.

use bitflags::bitflags;

use crate::{FuncId, LabelId, Name, Span, SymbolTable, TypeId, TypePool, VarId};

bitflags! {
    /// Function attribute flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct FnFlags: u8 {
        /// The function can complete with an error ("declared throwing").
        /// Set by resolution for user functions; inferred by the
        /// error-handling pass for task wrappers.
        const THROWS = 1 << 0;
        /// Compiler-synthesized task-launch wrapper. Its throwing
        /// attribute is inferred from its body rather than declared.
        const TASK_WRAPPER = 1 << 1;
    }
}

/// A function definition.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Function {
    pub name: Name,
    pub params: Vec<VarId>,
    pub flags: FnFlags,
    pub body: Block,
    /// The synthesized trailing out-error formal. `Some` only after the
    /// error-handling pass runs, and only for throwing functions.
    pub out_error: Option<VarId>,
    /// The single function-exit label all early-return paths jump to.
    /// Created once, alongside `out_error`.
    pub epilogue: Option<LabelId>,
    pub span: Span,
}

impl Function {
    pub fn new(name: Name, body: Block, span: Span) -> Self {
        Function {
            name,
            params: Vec::new(),
            flags: FnFlags::empty(),
            body,
            out_error: None,
            epilogue: None,
            span,
        }
    }

    /// Whether this function can complete with an error.
    pub fn throws_error(&self) -> bool {
        self.flags.contains(FnFlags::THROWS)
    }

    /// Mark the function as throwing (inference for task wrappers).
    pub fn set_throws(&mut self) {
        self.flags.insert(FnFlags::THROWS);
    }

    /// Whether this is a compiler-synthesized task-launch wrapper.
    pub fn is_task_wrapper(&self) -> bool {
        self.flags.contains(FnFlags::TASK_WRAPPER)
    }
}

/// A whole program as seen by the middle-end.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Module {
    pub functions: Vec<Function>,
    pub symbols: SymbolTable,
    pub types: TypePool,
}

impl Module {
    pub fn new(symbols: SymbolTable, types: TypePool) -> Self {
        Module {
            functions: Vec::new(),
            symbols,
            types,
        }
    }

    /// Add a function, returning its id for call-site binding.
    pub fn add_function(&mut self, func: Function) -> FuncId {
        let id = FuncId::from_raw(u32::try_from(self.functions.len()).unwrap_or_else(|_| {
            panic!("module overflow: more than u32::MAX functions");
        }));
        self.functions.push(func);
        id
    }

    /// Look up a function by id.
    pub fn function(&self, id: FuncId) -> &Function {
        &self.functions[id.index()]
    }
}

/// A statement block.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(span: Span) -> Self {
        Block {
            stmts: Vec::new(),
            span,
        }
    }

    /// Insert a statement at the head of the block.
    pub fn insert_at_head(&mut self, stmt: Stmt) {
        self.stmts.insert(0, stmt);
    }

    /// Append a statement at the tail of the block.
    pub fn push(&mut self, stmt: Stmt) {
        self.stmts.push(stmt);
    }

    pub fn len(&self) -> usize {
        self.stmts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stmts.is_empty()
    }
}

/// Discriminates the two kinds of non-structured jump the lowering
/// synthesizes, for downstream consumers that treat them differently.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum GotoKind {
    /// Jump to a try's handler label.
    ErrorHandling,
    /// Jump to the function epilogue.
    Return,
}

/// A statement.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Statement kinds.
///
/// `Try` and `Throw` exist only before the error-handling pass;
/// `Label`, `Goto`, `DeleteError`, and `Halt` are synthesized by it.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum StmtKind {
    /// Declaration point of a local or temporary.
    Decl(VarId),
    /// Definition point of a label.
    Label(LabelId),
    /// Unconditional jump.
    Goto { kind: GotoKind, target: LabelId },
    /// Initializing move into a variable.
    Move { dst: VarId, src: Expr },
    /// Plain assignment. Distinct from `Move`: the out-parameter store
    /// must be a plain assignment to avoid aliasing-checker false
    /// positives in later stages.
    Assign { dst: VarId, src: Expr },
    /// Conditional.
    If {
        cond: Expr,
        then_block: Block,
        else_block: Option<Block>,
    },
    /// Nested scope.
    Block(Block),
    /// Structured try/catch. Removed by the error-handling pass.
    Try(Box<TryStmt>),
    /// Explicit throw. Removed by the error-handling pass.
    Throw { value: Expr },
    /// Expression statement (calls for effect).
    Expr(Expr),
    /// Return from the enclosing function.
    Return { value: Option<Expr> },
    /// Runtime call releasing an error consumed by a catch clause.
    DeleteError(VarId),
    /// Unconditional program halt with a fixed message.
    Halt { message: &'static str },
}

/// A structured try region: a body and an ordered catch list.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TryStmt {
    /// `try!`: abort the program on an unhandled error instead of
    /// propagating it to the caller.
    pub bang: bool,
    pub body: Block,
    pub catches: Vec<CatchClause>,
    pub span: Span,
}

/// One catch clause.
///
/// `binding == None` is the untyped catch-all. A binding typed exactly
/// [`TypeId::ERROR`](crate::TypeId) is a catch-all by convention; a
/// strict subtype catches only that subtype.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CatchClause {
    pub binding: Option<VarId>,
    pub body: Block,
    pub span: Span,
}

/// Call target: bound by resolution, or still unresolved (primitives,
/// builtins this pass does not care about).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Callee {
    Resolved(FuncId),
    Unresolved(Name),
}

/// An expression.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Variable reference.
    pub fn var(id: VarId, span: Span) -> Self {
        Expr::new(ExprKind::Var(id), span)
    }

    /// The nil sentinel ("no error").
    pub fn nil(span: Span) -> Self {
        Expr::new(ExprKind::Nil, span)
    }

    /// `value != nil` test.
    pub fn not_nil(value: Expr, span: Span) -> Self {
        Expr::new(ExprKind::NotNil(Box::new(value)), span)
    }
}

/// Expression kinds.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ExprKind {
    /// Variable reference.
    Var(VarId),
    /// The nil sentinel.
    Nil,
    /// `value != nil`.
    NotNil(Box<Expr>),
    /// Function call.
    Call { callee: Callee, args: Vec<Expr> },
    /// Static cast (used to widen an error value to the `Error` class).
    Cast { ty: TypeId, value: Box<Expr> },
    /// Checked downcast: yields nil when the value is not an instance of
    /// `ty`. Drives catch-clause dispatch.
    DynCast { ty: TypeId, value: Box<Expr> },
}
