//! Hand-built module fixtures shared by the pass's unit tests.

use quill_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use quill_ir::{
    Block, Callee, CatchClause, Expr, ExprKind, FnFlags, FuncId, Function, Module, Span, Stmt,
    StmtKind, StringInterner, SymbolTable, TryStmt, TypeId, TypePool, VarId,
};

use crate::LowerFlags;

/// A small program: one throwing callee, one quiet callee, and two error
/// subclasses to catch.
pub(crate) struct Fixture {
    pub interner: StringInterner,
    pub module: Module,
    pub throwing_fn: FuncId,
    pub quiet_fn: FuncId,
    pub sub_error: TypeId,
    pub other_error: TypeId,
}

impl Fixture {
    pub fn new() -> Self {
        let interner = StringInterner::new();
        let mut types = TypePool::new(&interner);
        let sub_error = types.register(interner.intern("SubError"), Some(TypeId::ERROR));
        let other_error = types.register(interner.intern("AnotherSubError"), Some(TypeId::ERROR));

        let mut module = Module::new(SymbolTable::new(), types);
        let mut failing = Function::new(
            interner.intern("always_fails"),
            Block::new(Span::DUMMY),
            Span::DUMMY,
        );
        failing.set_throws();
        let throwing_fn = module.add_function(failing);
        let quiet_fn = module.add_function(Function::new(
            interner.intern("noop"),
            Block::new(Span::DUMMY),
            Span::DUMMY,
        ));

        Fixture {
            interner,
            module,
            throwing_fn,
            quiet_fn,
            sub_error,
            other_error,
        }
    }

    /// Statement calling `target` with no user arguments.
    pub fn call(&self, target: FuncId, span: Span) -> Stmt {
        Stmt::new(
            StmtKind::Expr(Expr::new(
                ExprKind::Call {
                    callee: Callee::Resolved(target),
                    args: Vec::new(),
                },
                span,
            )),
            span,
        )
    }

    /// An untyped catch-all clause with an empty body.
    pub fn catch_all(&self) -> CatchClause {
        CatchClause {
            binding: None,
            body: Block::new(Span::DUMMY),
            span: Span::DUMMY,
        }
    }

    /// A catch clause binding `e` of the given type, with an empty body.
    pub fn typed_catch(&mut self, ty: TypeId) -> CatchClause {
        let binding = self
            .module
            .symbols
            .new_var(self.interner.intern("e"), ty, Span::DUMMY);
        CatchClause {
            binding: Some(binding),
            body: Block::new(Span::DUMMY),
            span: Span::DUMMY,
        }
    }

    /// A block holding one try statement with the given body and catches.
    pub fn try_block(&self, body: Block, catches: Vec<CatchClause>) -> Block {
        let mut block = Block::new(Span::DUMMY);
        block.push(Stmt::new(
            StmtKind::Try(Box::new(TryStmt {
                bang: false,
                body,
                catches,
                span: Span::DUMMY,
            })),
            Span::DUMMY,
        ));
        block
    }

    /// A block holding one try statement whose body is a single call to
    /// `target`.
    pub fn try_around_call(&self, target: FuncId, catches: Vec<CatchClause>) -> Block {
        let mut body = Block::new(Span::DUMMY);
        body.push(self.call(target, Span::DUMMY));
        self.try_block(body, catches)
    }

    /// Declare a user variable.
    pub fn new_var(&mut self, name: &str, ty: TypeId) -> VarId {
        self.module
            .symbols
            .new_var(self.interner.intern(name), ty, Span::DUMMY)
    }

    /// Add a function under test.
    pub fn add_fn(&mut self, name: &str, throws: bool, body: Block) -> FuncId {
        let mut func = Function::new(self.interner.intern(name), body, Span::DUMMY);
        if throws {
            func.set_throws();
        }
        self.module.add_function(func)
    }

    /// Add a compiler-synthesized task wrapper.
    pub fn add_task_wrapper(&mut self, name: &str, body: Block) -> FuncId {
        let mut func = Function::new(self.interner.intern(name), body, Span::DUMMY);
        func.flags.insert(FnFlags::TASK_WRAPPER);
        self.module.add_function(func)
    }

    /// Run the whole pass over the fixture module.
    pub fn run(&mut self, flags: &LowerFlags) -> (Result<(), ErrorGuaranteed>, DiagnosticQueue) {
        let mut queue = DiagnosticQueue::new();
        let result =
            crate::lower_error_handling(&mut self.module, &self.interner, flags, &mut queue);
        (result, queue)
    }
}
