//! The mutating half of the pass: rewrites try/catch/throw and calls to
//! throwing functions into explicit error temporaries, nil tests, labels,
//! and gotos.
//!
//! A sketch of the transformation for a propagating function:
//!
//! ```text
//! // given code
//! fn propagate() throws {
//!   try {
//!     a(); // throws
//!     b(); // does not throw
//!   } catch e: SubError {
//!     f();
//!   }
//! }
//!
//! // after this pass
//! fn propagate(ref error_out: Error) {
//!   {
//!     var error: Error;
//!     a(error);
//!     if error != nil then goto handler;
//!     b();
//!
//!     label handler:
//!     if error != nil {
//!       var e = error as? SubError;
//!       if e != nil {
//!         f();
//!         delete_error(error);
//!       } else {
//!         error_out = error: Error;
//!         goto epilogue;
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Errors are not automatically deallocated when consumed by a catch;
//! the single `DeleteError` appended at the end of each catch body is the
//! only release point the surrounding ownership story permits.

use quill_ir::{
    Block, Callee, CatchClause, Expr, ExprKind, Function, GotoKind, LabelId, Name, Span, Stmt,
    StmtKind, StringInterner, SymbolTable, TryStmt, TypeId, TypePool, VarId,
};

use crate::LowerFlags;

/// Runtime message for errors no handler or caller can receive.
const UNCAUGHT_ERROR: &str = "uncaught error";

/// An active try scope during lowering.
///
/// Created on try entry, consumed exactly once when the try's dispatch
/// chain is synthesized. A throw or throwing call nested inside N try
/// levels finds its handler through the innermost of these.
#[derive(Copy, Clone)]
struct TryContext {
    error_var: VarId,
    handler: LabelId,
    bang: bool,
    span: Span,
}

/// Per-function lowering state.
///
/// Owns the two scope stacks; they are per-traversal, never shared
/// between functions.
pub(crate) struct Lowerer<'a> {
    funcs: &'a [Function],
    symbols: &'a mut SymbolTable,
    types: &'a TypePool,
    flags: &'a LowerFlags,
    /// The enclosing function's out-error formal, if it is throwing.
    out_error: Option<VarId>,
    /// The enclosing function's epilogue label, created alongside
    /// `out_error`.
    epilogue: Option<LabelId>,
    /// Innermost-last stack of enclosing try scopes.
    try_stack: Vec<TryContext>,
    /// Try scopes whose catch clauses are currently being lowered.
    catches_stack: Vec<TryContext>,

    // Pre-interned names for synthesized symbols.
    name_error: Name,
    name_handler: Name,
    name_error_exists: Name,
}

impl<'a> Lowerer<'a> {
    pub(crate) fn new(
        funcs: &'a [Function],
        symbols: &'a mut SymbolTable,
        types: &'a TypePool,
        interner: &StringInterner,
        flags: &'a LowerFlags,
        out_error: Option<VarId>,
        epilogue: Option<LabelId>,
    ) -> Self {
        Lowerer {
            funcs,
            symbols,
            types,
            flags,
            out_error,
            epilogue,
            try_stack: Vec::new(),
            catches_stack: Vec::new(),
            name_error: interner.intern("error"),
            name_handler: interner.intern("handler"),
            name_error_exists: interner.intern("error_exists"),
        }
    }

    /// Lower a whole function body.
    pub(crate) fn lower_function_body(&mut self, body: Block) -> Block {
        let lowered = self.lower_block(body);
        debug_assert!(self.try_stack.is_empty(), "unbalanced try scope stack");
        debug_assert!(self.catches_stack.is_empty(), "unbalanced catches stack");
        lowered
    }

    fn lower_block(&mut self, block: Block) -> Block {
        let mut out = Block::new(block.span);
        for stmt in block.stmts {
            self.lower_stmt(stmt, &mut out);
        }
        out
    }

    /// Lower one statement, splicing its replacement(s) into `out`.
    fn lower_stmt(&mut self, stmt: Stmt, out: &mut Block) {
        let span = stmt.span;
        match stmt.kind {
            StmtKind::Try(node) => self.lower_try(*node, out),
            StmtKind::Throw { value } => self.lower_throw(value, span, out),
            StmtKind::If {
                cond,
                then_block,
                else_block,
            } => {
                // Conditions are flattened to temporaries upstream, so
                // only the branch blocks can hold throwing constructs.
                let then_block = self.lower_block(then_block);
                let else_block = else_block.map(|block| self.lower_block(block));
                out.push(Stmt::new(
                    StmtKind::If {
                        cond,
                        then_block,
                        else_block,
                    },
                    span,
                ));
            }
            StmtKind::Block(block) => {
                let block = self.lower_block(block);
                out.push(Stmt::new(StmtKind::Block(block), span));
            }
            kind @ (StmtKind::Expr(_)
            | StmtKind::Move { .. }
            | StmtKind::Assign { .. }
            | StmtKind::Return { .. }) => {
                self.lower_call_bearing_stmt(Stmt::new(kind, span), out);
            }
            kind => out.push(Stmt::new(kind, span)),
        }
    }

    /// Lower a statement whose expressions may contain throwing calls:
    /// declarations for fresh error temporaries go immediately before the
    /// statement, error checks immediately after it, in evaluation order.
    fn lower_call_bearing_stmt(&mut self, mut stmt: Stmt, out: &mut Block) {
        let span = stmt.span;
        let mut checks: Vec<Stmt> = Vec::new();
        match &mut stmt.kind {
            StmtKind::Expr(expr)
            | StmtKind::Move { src: expr, .. }
            | StmtKind::Assign { src: expr, .. }
            | StmtKind::Return { value: Some(expr) } => {
                self.lower_expr(expr, span, out, &mut checks);
            }
            _ => {}
        }
        out.push(stmt);
        for check in checks {
            out.push(check);
        }
    }

    fn lower_expr(
        &mut self,
        expr: &mut Expr,
        stmt_span: Span,
        before: &mut Block,
        checks: &mut Vec<Stmt>,
    ) {
        match &mut expr.kind {
            ExprKind::Call { callee, args } => {
                // Arguments evaluate first; their checks come first.
                for arg in args.iter_mut() {
                    self.lower_expr(arg, stmt_span, before, checks);
                }
                if let Callee::Resolved(id) = callee {
                    if self.funcs[id.index()].throws_error() {
                        self.lower_throwing_call(args, expr.span, stmt_span, before, checks);
                    }
                }
            }
            ExprKind::NotNil(value)
            | ExprKind::Cast { value, .. }
            | ExprKind::DynCast { value, .. } => {
                self.lower_expr(value, stmt_span, before, checks);
            }
            ExprKind::Var(_) | ExprKind::Nil => {}
        }
    }

    /// Rewrite a call to a throwing function: give it an error temporary
    /// as an implicit trailing argument and check that temporary right
    /// after the containing statement.
    fn lower_throwing_call(
        &mut self,
        args: &mut Vec<Expr>,
        call_span: Span,
        stmt_span: Span,
        before: &mut Block,
        checks: &mut Vec<Stmt>,
    ) {
        let mut policy = Block::new(call_span);

        let error_var = if let Some(info) = self.try_stack.last() {
            policy.push(Stmt::new(
                StmtKind::Goto {
                    kind: GotoKind::ErrorHandling,
                    target: info.handler,
                },
                call_span,
            ));
            info.error_var
        } else if self.flags.strict_error_handling {
            panic!("internal error: throwing call without try survived validation (strict mode)");
        } else {
            // Without a try there is no scope-wide error slot; make one
            // right before the statement.
            let error_var = self.new_error_temp(call_span);
            before.push(Stmt::new(StmtKind::Decl(error_var), stmt_span));

            if self.out_error.is_some() {
                self.set_out_goto_epilogue(Expr::var(error_var, call_span), call_span, &mut policy);
            } else {
                policy.push(Stmt::new(
                    StmtKind::Halt {
                        message: UNCAUGHT_ERROR,
                    },
                    call_span,
                ));
            }
            error_var
        };

        // The implicit trailing out-error argument.
        args.push(Expr::var(error_var, call_span));
        checks.extend(self.error_cond(error_var, policy, None, call_span));
    }

    /// Lower a try statement. The try node disappears, replaced by its
    /// body block with the error temporary declared at its head, the
    /// handler label at its tail, and the dispatch chain after the label.
    fn lower_try(&mut self, node: TryStmt, out: &mut Block) {
        let TryStmt {
            bang,
            body,
            catches,
            span,
        } = node;

        let info = TryContext {
            error_var: self.new_error_temp(span),
            handler: self.symbols.new_label(self.name_handler, span),
            bang,
            span,
        };
        self.try_stack.push(info);
        let mut body = self.lower_block(body);
        self.try_stack.pop();

        body.insert_at_head(Stmt::new(StmtKind::Decl(info.error_var), span));
        body.push(Stmt::new(StmtKind::Label(info.handler), span));

        if catches.is_empty() {
            // No catch clauses to traverse; synthesize the dispatch now.
            self.lower_catches(info, Vec::new(), &mut body);
        } else {
            // Catch bodies are lowered against the enclosing try scope
            // (the context is already popped); the in-progress context
            // waits on the catches stack until the last clause is done.
            self.catches_stack.push(info);
            let last = catches.len() - 1;
            let mut lowered = Vec::with_capacity(catches.len());
            for (i, clause) in catches.into_iter().enumerate() {
                let clause_body = self.lower_block(clause.body);
                lowered.push(CatchClause {
                    binding: clause.binding,
                    body: clause_body,
                    span: clause.span,
                });
                if i == last {
                    self.catches_stack.pop();
                    self.lower_catches(info, std::mem::take(&mut lowered), &mut body);
                }
            }
        }

        out.push(Stmt::new(StmtKind::Block(body), span));
    }

    /// Append the dispatch chain for a try to its body: one chain link
    /// per catch clause in source order, wrapped in a single
    /// if-error-is-set conditional.
    fn lower_catches(&mut self, info: TryContext, catches: Vec<CatchClause>, body: &mut Block) {
        let handlers = self.handler_chain(info, catches.into_iter());
        for stmt in self.error_cond(info.error_var, handlers, None, info.span) {
            body.push(stmt);
        }
    }

    fn handler_chain(
        &mut self,
        info: TryContext,
        mut rest: std::vec::IntoIter<CatchClause>,
    ) -> Block {
        let Some(clause) = rest.next() else {
            return self.handler_fallback(info);
        };
        let CatchClause {
            binding,
            mut body,
            span,
        } = clause;

        // The catch body, once entered, owns the error and must release
        // it; this is the only deallocation point.
        body.push(Stmt::new(StmtKind::DeleteError(info.error_var), span));

        let mut link = Block::new(span);
        match binding {
            // untyped catchall
            None => {
                if rest.next().is_some() {
                    panic!("internal error: catchall placed before the end of a catch list");
                }
                link.push(Stmt::new(StmtKind::Block(body), span));
            }
            // catchall by type: bind the error directly, no cast
            Some(bind) if self.symbols.var(bind).ty == TypeId::ERROR => {
                if rest.next().is_some() {
                    panic!("internal error: catchall placed before the end of a catch list");
                }
                link.push(Stmt::new(StmtKind::Decl(bind), span));
                link.push(Stmt::new(
                    StmtKind::Move {
                        dst: bind,
                        src: Expr::var(info.error_var, span),
                    },
                    span,
                ));
                for stmt in self.error_cond(bind, body, None, span) {
                    link.push(stmt);
                }
            }
            // specified catch: checked downcast, nil means "not this
            // type" and falls through to the next link
            Some(bind) => {
                let ty = self.symbols.var(bind).ty;
                debug_assert!(
                    self.types.is_error_subtype(ty),
                    "catch binding type is not an error subtype",
                );
                let next = self.handler_chain(info, rest);
                link.push(Stmt::new(StmtKind::Decl(bind), span));
                link.push(Stmt::new(
                    StmtKind::Move {
                        dst: bind,
                        src: Expr::new(
                            ExprKind::DynCast {
                                ty,
                                value: Box::new(Expr::var(info.error_var, span)),
                            },
                            span,
                        ),
                    },
                    span,
                ));
                for stmt in self.error_cond(bind, body, Some(next), span) {
                    link.push(stmt);
                }
            }
        }
        link
    }

    /// Tail of a non-exhaustive dispatch chain, in priority order:
    /// halt (try!), re-propagate into the enclosing try, hand off to the
    /// caller through the out formal, or fail — a non-exhaustive try in a
    /// non-throwing, non-nested context must not survive validation.
    fn handler_fallback(&mut self, info: TryContext) -> Block {
        let span = info.span;
        let mut block = Block::new(span);
        if info.bang {
            block.push(Stmt::new(
                StmtKind::Halt {
                    message: UNCAUGHT_ERROR,
                },
                span,
            ));
        } else if let Some(outer) = self.try_stack.last().copied() {
            block.push(Stmt::new(
                StmtKind::Move {
                    dst: outer.error_var,
                    src: Expr::var(info.error_var, span),
                },
                span,
            ));
            block.push(Stmt::new(
                StmtKind::Goto {
                    kind: GotoKind::ErrorHandling,
                    target: outer.handler,
                },
                span,
            ));
        } else if self.out_error.is_some() {
            self.set_out_goto_epilogue(Expr::var(info.error_var, span), span, &mut block);
        } else {
            panic!("internal error: try without a catchall in a non-throwing function");
        }
        block
    }

    /// Lower an explicit throw: move the (widened) value into the
    /// innermost try's error slot, or hand it to the caller.
    fn lower_throw(&mut self, value: Expr, span: Span, out: &mut Block) {
        let mut block = Block::new(span);
        if let Some(info) = self.try_stack.last().copied() {
            block.push(Stmt::new(
                StmtKind::Move {
                    dst: info.error_var,
                    src: Expr::new(
                        ExprKind::Cast {
                            ty: TypeId::ERROR,
                            value: Box::new(value),
                        },
                        span,
                    ),
                },
                span,
            ));
            block.push(Stmt::new(
                StmtKind::Goto {
                    kind: GotoKind::ErrorHandling,
                    target: info.handler,
                },
                span,
            ));
        } else if self.out_error.is_some() {
            // set_out_goto_epilogue applies the widening cast itself.
            self.set_out_goto_epilogue(value, span, &mut block);
        } else {
            panic!("internal error: cannot throw in a non-throwing function");
        }
        out.push(Stmt::new(StmtKind::Block(block), span));
    }

    /// Store an error into the out formal and jump to the epilogue.
    fn set_out_goto_epilogue(&mut self, error: Expr, span: Span, block: &mut Block) {
        let (Some(out_error), Some(epilogue)) = (self.out_error, self.epilogue) else {
            panic!("internal error: out-error epilogue requested in a non-throwing function");
        };
        // Plain assignment rather than a move: the out formal is a ref
        // intent and later aliasing checks reject a move into it.
        block.push(Stmt::new(
            StmtKind::Assign {
                dst: out_error,
                src: Expr::new(
                    ExprKind::Cast {
                        ty: TypeId::ERROR,
                        value: Box::new(error),
                    },
                    span,
                ),
            },
            span,
        ));
        block.push(Stmt::new(
            StmtKind::Goto {
                kind: GotoKind::Return,
                target: epilogue,
            },
            span,
        ));
    }

    /// `if error_var != nil { then_block } else { else_block }`, with the
    /// comparison flattened through a bool temporary for downstream
    /// codegen.
    fn error_cond(
        &mut self,
        error_var: VarId,
        then_block: Block,
        else_block: Option<Block>,
        span: Span,
    ) -> Vec<Stmt> {
        let exists = self
            .symbols
            .new_temp(self.name_error_exists, TypeId::BOOL, span);
        vec![
            Stmt::new(StmtKind::Decl(exists), span),
            Stmt::new(
                StmtKind::Move {
                    dst: exists,
                    src: Expr::not_nil(Expr::var(error_var, span), span),
                },
                span,
            ),
            Stmt::new(
                StmtKind::If {
                    cond: Expr::var(exists, span),
                    then_block,
                    else_block,
                },
                span,
            ),
        ]
    }

    fn new_error_temp(&mut self, span: Span) -> VarId {
        self.symbols.new_temp(self.name_error, TypeId::ERROR, span)
    }
}
