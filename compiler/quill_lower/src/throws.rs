//! Throw/propagation analysis.
//!
//! A read-only traversal that decides whether an error can leave a block
//! or function body unhandled, and validates the structural legality of
//! try/catch/throw usage.
//!
//! The analysis runs in two modes:
//! - **Inference** ([`can_block_throw`]): silent. Used to decide whether
//!   compiler-synthesized task wrappers should be marked throwing. Never
//!   emits diagnostics and never consults strict mode.
//! - **Diagnostic** ([`check_error_handling`]): validates a user function
//!   against its declared throwing attribute, accumulating diagnostics in
//!   the queue. Traversal never stops early — the goal is to report as
//!   many problems as possible in one run.

use quill_diagnostic::{Diagnostic, DiagnosticQueue, ErrorCode};
use quill_ir::visit::{walk_call, Visitor};
use quill_ir::{Block, Callee, Expr, Function, Module, Span, TryStmt, TypeId};

use crate::LowerFlags;

/// Returns `true` if a block can exit with an error (by a throw or a call
/// to a throwing function that no `try!` or catch-all handles).
///
/// Used to infer the throwing attribute for compiler-synthesized
/// functions; never emits diagnostics.
pub fn can_block_throw(block: &Block, module: &Module, flags: &LowerFlags) -> bool {
    let mut visitor = ThrowAnalysis::inference(module, flags);
    visitor.visit_block(block);
    visitor.throws()
}

/// Validate a function's error handling against its declared throwing
/// attribute, reporting problems into `queue`.
pub fn check_error_handling(
    func: &Function,
    module: &Module,
    flags: &LowerFlags,
    queue: &mut DiagnosticQueue,
) {
    let mut visitor = ThrowAnalysis::diagnostic(module, flags, func.throws_error(), queue);
    visitor.visit_block(&func.body);
}

struct ThrowAnalysis<'a> {
    module: &'a Module,
    flags: &'a LowerFlags,
    /// `None` in inference mode: no diagnostics, strict mode ignored.
    queue: Option<&'a mut DiagnosticQueue>,
    try_depth: u32,
    can_throw: bool,
    /// The enclosing function's declared attribute; only consulted for
    /// diagnostics, never mutated.
    fn_can_throw: bool,
}

impl<'a> ThrowAnalysis<'a> {
    fn inference(module: &'a Module, flags: &'a LowerFlags) -> Self {
        ThrowAnalysis {
            module,
            flags,
            queue: None,
            try_depth: 0,
            can_throw: false,
            fn_can_throw: false,
        }
    }

    fn diagnostic(
        module: &'a Module,
        flags: &'a LowerFlags,
        fn_can_throw: bool,
        queue: &'a mut DiagnosticQueue,
    ) -> Self {
        ThrowAnalysis {
            module,
            flags,
            queue: Some(queue),
            try_depth: 0,
            can_throw: false,
            fn_can_throw,
        }
    }

    fn throws(&self) -> bool {
        self.can_throw
    }

    fn diagnostics_enabled(&self) -> bool {
        self.queue.is_some()
    }

    fn report(&mut self, code: ErrorCode, message: &str, span: Span) {
        if let Some(queue) = self.queue.as_mut() {
            queue.add(Diagnostic::error(code, message).with_span(span));
        }
    }

    /// Check a try's catch list for a catch-all, reporting misplaced
    /// catch-alls in diagnostic mode. Returns `true` when the list is
    /// *not* exhaustive.
    fn catches_not_exhaustive(&mut self, node: &TryStmt) -> bool {
        let mut catch_all: Option<Span> = None;
        let mut reported = false;

        for clause in &node.catches {
            if let Some(span) = catch_all {
                if self.diagnostics_enabled() && !reported {
                    self.report(
                        ErrorCode::E4002,
                        "catchall placed before the end of a catch list",
                        span,
                    );
                    reported = true;
                }
            }

            match clause.binding {
                // untyped catchall
                None => catch_all = catch_all.or(Some(clause.span)),
                Some(bind) => {
                    // binding typed exactly as Error is a catchall by
                    // convention
                    if self.module.symbols.var(bind).ty == TypeId::ERROR {
                        catch_all = catch_all.or(Some(clause.span));
                    }
                }
            }
        }

        catch_all.is_none()
    }
}

impl Visitor for ThrowAnalysis<'_> {
    fn enter_try(&mut self, _node: &TryStmt) -> bool {
        self.try_depth += 1;
        true
    }

    fn exit_try(&mut self, node: &TryStmt) {
        self.try_depth -= 1;

        let non_exhaustive = self.catches_not_exhaustive(node);

        if node.bang {
            // try! halts on error instead of letting it escape
            self.can_throw = false;
        } else {
            self.can_throw = non_exhaustive;
            if self.diagnostics_enabled()
                && self.try_depth == 0
                && non_exhaustive
                && !self.fn_can_throw
            {
                self.report(
                    ErrorCode::E4001,
                    "try without a catchall in a non-throwing function",
                    node.span,
                );
            }
        }
    }

    fn visit_call(&mut self, callee: &Callee, args: &[Expr], span: Span) {
        if let Callee::Resolved(id) = callee {
            if self.module.function(*id).throws_error() {
                if self.try_depth > 0 {
                    // accounted for by the enclosing try's exhaustiveness
                } else {
                    if self.diagnostics_enabled() && self.flags.strict_error_handling {
                        self.report(
                            ErrorCode::E4003,
                            "throwing call without try or try! (strict mode)",
                            span,
                        );
                    }
                    self.can_throw = true;
                }
            }
        }
        walk_call(self, args);
    }

    fn visit_throw(&mut self, value: &Expr, span: Span) {
        self.can_throw = true;

        if self.try_depth > 0 {
            // error checking for this case is done in try handling
        } else if self.fn_can_throw {
            // ok, the function propagates
        } else if self.diagnostics_enabled() {
            self.report(ErrorCode::E4004, "cannot throw in a non-throwing function", span);
        }
        self.visit_expr(value);
    }
}
