//! Error-handling lowering for the Quill compiler.
//!
//! Runs after resolution and type checking. Takes a module whose
//! functions still contain structured `try`/`catch`/`throw` and rewrites
//! them to the explicit error flow the back end understands:
//!
//! - every throwing function gains a trailing by-ref `error_out` formal
//!   and a single `epilogue` exit label;
//! - every call to a throwing function passes an error temporary and
//!   checks it immediately after the containing statement;
//! - every try becomes its body block with a handler label at the tail
//!   and a dispatch chain of checked downcasts over the catch clauses;
//! - every throw becomes a move into the innermost try's error slot (or
//!   a store to `error_out`) followed by a goto.
//!
//! Validation runs first over the whole module; if any function is
//! structurally ill-formed ([`ErrorCode::E4001`] through
//! [`ErrorCode::E4004`]) the pass stops before rewriting anything, so a
//! failed run leaves the module untouched.
//!
//! [`ErrorCode::E4001`]: quill_diagnostic::ErrorCode
//! [`ErrorCode::E4004`]: quill_diagnostic::ErrorCode

use quill_diagnostic::{DiagnosticQueue, ErrorGuaranteed};
use quill_ir::{Intent, Module, Stmt, StmtKind, StringInterner, TypeId};

use crate::lower::Lowerer;

mod lower;
mod throws;

#[cfg(test)]
pub(crate) mod fixtures;

pub use throws::{can_block_throw, check_error_handling};

/// Compilation settings the pass consults.
#[derive(Copy, Clone, Debug, Default)]
pub struct LowerFlags {
    /// Strict mode: calls to throwing functions must be covered by a
    /// `try` or `try!` even inside throwing functions.
    pub strict_error_handling: bool,
    /// Minimal-modules build: the standard module defining the `Error`
    /// class is not compiled in, so its absence is not a pass bug.
    pub minimal_modules: bool,
}

/// Run the error-handling pass over a module.
///
/// Phase 1 infers the throwing attribute for task wrappers and validates
/// every other function against its declared attribute. If validation
/// reported errors the pass returns early with the proof token and the
/// module is left unrewritten. Phase 2 installs out-error formals and
/// epilogue labels on throwing functions and lowers every body.
#[tracing::instrument(level = "debug", skip_all)]
pub fn lower_error_handling(
    module: &mut Module,
    interner: &StringInterner,
    flags: &LowerFlags,
    queue: &mut DiagnosticQueue,
) -> Result<(), ErrorGuaranteed> {
    if !flags.minimal_modules {
        assert!(
            module.types.error_in_tree(),
            "Error class missing from the type tree in a full build",
        );
    }

    for i in 0..module.functions.len() {
        if module.functions[i].is_task_wrapper() {
            // Task wrappers have no user-written attribute; infer it.
            if throws::can_block_throw(&module.functions[i].body, module, flags) {
                module.functions[i].set_throws();
            }
        } else {
            throws::check_error_handling(&module.functions[i], module, flags, queue);
        }
    }

    if let Some(guarantee) = queue.has_errors() {
        tracing::debug!(
            errors = queue.error_count(),
            "error-handling validation failed, skipping lowering"
        );
        return Err(guarantee);
    }

    let name_error_out = interner.intern("error_out");
    let name_epilogue = interner.intern("epilogue");

    for i in 0..module.functions.len() {
        let (out_error, epilogue) = if module.functions[i].throws_error() {
            let span = module.functions[i].span;
            let out = module
                .symbols
                .new_formal(name_error_out, TypeId::ERROR, Intent::Ref, span);
            let label = module.symbols.new_label(name_epilogue, span);
            let func = &mut module.functions[i];
            func.params.push(out);
            func.out_error = Some(out);
            func.epilogue = Some(label);
            (Some(out), Some(label))
        } else {
            (None, None)
        };

        let body = std::mem::take(&mut module.functions[i].body);
        let mut lowered = Lowerer::new(
            &module.functions,
            &mut module.symbols,
            &module.types,
            interner,
            flags,
            out_error,
            epilogue,
        )
        .lower_function_body(body);
        if let Some(label) = epilogue {
            // The epilogue is defined at the function's single exit
            // point; every early error return jumps here.
            let span = module.functions[i].span;
            lowered.push(Stmt::new(StmtKind::Label(label), span));
        }
        module.functions[i].body = lowered;
    }

    tracing::debug!(functions = module.functions.len(), "lowered error handling");
    Ok(())
}
