//! Diagnostic queue for collecting and gating diagnostics.
//!
//! Passes accumulate diagnostics here without stopping traversal
//! (maximal-diagnostics philosophy: keep visiting to report as many
//! problems as possible in one run). The driver checks the queue once,
//! between validation and mutation, as a global go/no-go gate.

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed};

/// Queue for collecting diagnostics across a pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    /// Last (span start, code) pair, for duplicate suppression.
    last_error: Option<(u32, ErrorCode)>,
}

impl DiagnosticQueue {
    pub fn new() -> Self {
        DiagnosticQueue::default()
    }

    /// Add a diagnostic.
    ///
    /// Returns `true` if it was recorded, `false` if it was suppressed as
    /// a duplicate (same code at the same position as the previous error).
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if is_error {
            let key = (diag.primary_span().map_or(0, |s| s.start), diag.code);
            if self.last_error == Some(key) {
                return false;
            }
            self.last_error = Some(key);
            self.error_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Emit an error diagnostic and get proof it was emitted.
    pub fn emit_error(&mut self, diag: Diagnostic) -> ErrorGuaranteed {
        debug_assert!(diag.is_error());
        self.add(diag);
        ErrorGuaranteed::new()
    }

    /// Number of error-severity diagnostics recorded.
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// Returns proof of failure if any error was recorded.
    pub fn has_errors(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    /// Whether the queue holds no diagnostics at all.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Drain all diagnostics, sorted by primary span position.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut out = std::mem::take(&mut self.diagnostics);
        self.error_count = 0;
        self.last_error = None;
        out.sort_by_key(|d| d.primary_span().map_or(0, |s| s.start));
        out
    }

    /// Peek at the collected diagnostics without draining.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
