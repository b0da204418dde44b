//! Type-level proof that an error was emitted.

use std::fmt;

/// Proof that at least one error diagnostic was emitted.
///
/// Constructible only through the [`DiagnosticQueue`](crate::DiagnosticQueue),
/// so a function returning `Result<_, ErrorGuaranteed>` cannot fail
/// silently without reporting anything to the user.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ErrorGuaranteed(());

impl ErrorGuaranteed {
    pub(crate) fn new() -> Self {
        ErrorGuaranteed(())
    }

    /// Obtain a guarantee from a known error count.
    ///
    /// Returns `None` when no errors were recorded.
    pub fn from_error_count(count: usize) -> Option<Self> {
        if count > 0 {
            Some(ErrorGuaranteed(()))
        } else {
            None
        }
    }
}

impl fmt::Display for ErrorGuaranteed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error(s) emitted")
    }
}
