//! Diagnostic system for the Quill compiler.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary span (where it went wrong)
//! - Context labels (why it's wrong)
//!
//! # Error Guarantees
//!
//! The `ErrorGuaranteed` type provides type-level proof that at least one
//! error was emitted. This prevents "forgotten" error conditions where a
//! pass fails without reporting anything:
//!
//! ```text
//! // Can only get ErrorGuaranteed through the queue
//! let guarantee = queue.emit_error(diagnostic);
//!
//! // Passes return ErrorGuaranteed to prove they reported errors
//! fn lower_error_handling(..) -> Result<(), ErrorGuaranteed> { ... }
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use queue::DiagnosticQueue;
