//! Core diagnostic types for structured error reporting.
//!
//! Defines [`Diagnostic`], [`Label`], and [`Severity`] — the building
//! blocks all compiler phases use to report errors and warnings.

use std::fmt;

use quill_ir::Span;

use crate::ErrorCode;

/// Severity level for diagnostics.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
            Severity::Help => write!(f, "help"),
        }
    }
}

/// A secondary annotation attached to a diagnostic.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Label {
            span,
            message: message.into(),
        }
    }
}

/// A structured diagnostic: severity, code, message, primary span, and
/// any secondary labels.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: ErrorCode,
    pub message: String,
    pub span: Option<Span>,
    pub labels: Vec<Label>,
}

impl Diagnostic {
    /// Create an error-severity diagnostic.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Error,
            code,
            message: message.into(),
            span: None,
            labels: Vec::new(),
        }
    }

    /// Create a warning-severity diagnostic.
    pub fn warning(code: ErrorCode, message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            code,
            message: message.into(),
            span: None,
            labels: Vec::new(),
        }
    }

    /// Attach the primary span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a secondary label.
    #[must_use]
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::new(span, message));
        self
    }

    /// Whether this diagnostic is an error.
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Primary span, if one was attached.
    pub fn primary_span(&self) -> Option<Span> {
        self.span
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_attaches_span_and_labels() {
        let diag = Diagnostic::error(ErrorCode::E4001, "try without a catchall")
            .with_span(Span::new(10, 20))
            .with_label(Span::new(0, 4), "function declared here");
        assert!(diag.is_error());
        assert_eq!(diag.primary_span(), Some(Span::new(10, 20)));
        assert_eq!(diag.labels.len(), 1);
    }

    #[test]
    fn display_includes_code() {
        let diag = Diagnostic::error(ErrorCode::E4004, "cannot throw here");
        assert_eq!(diag.to_string(), "error[E4004]: cannot throw here");
    }
}
