use std::fmt;

/// Error codes for middle-end diagnostics.
///
/// Format: E#### where the first digit indicates the phase:
/// - E4xxx: error-handling lowering
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Error-handling lowering (E4xxx)
    /// Try without a catch-all in a non-throwing function
    E4001,
    /// Catch-all placed before the end of a catch list
    E4002,
    /// Throwing call without try or try! (strict mode)
    E4003,
    /// Throw in a non-throwing function
    E4004,
}

impl ErrorCode {
    /// Short description used in error index documentation.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::E4001 => "try without a catchall in a non-throwing function",
            ErrorCode::E4002 => "catchall placed before the end of a catch list",
            ErrorCode::E4003 => "throwing call without try or try!",
            ErrorCode::E4004 => "throw in a non-throwing function",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
