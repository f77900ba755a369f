//! Result and internal-error types shared by the elaboration phases.

use crate::ident::Interner;
use crate::loc::Loc;

/// Result of an operation that can only fail through an internal invariant violation.
///
/// User-facing problems (bad source, unsupported constructs, warnings) are
/// reported through a diagnostic sink and the operation still returns `Ok`,
/// so that later phases can surface as many diagnostics as possible.
pub type AionResult<T> = Result<T, InternalError>;

/// An elaboration phase-ordering invariant was violated.
///
/// Raised when a value that an earlier phase proved constant fails to fold
/// in a later phase. This is never caused by malformed input alone.
#[derive(Debug, thiserror::Error)]
#[error("internal compiler error: {message}")]
pub struct InternalError {
    /// Description of the violated invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Creates an internal error prefixed with a source location.
    pub fn at(loc: Loc, interner: &Interner, message: impl AsRef<str>) -> Self {
        Self::new(format!("{}: {}", loc.display(interner), message.as_ref()))
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("genvar test did not fold");
        assert_eq!(
            format!("{err}"),
            "internal compiler error: genvar test did not fold"
        );
    }

    #[test]
    fn located_message() {
        let interner = Interner::new();
        let file = interner.get_or_intern("gen.v");
        let err = InternalError::at(Loc::new(file, 7), &interner, "msb did not fold");
        assert_eq!(err.message, "gen.v:7: msb did not fold");
    }

    #[test]
    fn err_path() {
        let r: AionResult<i32> = Err(InternalError::new("test error"));
        let err = r.err().unwrap();
        assert_eq!(err.message, "test error");
    }

    #[test]
    fn from_string() {
        let err: InternalError = "from string".to_string().into();
        assert_eq!(err.message, "from string");
    }
}
