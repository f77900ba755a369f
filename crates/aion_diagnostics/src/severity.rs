//! Diagnostic severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a diagnostic is.
///
/// `Sorry` and `Error` both count toward the design's error total and fail
/// the compilation; `Warning` never does.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum Severity {
    /// Advisory; the result may differ from the user's intent.
    Warning,
    /// A recognized construct that is not supported.
    Sorry,
    /// The source is invalid.
    Error,
}

impl Severity {
    /// Returns `true` if this severity counts as a compilation failure.
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Sorry | Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Sorry => write!(f, "sorry"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering() {
        assert!(Severity::Warning < Severity::Sorry);
        assert!(Severity::Sorry < Severity::Error);
    }

    #[test]
    fn counted_severities() {
        assert!(Severity::Error.is_error());
        assert!(Severity::Sorry.is_error());
        assert!(!Severity::Warning.is_error());
    }

    #[test]
    fn display() {
        assert_eq!(Severity::Sorry.to_string(), "sorry");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
