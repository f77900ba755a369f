//! Diagnostic messages with a severity, a code, a source line, and notes.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use aion_common::Loc;
use serde::{Deserialize, Serialize};

/// A single diagnostic message.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code identifying the kind of diagnostic.
    pub code: DiagnosticCode,
    /// The main message.
    pub message: String,
    /// Where the problem was detected.
    pub loc: Loc,
    /// Follow-up lines printed after the message.
    pub notes: Vec<String>,
}

impl Diagnostic {
    fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        loc: Loc,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            loc,
            notes: Vec::new(),
        }
    }

    /// Creates an error diagnostic.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, loc: Loc) -> Self {
        Self::with_severity(Severity::Error, code, message, loc)
    }

    /// Creates a warning diagnostic.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, loc: Loc) -> Self {
        Self::with_severity(Severity::Warning, code, message, loc)
    }

    /// Creates an unsupported-construct ("sorry") diagnostic.
    pub fn sorry(code: DiagnosticCode, message: impl Into<String>, loc: Loc) -> Self {
        Self::with_severity(Severity::Sorry, code, message, loc)
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }
}
