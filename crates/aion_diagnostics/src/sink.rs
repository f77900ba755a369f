//! The diagnostics collector threaded through every elaboration phase.

use crate::diagnostic::Diagnostic;
use std::cell::{Cell, RefCell};

/// Accumulates diagnostics and counts failures.
///
/// Elaboration is single-threaded, so the sink uses interior mutability
/// instead of locking; every phase borrows it immutably.
#[derive(Default)]
pub struct DiagnosticSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
    error_count: Cell<usize>,
}

impl DiagnosticSink {
    /// Creates a new empty diagnostic sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic, counting it if its severity is an error or sorry.
    pub fn emit(&self, diag: Diagnostic) {
        if diag.severity.is_error() {
            self.error_count.set(self.error_count.get() + 1);
        }
        self.diagnostics.borrow_mut().push(diag);
    }

    /// Returns `true` if any counted diagnostic has been emitted.
    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    /// Returns the number of counted diagnostics emitted so far.
    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    /// Takes all accumulated diagnostics, leaving the sink empty.
    ///
    /// The error count is not reset.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.borrow_mut())
    }

    /// Returns a snapshot of all accumulated diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use aion_common::Loc;

    const CODE: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);

    #[test]
    fn empty_sink() {
        let sink = DiagnosticSink::new();
        assert!(!sink.has_errors());
        assert!(sink.take_all().is_empty());
    }

    #[test]
    fn errors_and_sorries_count() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error(CODE, "bad", Loc::DUMMY));
        sink.emit(Diagnostic::sorry(CODE, "unsupported", Loc::DUMMY));
        assert_eq!(sink.error_count(), 2);
    }

    #[test]
    fn warnings_do_not_count() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::warning(CODE, "odd", Loc::DUMMY));
        assert!(!sink.has_errors());
        assert_eq!(sink.diagnostics().len(), 1);
    }

    #[test]
    fn take_all_keeps_count() {
        let sink = DiagnosticSink::new();
        sink.emit(Diagnostic::error(CODE, "bad", Loc::DUMMY));
        assert_eq!(sink.take_all().len(), 1);
        assert!(sink.diagnostics().is_empty());
        assert_eq!(sink.error_count(), 1);
    }
}
