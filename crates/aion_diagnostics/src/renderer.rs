//! Plain-text rendering of diagnostics.

use crate::diagnostic::Diagnostic;
use aion_common::Interner;

/// Formats diagnostics for output.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, interner: &Interner) -> String;
}

/// Renders one line per diagnostic in the classic compiler style:
///
/// ```text
/// top.v:12: error[E304]: You cannot instantiate module m within itself.
/// top.v:12:      : The offending instance is top.u0 within top.
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer {
    /// Whether to print the diagnostic code after the severity.
    pub show_codes: bool,
}

impl TextRenderer {
    /// Creates a renderer.
    pub fn new(show_codes: bool) -> Self {
        Self { show_codes }
    }
}

impl DiagnosticRenderer for TextRenderer {
    fn render(&self, diag: &Diagnostic, interner: &Interner) -> String {
        let loc = diag.loc.display(interner);
        let mut out = if self.show_codes {
            format!("{loc}: {}[{}]: {}", diag.severity, diag.code, diag.message)
        } else {
            format!("{loc}: {}: {}", diag.severity, diag.message)
        };
        for note in &diag.notes {
            out.push_str(&format!("\n{loc}:      : {note}"));
        }
        out
    }
}

/// Renders a diagnostic with the default [`TextRenderer`].
pub fn render(diag: &Diagnostic, interner: &Interner) -> String {
    TextRenderer::default().render(diag, interner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::{Category, DiagnosticCode};
    use aion_common::Loc;

    #[test]
    fn render_with_note() {
        let interner = Interner::new();
        let loc = Loc::new(interner.get_or_intern("top.v"), 12);
        let diag = Diagnostic::error(
            DiagnosticCode::new(Category::Error, 304),
            "You cannot instantiate module m within itself.",
            loc,
        )
        .with_note("The offending instance is top.u0 within top.");
        let text = render(&diag, &interner);
        assert_eq!(
            text,
            "top.v:12: error: You cannot instantiate module m within itself.\n\
             top.v:12:      : The offending instance is top.u0 within top."
        );
    }

    #[test]
    fn render_with_code() {
        let interner = Interner::new();
        let diag = Diagnostic::warning(
            DiagnosticCode::new(Category::Warning, 300),
            "parameter P not found in top.",
            Loc::DUMMY,
        );
        let text = TextRenderer::new(true).render(&diag, &interner);
        assert_eq!(text, "<internal>: warning[W300]: parameter P not found in top.");
    }
}
