//! Diagnostic collection for the elaboration phases.
//!
//! Every user-facing problem found while elaborating a design becomes a
//! [`Diagnostic`] carrying a source line, a [`Severity`] and a free-text
//! message. The [`DiagnosticSink`] is threaded by reference through every
//! phase; the driver checks [`DiagnosticSink::has_errors`] at phase
//! boundaries to decide whether to continue.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{render, DiagnosticRenderer, TextRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
