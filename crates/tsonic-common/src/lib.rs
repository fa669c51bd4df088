//! Common types and utilities for the tsonic transpiler.
//!
//! This crate provides foundational types used across all tsonic crates:
//! - Structured diagnostics with stable codes (`Diagnostic`, `DiagnosticCode`)
//! - Source locations for diagnostic attribution (`SourceLocation`)
//! - Numeric-lexeme classification for the deterministic expression typer
//!   (`NumericKind`)

// Structured diagnostics with stable codes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticCode, SourceLocation};

// Numeric literal classification and widening
pub mod numeric;
pub use numeric::NumericKind;
