//! Structured diagnostics for the type authority.
//!
//! Every failing query emits one of these records into the owning
//! `TypeAuthority` instance and returns a poison value. Nothing in the
//! authority throws across the API boundary.

use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Message,
}

/// Stable diagnostic codes.
///
/// The string forms are part of the pipeline contract: downstream tooling
/// matches on them, so they never change spelling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    /// A declaration or function lacks an explicit type and cannot be
    /// inferred deterministically.
    MissingAnnotation,
    /// A name, decl, signature, or member cannot be found. Also covers the
    /// "Binding contract violation" variant for dead handles.
    ResolutionFailed,
    /// Call-site type parameter inference produced contradictory bindings.
    TypeArgConflict,
    /// Call-site type parameter inference left bindings unresolved.
    UnresolvedTypeArgs,
    /// A utility type's shape constraint is violated.
    UtilityConstraint,
    /// A member name is absent on the receiver and its ancestors.
    MemberNotFound,
}

impl DiagnosticCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::MissingAnnotation => "MISSING-ANNOTATION",
            DiagnosticCode::ResolutionFailed => "RESOLUTION-FAILED",
            DiagnosticCode::TypeArgConflict => "TYPE-ARG-CONFLICT",
            DiagnosticCode::UnresolvedTypeArgs => "UNRESOLVED-TYPE-ARGS",
            DiagnosticCode::UtilityConstraint => "UTILITY-CONSTRAINT",
            DiagnosticCode::MemberNotFound => "MEMBER-NOT-FOUND",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved source position, attached to diagnostics when the query site
/// is known.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
    pub length: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32, column: u32, length: u32) -> Self {
        Self {
            file: file.into(),
            line,
            column,
            length,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: DiagnosticCode,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            message: message.into(),
            location: None,
        }
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub fn with_location_opt(mut self, location: Option<&SourceLocation>) -> Self {
        self.location = location.cloned();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.location {
            Some(loc) => write!(
                f,
                "{}({},{}): {}: {}",
                loc.file,
                loc.line,
                loc.column,
                self.code.as_str(),
                self.message
            ),
            None => write!(f, "{}: {}", self.code.as_str(), self.message),
        }
    }
}
