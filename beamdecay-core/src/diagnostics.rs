//! Diagnostics and error reporting for beam runs
//!
//! Configuration analysis and sampling both produce diagnostics: errors
//! abort a run before it starts, warnings travel with the result.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A single finding, optionally tied to a configuration field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, field: Option<&str>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn warning(message: impl Into<String>, field: Option<&str>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            message: message.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
        };
        match &self.field {
            Some(field) => write!(f, "{} [{}]: {}", label, field, self.message),
            None => write!(f, "{}: {}", label, self.message),
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Keep only the warnings, dropping any errors
    pub fn into_warnings(self) -> Diagnostics {
        Diagnostics {
            items: self.items.into_iter().filter(|d| !d.is_error()).collect(),
        }
    }
}

/// Join every error message into one line, for `InvalidConfiguration`
pub fn format_errors(diagnostics: &Diagnostics) -> String {
    diagnostics
        .errors()
        .map(|d| match &d.field {
            Some(field) => format!("{}: {}", field, d.message),
            None => d.message.clone(),
        })
        .collect::<Vec<_>>()
        .join("; ")
}
