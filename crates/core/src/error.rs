use serde::{Deserialize, Serialize};
use std::fmt;

/// How serious a finding is. Only `Error` blocks later phases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Category of a finding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Phase 1: missing, extra, or mistyped JSON fields.
    Structural,
    /// Phase 2: dangling key-letter/label references and duplicate identifiers.
    Reference,
    /// Phase 2/3: malformed or inconsistent state machines.
    StateModel,
    /// Phase 3: malformed OAL statements.
    OalSyntax,
}

/// One line of a code preview attached to a diagnostic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContextLine {
    pub line_number: u32,
    pub content: String,
    pub is_error: bool,
}

/// Code preview around the line a diagnostic points at.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceContext {
    pub line: u32,
    pub lines: Vec<ContextLine>,
}

/// A validation finding. Serializes to the shape consumed by the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub phase: u8,
    pub kind: DiagnosticKind,
    pub message: String,
    pub path: String,
    pub suggestion: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<SourceContext>,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        phase: u8,
        kind: DiagnosticKind,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Diagnostic {
            severity,
            phase,
            kind,
            message: message.into(),
            path: path.into(),
            suggestion: suggestion.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, context: SourceContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[phase {}] {}: {} ({})",
            self.phase, self.severity, self.message, self.path
        )
    }
}

/// Per-call collector. A fresh one is created for every validation run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn error(
        &mut self,
        phase: u8,
        kind: DiagnosticKind,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.push(Diagnostic::new(
            Severity::Error,
            phase,
            kind,
            path,
            message,
            suggestion,
        ));
    }

    pub fn warning(
        &mut self,
        phase: u8,
        kind: DiagnosticKind,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.push(Diagnostic::new(
            Severity::Warning,
            phase,
            kind,
            path,
            message,
            suggestion,
        ));
    }

    /// True if any error-severity diagnostic was recorded, optionally
    /// restricted to one phase.
    pub fn has_errors(&self, phase: Option<u8>) -> bool {
        self.items
            .iter()
            .any(|d| d.is_error() && phase.map_or(true, |p| d.phase == p))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Diagnostic] {
        &self.items
    }

    pub fn extend(&mut self, other: impl IntoIterator<Item = Diagnostic>) {
        self.items.extend(other);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

/// The schema-checked document could not be read into the typed model.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("document has no 'system_model' object")]
    MissingSystemModel,
    #[error("model does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
}
