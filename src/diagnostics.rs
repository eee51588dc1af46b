//! The logger sink shared by both pass contexts.
//!
//! Every [Diagnostic] is recorded (so a UI or CLI can batch-report it) and emitted as a [tracing]
//! event at the matching level.

use std::fmt;

use serde::Serialize;

use crate::validate::Validation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A conversion succeeded, but a round-trip through it won't be exact.
    LossyConversion,
    /// A record violated (or strained) a structural or numeric constraint.
    Validation,
    /// A record, collider, or extension block was dropped; the pass continued without it.
    Skipped,
    /// An extension block had no registered handler.
    Unhandled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            extension: None,
            node: None,
            message: message.into(),
        }
    }

    pub fn lossy(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, DiagnosticKind::LossyConversion, message)
    }

    pub fn skipped(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, DiagnosticKind::Skipped, message)
    }

    #[must_use]
    pub fn extension(mut self, name: impl Into<String>) -> Self {
        self.extension = Some(name.into());
        self
    }

    #[must_use]
    pub fn node(mut self, node: impl Into<Option<usize>>) -> Self {
        self.node = node.into();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.severity)?;
        if let Some(ext) = &self.extension {
            write!(f, " [{ext}]")?;
        }
        if let Some(node) = self.node {
            write!(f, " (node {node})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Collected diagnostics for a single pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(&mut self, diag: Diagnostic) {
        let Diagnostic {
            severity,
            kind,
            extension,
            node,
            message,
        } = &diag;
        match severity {
            Severity::Info => tracing::info!(?kind, ?extension, ?node, "{message}"),
            Severity::Warning => tracing::warn!(?kind, ?extension, ?node, "{message}"),
            Severity::Error => tracing::error!(?kind, ?extension, ?node, "{message}"),
        }
        self.entries.push(diag);
    }

    /// Record the warnings of a validation result. Errors are left to the caller, which decides
    /// whether they're fatal to the record.
    pub fn push_warnings(&mut self, extension: &str, node: Option<usize>, validation: &Validation) {
        for w in validation.warnings() {
            self.push(
                Diagnostic::new(Severity::Warning, DiagnosticKind::Validation, w.clone())
                    .extension(extension)
                    .node(node),
            );
        }
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|d| d.severity == severity).count()
    }

    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl<'d> IntoIterator for &'d Diagnostics {
    type Item = &'d Diagnostic;
    type IntoIter = std::slice::Iter<'d, Diagnostic>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
