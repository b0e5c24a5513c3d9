//! Offline consistency checks over the content tree.
//!
//! Both validators sweep the whole corpus and collect every finding into a
//! [`ValidationReport`]; they never stop at the first problem and never write
//! to the store.

mod entry_files;
mod meta_info;

use serde::Serialize;

pub use entry_files::validate_entry_files;
pub use meta_info::validate_meta_info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// A single problem found in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "validation error");
        self.findings.push(Finding {
            severity: Severity::Error,
            message,
        });
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "validation warning");
        self.findings.push(Finding {
            severity: Severity::Warning,
            message,
        });
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// No errors and no warnings.
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.findings
            .iter()
            .filter(|f| f.severity == severity)
            .count()
    }
}
