//! Diagnostics emitted while building a site. The builder reports through a
//! [`Reporter`] rather than printing, so the binary can forward diagnostics
//! to the `log` facade while tests collect them with [`MemoryReporter`].

use std::fmt;
use std::path::{Path, PathBuf};

/// How a [`Diagnostic`] relates to the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    /// Normal progress (an input was picked up, a file was written).
    Progress,

    /// An input was skipped. The run carries on without it.
    Skipped,
}

/// A single human-readable diagnostic about a path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub path: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub fn progress<P: AsRef<Path>, M: Into<String>>(path: P, message: M) -> Diagnostic {
        Diagnostic {
            severity: Severity::Progress,
            path: path.as_ref().to_owned(),
            message: message.into(),
        }
    }

    pub fn skipped<P: AsRef<Path>, M: Into<String>>(path: P, message: M) -> Diagnostic {
        Diagnostic {
            severity: Severity::Skipped,
            path: path.as_ref().to_owned(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

/// Receives diagnostics from [`crate::build::build_site`].
pub trait Reporter {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to the `log` facade: progress at `info`, skipped
/// inputs at `warn`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Progress => log::info!("{}", diagnostic),
            Severity::Skipped => log::warn!("{}", diagnostic),
        }
    }
}

/// Keeps every diagnostic in memory, in the order they were reported.
#[derive(Clone, Debug, Default)]
pub struct MemoryReporter {
    pub diagnostics: Vec<Diagnostic>,
}

impl MemoryReporter {
    pub fn new() -> MemoryReporter {
        MemoryReporter::default()
    }

    /// Returns the diagnostics for skipped inputs.
    pub fn skipped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Skipped)
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
