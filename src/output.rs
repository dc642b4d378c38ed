//! Result types for a run: one [`ModuleResult`] per attempted module,
//! aggregated into a [`RunSummary`].
//!
//! Both serialise to JSON so the binary's `--json` mode can emit them as-is.

use crate::error::ModuleError;
use crate::registry::ModuleNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Outcome of processing a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleResult {
    /// Module number as requested.
    pub number: ModuleNumber,

    /// Directory name from the registry; `None` when the number is unknown.
    pub dir_name: Option<String>,

    /// Intermediate markdown written next to the overview, if it got that far.
    pub markdown_path: Option<PathBuf>,

    /// Converted document path; only set when conversion succeeded.
    pub docx_path: Option<PathBuf>,

    /// Why the module failed. `None` means both outputs were produced.
    pub error: Option<ModuleError>,
}

impl ModuleResult {
    /// Result for a module that stopped before writing anything.
    pub fn failed(number: ModuleNumber, dir_name: Option<String>, error: ModuleError) -> Self {
        Self {
            number,
            dir_name,
            markdown_path: None,
            docx_path: None,
            error: Some(error),
        }
    }

    /// `true` when the module was extracted and converted.
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Tally over every module the run attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of modules attempted (duplicates in the selection count twice).
    pub attempted: usize,

    /// Number of modules that fully succeeded.
    pub succeeded: usize,

    /// Per-module results in processing order.
    pub modules: Vec<ModuleResult>,
}

impl RunSummary {
    /// Append a module result and update the counters.
    pub fn record(&mut self, result: ModuleResult) {
        self.attempted += 1;
        if result.succeeded() {
            self.succeeded += 1;
        }
        self.modules.push(result);
    }

    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.succeeded, self.attempted)
    }
}
