//! Error types for the bbextract library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`BbExtractError`]: **Fatal**: the run cannot proceed at all
//!   (unparseable module number, no module under the working directory,
//!   an overview that exists but cannot be read, an output that cannot be
//!   written). Returned as `Err(BbExtractError)` and aborts the run.
//!
//! * [`ModuleError`]: **Non-fatal**: a single module was skipped or failed
//!   (not registered, no overview file, no marked content, converter error)
//!   but the batch carries on. Stored inside [`crate::output::ModuleResult`]
//!   and counted as a failure in the final summary.

use crate::registry::ModuleNumber;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the bbextract library.
///
/// Per-module failures use [`ModuleError`] and are stored in
/// [`crate::output::ModuleResult`] rather than propagated here.
#[derive(Debug, Error)]
pub enum BbExtractError {
    // ── Selection errors ──────────────────────────────────────────────────
    /// A module argument on the command line is not an integer.
    #[error("Module numbers must be integers (got '{arg}')")]
    InvalidModuleNumber { arg: String },

    /// `--current` was requested but the working directory is not inside a module.
    #[error("Could not detect module from current directory\nCurrent directory: {}", cwd.display())]
    CurrentModuleNotDetected { cwd: PathBuf },

    // ── Configuration errors ──────────────────────────────────────────────
    /// No ancestor of the start directory contains a `.git` entry.
    #[error("No project root (a directory containing .git) above '{}'\nPass --lms-dir to point at the modules directory.", start.display())]
    ProjectRootNotFound { start: PathBuf },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Converter errors ──────────────────────────────────────────────────
    /// The converter executable could not be started.
    #[error("Converter '{}' is not available: {detail}\nInstall pandoc (brew/dnf/apt) or pass --pandoc <PATH>.", program.display())]
    ConverterUnavailable { program: PathBuf, detail: String },

    /// The converter ran but did not produce the document.
    #[error("Conversion to '{}' failed: {detail}", path.display())]
    ConversionFailed { path: PathBuf, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// An overview file exists but could not be read as UTF-8 text.
    #[error("Failed to read '{}': {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write output file '{}': {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A non-fatal error for a single module.
///
/// Stored alongside [`crate::output::ModuleResult`] when a module fails.
/// The run continues with the next selected module.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModuleError {
    /// The module number has no directory in the registry.
    #[error("Module {number} not found")]
    NotRegistered { number: ModuleNumber },

    /// The module directory has no `lm-NN-overview.md`.
    #[error("{} not found", path.display())]
    OverviewMissing { path: PathBuf },

    /// Neither marker format matched, or the marked span was empty.
    #[error("No Blackboard content found in {file_name}")]
    NoMarkedContent { file_name: String },

    /// The converter reported an error; the intermediate markdown was still written.
    #[error("Error converting to DOCX: {detail}")]
    ConversionFailed { detail: String },
}

impl ModuleError {
    /// Soft misses (nothing to extract) are warnings; everything else is an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, ModuleError::NoMarkedContent { .. })
    }
}
