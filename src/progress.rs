//! Progress-callback trait for per-module run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::ExtractConfigBuilder::progress_callback`] to receive
//! events as the run walks the selected modules. The library itself only
//! logs through `tracing`; everything a human should see on the terminal
//! (created files, warnings, the final tally) flows through this trait so the
//! binary decides how to render it.
//!
//! # Example
//!
//! ```rust
//! use bbextract::{ExtractConfig, ModuleResult, RunProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     failed: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_module_complete(&self, result: &ModuleResult) {
//!         if !result.succeeded() {
//!             self.failed.fetch_add(1, Ordering::SeqCst);
//!         }
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { failed: AtomicUsize::new(0) });
//!
//! let config = ExtractConfig::builder()
//!     .lms_dir("/srv/course/lms")
//!     .progress_callback(counter as Arc<dyn RunProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{ModuleResult, RunSummary};
use crate::registry::ModuleNumber;
use std::path::Path;
use std::sync::Arc;

/// Called by the run controller and module processor as work progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Modules are processed sequentially, so events for
/// one module never interleave with another's.
pub trait RunProgressCallback: Send + Sync {
    /// Called once before the first module is processed.
    ///
    /// # Arguments
    /// * `total_modules`: number of modules that will be attempted
    fn on_run_start(&self, total_modules: usize) {
        let _ = total_modules;
    }

    /// Called when a registered module begins processing.
    ///
    /// Not called for module numbers missing from the registry; those go
    /// straight to [`RunProgressCallback::on_module_complete`].
    fn on_module_start(&self, number: ModuleNumber, dir_name: &str) {
        let _ = (number, dir_name);
    }

    /// Called after each output file (`-bb.md`, `-bb.docx`) is written.
    fn on_file_written(&self, number: ModuleNumber, path: &Path) {
        let _ = (number, path);
    }

    /// Called once per attempted module, successful or not.
    fn on_module_complete(&self, result: &ModuleResult) {
        let _ = result;
    }

    /// Called once after all selected modules have been attempted.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// A no-op implementation for callers that need a callback value but no
/// events. Leaving [`crate::config::ExtractConfig::progress_callback`] as
/// `None` has the same effect.
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ExtractConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;
