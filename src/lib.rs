//! # bbextract
//!
//! Extract the student-facing Blackboard Ultra block from course-module
//! overview documents and convert it to DOCX.
//!
//! A course repository keeps one directory per module under `lms/`:
//!
//! ```text
//! <project root>/lms/
//!  ├─ lm-01-intro/
//!  │   ├─ lm-01-overview.md         ← source (read-only)
//!  │   ├─ lm-01-overview-bb.md      ← extracted block (for review)
//!  │   └─ lm-01-overview-bb.docx    ← converted document
//!  ├─ lm-07-probability/
//!  └─ templates/                    ← ignored: not lm-NN-<slug>
//! ```
//!
//! ## Pipeline Overview
//!
//! ```text
//! lms/
//!  │
//!  ├─ 1. Discover  lm-NN-<slug> directories → ModuleRegistry
//!  ├─ 2. Select    all / --current / explicit list (+ confirmation)
//!  ├─ 3. Extract   marker pair, else legacy heading
//!  ├─ 4. Write     lm-NN-overview-bb.md
//!  ├─ 5. Convert   pandoc → lm-NN-overview-bb.docx
//!  └─ 6. Summary   successes / attempted
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bbextract::{run_modules, ExtractConfig, ModuleProcessor, ModuleRegistry, PandocConverter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ExtractConfig::for_project(std::env::current_dir()?)?.build()?;
//!     let registry = ModuleRegistry::discover(&config.lms_dir);
//!     let converter = PandocConverter::from_config(&config);
//!     let processor = ModuleProcessor::new(&registry, &converter, &config);
//!
//!     let summary = run_modules(&processor, &registry.numbers())?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `bbextract` binary (clap + anyhow + indicatif + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod progress;
pub mod registry;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{find_project_root, ExtractConfig, ExtractConfigBuilder};
pub use error::{BbExtractError, ModuleError};
pub use output::{ModuleResult, RunSummary};
pub use pipeline::docx::{DocumentConverter, PandocConverter};
pub use pipeline::extract::{extract_content, extract_from_file};
pub use process::ModuleProcessor;
pub use progress::{NoopProgressCallback, ProgressCallback, RunProgressCallback};
pub use registry::{ModuleNumber, ModuleRegistry};
pub use run::{confirm_modules, detect_current_module, run_modules, Selection};
