//! Per-module processing: read → extract → write `-bb.md` → convert → report.
//!
//! Every step is an early-exit point. Expected misses (unknown module, no
//! overview, nothing marked, converter failure) become a [`ModuleError`] in
//! the returned [`ModuleResult`] so the batch keeps going. Only unexpected
//! I/O on files that do exist is fatal.
//!
//! Side effects stay inside the module's own directory: the intermediate
//! markdown and the converted document, both siblings of the overview and
//! both overwritten on every run.

use crate::config::ExtractConfig;
use crate::error::{BbExtractError, ModuleError};
use crate::output::ModuleResult;
use crate::pipeline::docx::DocumentConverter;
use crate::pipeline::extract;
use crate::registry::{ModuleNumber, ModuleRegistry};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Drives one module at a time through the pipeline.
pub struct ModuleProcessor<'a> {
    registry: &'a ModuleRegistry,
    converter: &'a dyn DocumentConverter,
    config: &'a ExtractConfig,
}

impl<'a> ModuleProcessor<'a> {
    pub fn new(
        registry: &'a ModuleRegistry,
        converter: &'a dyn DocumentConverter,
        config: &'a ExtractConfig,
    ) -> Self {
        Self {
            registry,
            converter,
            config,
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        self.config
    }

    /// Process a single module.
    ///
    /// # Returns
    /// `Ok(ModuleResult)` whether or not the module succeeded; check
    /// [`ModuleResult::succeeded`].
    ///
    /// # Errors
    /// Returns `Err(BbExtractError)` only when the overview exists but cannot
    /// be read, or an output file cannot be written.
    pub fn process(&self, number: ModuleNumber) -> Result<ModuleResult, BbExtractError> {
        let result = self.process_inner(number)?;
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_module_complete(&result);
        }
        Ok(result)
    }

    fn process_inner(&self, number: ModuleNumber) -> Result<ModuleResult, BbExtractError> {
        // ── Step 1: Look up the module ───────────────────────────────────
        let (Some(dir_name), Some(overview)) =
            (self.registry.get(number), self.registry.overview_path(number))
        else {
            info!("Module {} not found", number);
            return Ok(ModuleResult::failed(
                number,
                None,
                ModuleError::NotRegistered { number },
            ));
        };
        let dir_name = dir_name.to_string();

        // ── Step 2: Overview must exist ──────────────────────────────────
        if !overview.exists() {
            info!("{} not found", overview.display());
            return Ok(ModuleResult::failed(
                number,
                Some(dir_name),
                ModuleError::OverviewMissing { path: overview },
            ));
        }

        info!("Processing Module {:02}: {}", number, dir_name);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_module_start(number, &dir_name);
        }

        // ── Step 3: Extract ──────────────────────────────────────────────
        let content = match extract::extract_from_file(&overview)? {
            Some(content) if !content.is_empty() => content,
            _ => {
                let file_name = file_name_of(&overview);
                info!("No Blackboard content found in {}", file_name);
                return Ok(ModuleResult::failed(
                    number,
                    Some(dir_name),
                    ModuleError::NoMarkedContent { file_name },
                ));
            }
        };

        // ── Step 4: Persist intermediate markdown ────────────────────────
        let markdown_path = self.output_path(&overview, "md");
        write_atomic(&markdown_path, &content)?;
        info!("Created {}", markdown_path.display());
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_file_written(number, &markdown_path);
        }

        // ── Step 5: Convert ──────────────────────────────────────────────
        let docx_path = self.output_path(&overview, "docx");
        let mut result = ModuleResult {
            number,
            dir_name: Some(dir_name),
            markdown_path: Some(markdown_path),
            docx_path: None,
            error: None,
        };

        match self.converter.convert(&content, &docx_path) {
            Ok(()) => {
                info!("Created {}", docx_path.display());
                if let Some(ref cb) = self.config.progress_callback {
                    cb.on_file_written(number, &docx_path);
                }
                result.docx_path = Some(docx_path);
            }
            Err(e) => {
                info!("Error converting module {:02} to DOCX: {}", number, e);
                result.error = Some(ModuleError::ConversionFailed {
                    detail: e.to_string(),
                });
            }
        }

        Ok(result)
    }

    /// `lm-07-overview.md` → `lm-07-overview-bb.<ext>` in the same directory.
    fn output_path(&self, overview: &Path, ext: &str) -> PathBuf {
        let stem = overview
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        overview.with_file_name(format!("{stem}{}.{ext}", self.config.output_suffix))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Write via a temp file in the target directory, then rename over `path`.
fn write_atomic(path: &Path, content: &str) -> Result<(), BbExtractError> {
    let write_failed = |source: std::io::Error| BbExtractError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_failed)?;
    tmp.write_all(content.as_bytes()).map_err(write_failed)?;
    tmp.persist(path).map_err(|e| write_failed(e.error))?;
    Ok(())
}
