//! Converter adapter: markdown text in, `.docx` file out.
//!
//! The orchestration code only sees the narrow [`DocumentConverter`] trait,
//! so tests can substitute a recording fake and never spawn a process.
//! [`PandocConverter`] is the production implementation: it pipes the
//! markdown into `pandoc` on stdin and lets it write the document directly.

use crate::config::ExtractConfig;
use crate::error::BbExtractError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::debug;

/// Turns extracted markdown into a word-processor document at `output`.
pub trait DocumentConverter {
    fn convert(&self, markdown: &str, output: &Path) -> Result<(), BbExtractError>;
}

/// Runs the `pandoc` executable.
#[derive(Debug, Clone)]
pub struct PandocConverter {
    program: PathBuf,
    args: Vec<String>,
}

impl PandocConverter {
    /// Build the converter command line from the run configuration.
    pub fn from_config(config: &ExtractConfig) -> Self {
        let mut args = vec![
            "--from=markdown".to_string(),
            "--to=docx".to_string(),
        ];
        if !config.wrap_lines {
            args.push("--wrap=none".to_string());
        }
        if config.standalone {
            args.push("--standalone".to_string());
        }
        args.extend(config.extra_pandoc_args.iter().cloned());

        Self {
            program: config.pandoc_path.clone(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments passed before `--output <path>`.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run `pandoc --version` and return its first line.
    ///
    /// Used as an up-front availability check before a batch starts.
    pub fn version(&self) -> Result<String, BbExtractError> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .output()
            .map_err(|e| self.unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(self.unavailable(format!("`--version` exited with {}", output.status)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    fn unavailable(&self, detail: String) -> BbExtractError {
        BbExtractError::ConverterUnavailable {
            program: self.program.clone(),
            detail,
        }
    }
}

impl DocumentConverter for PandocConverter {
    fn convert(&self, markdown: &str, output: &Path) -> Result<(), BbExtractError> {
        debug!(
            "Running {} {} --output {}",
            self.program.display(),
            self.args.join(" "),
            output.display()
        );

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--output")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.unavailable(e.to_string()))?;

        let failed = |detail: String| BbExtractError::ConversionFailed {
            path: output.to_path_buf(),
            detail,
        };

        // Dropping stdin closes the pipe so pandoc sees EOF. A write error
        // usually means pandoc already exited, so reap it and report its
        // stderr first.
        let write_err = child
            .stdin
            .take()
            .and_then(|mut stdin| stdin.write_all(markdown.as_bytes()).err());

        let result = child
            .wait_with_output()
            .map_err(|e| failed(format!("waiting for pandoc: {e}")))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let detail = match stderr.trim() {
                "" => format!("pandoc exited with {}", result.status),
                msg => msg.to_string(),
            };
            return Err(failed(detail));
        }

        if let Some(e) = write_err {
            return Err(failed(format!("writing to pandoc stdin: {e}")));
        }

        Ok(())
    }
}
