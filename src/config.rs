//! Configuration types for a Blackboard extraction run.
//!
//! All run behaviour is controlled through [`ExtractConfig`], built via its
//! [`ExtractConfigBuilder`]. The modules directory is an injected value: the
//! binary derives it from the enclosing project root, tests point it at a
//! temporary directory.

use crate::error::BbExtractError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the modules directory below the project root.
pub const LMS_DIR_NAME: &str = "lms";

/// Suffix appended to the overview stem for both output files.
pub const DEFAULT_OUTPUT_SUFFIX: &str = "-bb";

/// Configuration for an extraction run.
///
/// Built via [`ExtractConfig::builder()`] or [`ExtractConfig::for_project()`].
///
/// # Example
/// ```rust
/// use bbextract::ExtractConfig;
///
/// let config = ExtractConfig::builder()
///     .lms_dir("/srv/course/lms")
///     .pandoc_path("/usr/local/bin/pandoc")
///     .build()
///     .unwrap();
/// assert_eq!(config.output_suffix, "-bb");
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// Directory holding the `lm-NN-<slug>/` module folders.
    pub lms_dir: PathBuf,

    /// Stem suffix for outputs: `lm-07-overview` + `-bb` + `.md` / `.docx`. Default: `-bb`.
    ///
    /// Must be non-empty, otherwise the intermediate markdown would overwrite
    /// the source overview.
    pub output_suffix: String,

    /// Converter executable. Default: `pandoc` (resolved on `PATH`).
    pub pandoc_path: PathBuf,

    /// Let the converter wrap long lines. Default: false (`--wrap=none`).
    pub wrap_lines: bool,

    /// Produce a standalone document. Default: true (`--standalone`).
    pub standalone: bool,

    /// Extra arguments appended to the converter command line.
    pub extra_pandoc_args: Vec<String>,

    /// Receives per-module events. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            lms_dir: PathBuf::from(LMS_DIR_NAME),
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
            pandoc_path: PathBuf::from("pandoc"),
            wrap_lines: false,
            standalone: true,
            extra_pandoc_args: Vec::new(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("lms_dir", &self.lms_dir)
            .field("output_suffix", &self.output_suffix)
            .field("pandoc_path", &self.pandoc_path)
            .field("wrap_lines", &self.wrap_lines)
            .field("standalone", &self.standalone)
            .field("extra_pandoc_args", &self.extra_pandoc_args)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn RunProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }

    /// Builder pre-seeded with `<project root>/lms`, the project root being
    /// the nearest ancestor of `start` that contains `.git`.
    pub fn for_project(start: impl AsRef<Path>) -> Result<ExtractConfigBuilder, BbExtractError> {
        let start = start.as_ref();
        let root = find_project_root(start).ok_or_else(|| BbExtractError::ProjectRootNotFound {
            start: start.to_path_buf(),
        })?;
        debug!("Project root: {}", root.display());
        Ok(Self::builder().lms_dir(root.join(LMS_DIR_NAME)))
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn lms_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.lms_dir = dir.into();
        self
    }

    pub fn output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.output_suffix = suffix.into();
        self
    }

    pub fn pandoc_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pandoc_path = path.into();
        self
    }

    pub fn wrap_lines(mut self, v: bool) -> Self {
        self.config.wrap_lines = v;
        self
    }

    pub fn standalone(mut self, v: bool) -> Self {
        self.config.standalone = v;
        self
    }

    pub fn extra_pandoc_arg(mut self, arg: impl Into<String>) -> Self {
        self.config.extra_pandoc_args.push(arg.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, BbExtractError> {
        let c = &self.config;
        if c.output_suffix.is_empty() {
            return Err(BbExtractError::InvalidConfig(
                "output suffix must not be empty (outputs would overwrite the overview)".into(),
            ));
        }
        if c.output_suffix.contains(['/', '\\']) {
            return Err(BbExtractError::InvalidConfig(format!(
                "output suffix must not contain path separators, got '{}'",
                c.output_suffix
            )));
        }
        if c.pandoc_path.as_os_str().is_empty() {
            return Err(BbExtractError::InvalidConfig(
                "pandoc path must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

/// Walk up from `start` to the nearest directory containing a `.git` entry.
///
/// `.git` may be a directory (normal checkout) or a file (worktrees,
/// submodules); either marks the root.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let c = ExtractConfig::default();
        assert_eq!(c.output_suffix, "-bb");
        assert_eq!(c.pandoc_path, PathBuf::from("pandoc"));
        assert!(!c.wrap_lines);
        assert!(c.standalone);
        assert!(c.progress_callback.is_none());
    }

    #[test]
    fn empty_suffix_rejected() {
        let err = ExtractConfig::builder().output_suffix("").build().unwrap_err();
        assert!(matches!(err, BbExtractError::InvalidConfig(_)));
    }

    #[test]
    fn suffix_with_separator_rejected() {
        let err = ExtractConfig::builder()
            .output_suffix("/../x")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("path separators"));
    }

    #[test]
    fn find_root_walks_up_to_git() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let deep = tmp.path().join("docs/ds100-exemplar");
        std::fs::create_dir_all(&deep).unwrap();

        assert_eq!(find_project_root(&deep), Some(tmp.path().to_path_buf()));
    }

    #[test]
    fn git_file_also_marks_root() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".git"), "gitdir: ../.git/worktrees/x\n").unwrap();
        assert_eq!(
            find_project_root(tmp.path()),
            Some(tmp.path().to_path_buf())
        );
    }

    #[test]
    fn for_project_points_at_lms() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();
        let config = ExtractConfig::for_project(tmp.path())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(config.lms_dir, tmp.path().join("lms"));
    }

    #[test]
    fn debug_hides_callback() {
        let s = format!("{:?}", ExtractConfig::default());
        assert!(s.contains("ExtractConfig"));
        assert!(s.contains("progress_callback: None"));
    }
}
