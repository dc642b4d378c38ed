//! Module discovery: map module numbers to their `lm-NN-<slug>` directories.
//!
//! The registry is built once per run by scanning the modules directory and
//! is read-only afterwards. Housekeeping folders that do not follow the
//! naming convention live alongside the modules and are skipped silently.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// A module number as typed on the command line or parsed from a directory
/// name. Signed so that any integer argument can be looked up and reported
/// as not found.
pub type ModuleNumber = i64;

/// `lm-<number>-<slug>`, anchored at the start only.
static RE_MODULE_DIR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^lm-([0-9]+)-(.+)").unwrap());

/// Parse the module number out of a directory name.
///
/// Returns `None` when the name does not follow `lm-<digits>-<slug>` or the
/// number does not fit in a [`ModuleNumber`].
pub fn parse_module_dir_name(name: &str) -> Option<ModuleNumber> {
    let caps = RE_MODULE_DIR.captures(name)?;
    caps[1].parse().ok()
}

/// File name of a module's overview document: `lm-07-overview.md`.
pub fn overview_file_name(number: ModuleNumber) -> String {
    format!("lm-{number:02}-overview.md")
}

/// Module number → directory name, plus the directory it was scanned from.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    lms_dir: PathBuf,
    modules: BTreeMap<ModuleNumber, String>,
}

impl ModuleRegistry {
    /// Scan `lms_dir` for module directories.
    ///
    /// A missing directory is logged and yields an empty registry; callers
    /// then simply have nothing to process. When two directories parse to
    /// the same number, the lexically later name wins.
    pub fn discover(lms_dir: impl AsRef<Path>) -> Self {
        let lms_dir = lms_dir.as_ref();
        let mut registry = Self {
            lms_dir: lms_dir.to_path_buf(),
            modules: BTreeMap::new(),
        };

        if !lms_dir.is_dir() {
            error!("LMS directory not found: {}", lms_dir.display());
            return registry;
        }

        let entries = match std::fs::read_dir(lms_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!("Cannot list LMS directory {}: {}", lms_dir.display(), e);
                return registry;
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        names.sort();

        for name in names {
            let Some(number) = parse_module_dir_name(&name) else {
                continue;
            };
            if let Some(previous) = registry.modules.insert(number, name.clone()) {
                debug!("Module {} directory '{}' replaced by '{}'", number, previous, name);
            }
        }

        info!(
            "Discovered {} module(s) in {}",
            registry.modules.len(),
            lms_dir.display()
        );
        registry
    }

    /// A registry with no modules, used when there is nothing to scan.
    pub fn empty(lms_dir: impl Into<PathBuf>) -> Self {
        Self {
            lms_dir: lms_dir.into(),
            modules: BTreeMap::new(),
        }
    }

    /// The directory this registry was scanned from.
    pub fn lms_dir(&self) -> &Path {
        &self.lms_dir
    }

    /// Directory name for a module number.
    pub fn get(&self, number: ModuleNumber) -> Option<&str> {
        self.modules.get(&number).map(String::as_str)
    }

    pub fn contains(&self, number: ModuleNumber) -> bool {
        self.modules.contains_key(&number)
    }

    /// All registered module numbers in ascending order.
    pub fn numbers(&self) -> Vec<ModuleNumber> {
        self.modules.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Full path of a registered module's directory.
    pub fn module_dir(&self, number: ModuleNumber) -> Option<PathBuf> {
        self.get(number).map(|name| self.lms_dir.join(name))
    }

    /// Expected overview path (`<lms>/<dir>/lm-NN-overview.md`) for a registered module.
    pub fn overview_path(&self, number: ModuleNumber) -> Option<PathBuf> {
        self.module_dir(number)
            .map(|dir| dir.join(overview_file_name(number)))
    }
}
