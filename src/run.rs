//! Run control: decide which modules to process, confirm, then drive the batch.
//!
//! ## Selection modes
//!
//! | Invocation          | Mode                  | Confirmation |
//! |---------------------|-----------------------|--------------|
//! | no arguments        | [`Selection::All`]    | no           |
//! | `--current`         | [`Selection::Current`]| no           |
//! | `7 9 12`            | [`Selection::Explicit`]| yes         |
//!
//! Selection errors (a non-integer module, no module under the working
//! directory) are fatal and happen before anything is processed. Per-module
//! failures during the batch are tallied, never fatal.

use crate::error::BbExtractError;
use crate::output::RunSummary;
use crate::process::ModuleProcessor;
use crate::registry::{parse_module_dir_name, ModuleNumber, ModuleRegistry};
use std::io::{self, BufRead, Write};
use std::num::IntErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Which modules the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every module in the registry.
    All,
    /// The module containing the working directory.
    Current,
    /// Exactly these module numbers, as typed (duplicates kept).
    Explicit(Vec<ModuleNumber>),
}

impl Selection {
    /// Interpret the invocation: `--current` wins, then positional module
    /// numbers, then "all".
    ///
    /// Positional arguments are ignored when `current` is set. Otherwise
    /// every one must parse as an integer. Any integer is accepted here;
    /// numbers with no matching directory are reported per module later.
    pub fn from_args<S: AsRef<str>>(current: bool, args: &[S]) -> Result<Self, BbExtractError> {
        if current {
            return Ok(Selection::Current);
        }
        if args.is_empty() {
            return Ok(Selection::All);
        }
        args.iter()
            .map(|arg| parse_module_arg(arg.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Selection::Explicit)
    }

    /// Only an explicit list asks before processing.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Selection::Explicit(_))
    }

    /// Resolve to the module numbers to attempt, in ascending order.
    ///
    /// `cwd` is only consulted for [`Selection::Current`].
    pub fn resolve(
        &self,
        registry: &ModuleRegistry,
        cwd: &Path,
    ) -> Result<Vec<ModuleNumber>, BbExtractError> {
        let mut modules = match self {
            Selection::All => registry.numbers(),
            Selection::Current => {
                let number = detect_current_module(registry.lms_dir(), cwd).ok_or_else(|| {
                    BbExtractError::CurrentModuleNotDetected {
                        cwd: cwd.to_path_buf(),
                    }
                })?;
                info!("Detected module {} from {}", number, cwd.display());
                vec![number]
            }
            Selection::Explicit(numbers) => numbers.clone(),
        };
        modules.sort_unstable();
        Ok(modules)
    }
}

/// Parse one positional module argument.
///
/// Integers beyond the [`ModuleNumber`] range saturate to its bounds; no
/// module directory can carry such a number, so they still end up as "not
/// found".
fn parse_module_arg(arg: &str) -> Result<ModuleNumber, BbExtractError> {
    match arg.trim().parse::<ModuleNumber>() {
        Ok(number) => Ok(number),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Ok(ModuleNumber::MAX),
            IntErrorKind::NegOverflow => Ok(ModuleNumber::MIN),
            _ => Err(BbExtractError::InvalidModuleNumber {
                arg: arg.to_string(),
            }),
        },
    }
}

/// Find the module whose directory contains `cwd`.
///
/// Walks from `cwd` upwards looking for a directory that is an immediate
/// child of `lms_dir` and follows the `lm-NN-<slug>` naming. Both paths are
/// canonicalised first, so symlinked checkouts resolve consistently.
pub fn detect_current_module(lms_dir: &Path, cwd: &Path) -> Option<ModuleNumber> {
    let lms_dir = lms_dir.canonicalize().ok()?;
    let cwd = cwd.canonicalize().ok()?;

    cwd.ancestors()
        .find(|dir| dir.parent() == Some(lms_dir.as_path()))
        .and_then(|dir| {
            let name = dir.file_name()?.to_str()?;
            debug!("Module directory candidate: {}", name);
            parse_module_dir_name(name)
        })
}

/// Show the requested modules and ask whether to proceed.
///
/// `y` / `yes` (any case) proceeds; anything else, including end of input,
/// declines.
pub fn confirm_modules<R: BufRead, W: Write>(
    modules: &[ModuleNumber],
    registry: &ModuleRegistry,
    mut input: R,
    mut output: W,
) -> io::Result<bool> {
    let rule = "-".repeat(60);
    let mut sorted = modules.to_vec();
    sorted.sort_unstable();

    writeln!(output, "\nYou've requested to process the following module(s):")?;
    writeln!(output, "{rule}")?;
    for number in sorted {
        match registry.get(number) {
            Some(name) => writeln!(output, "  Module {number:02}: {name}")?,
            None => writeln!(output, "  Module {number:02}: [NOT FOUND]")?,
        }
    }
    writeln!(output, "{rule}")?;
    write!(output, "\nProceed? [y/N]: ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Process each module in order and tally the results.
///
/// Per-module failures are recorded in the summary; only fatal I/O errors
/// abort the batch.
pub fn run_modules(
    processor: &ModuleProcessor<'_>,
    modules: &[ModuleNumber],
) -> Result<RunSummary, BbExtractError> {
    let callback = processor.config().progress_callback.as_ref();
    if let Some(cb) = callback {
        cb.on_run_start(modules.len());
    }
    info!("Extracting Blackboard content for {} module(s)", modules.len());

    let mut summary = RunSummary::default();
    for &number in modules {
        let result = processor.process(number)?;
        summary.record(result);
    }

    info!(
        "Processed {}/{} modules successfully",
        summary.succeeded, summary.attempted
    );
    if let Some(cb) = callback {
        cb.on_run_complete(&summary);
    }
    Ok(summary)
}
