//! CLI binary for bbextract.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractConfig`, asks for confirmation when modules are named explicitly,
//! and prints per-module status plus the final tally.

use anyhow::{Context, Result};
use bbextract::{
    confirm_modules, run_modules, BbExtractError, ExtractConfig, ModuleProcessor,
    ModuleNumber, ModuleRegistry, ModuleResult, PandocConverter, ProgressCallback, RunProgressCallback,
    RunSummary, Selection,
};
use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

fn banner_rule() -> String {
    "=".repeat(60)
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a bar over the module batch with per-module
/// log lines printed above it. Falls back to plain stderr lines when the bar
/// is hidden (output is not a terminal, or `--no-progress`).
struct CliProgressCallback {
    bar: ProgressBar,
    /// Only print failures.
    quiet: bool,
}

impl CliProgressCallback {
    fn new(show_bar: bool, quiet: bool) -> Arc<Self> {
        let bar = if show_bar {
            ProgressBar::new(0)
        } else {
            ProgressBar::hidden()
        };
        Arc::new(Self { bar, quiet })
    }

    fn line(&self, msg: String) {
        if self.bar.is_hidden() {
            eprintln!("{msg}");
        } else {
            self.bar.println(msg);
        }
    }

    fn activate_bar(&self, total: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} modules  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Extracting");
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total_modules: usize) {
        self.activate_bar(total_modules);
        if !self.quiet {
            self.line(format!(
                "\n{}\n{}\n{}\n",
                banner_rule(),
                bold(&format!(
                    "Extracting Blackboard content for {total_modules} module(s)"
                )),
                banner_rule()
            ));
        }
    }

    fn on_module_start(&self, number: ModuleNumber, dir_name: &str) {
        self.bar.set_message(dir_name.to_string());
        if !self.quiet {
            self.line(format!("Processing Module {number:02}: {dir_name}"));
        }
    }

    fn on_file_written(&self, _number: ModuleNumber, path: &Path) {
        if !self.quiet {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            self.line(format!("  {} Created: {name}", green("✓")));
        }
    }

    fn on_module_complete(&self, result: &ModuleResult) {
        if let Some(ref e) = result.error {
            let msg = if e.is_warning() {
                format!("  {}  {}", yellow("⚠"), yellow(&format!("WARNING: {e}")))
            } else {
                format!("  {} {}", red("✗"), red(&format!("ERROR: {e}")))
            };
            self.line(msg);
        }
        if !self.quiet {
            self.line(String::new());
        }
        self.bar.inc(1);
    }

    fn on_run_complete(&self, _summary: &RunSummary) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Process every module under <project root>/lms (no confirmation)
  bbextract

  # Process specific modules (asks for confirmation)
  bbextract 1 3 5

  # Same, without the prompt
  bbextract --yes 7

  # Process the module containing the current directory
  cd lms/lm-03-stats/slides && bbextract --current

  # Point at a modules directory outside a git checkout
  bbextract --lms-dir ~/course/lms

  # Machine-readable results
  bbextract --json > results.json

OUTPUT:
  Creates lm-##-overview-bb.md and lm-##-overview-bb.docx next to each
  lm-##-overview.md. Both are overwritten on every run.

REQUIREMENTS:
  pandoc must be installed and on PATH (brew/dnf/apt), or passed via --pandoc.
"#;

/// Extract Blackboard Ultra content from module overview files.
#[derive(Parser, Debug)]
#[command(
    name = "bbextract",
    version,
    about = "Extract Blackboard Ultra content from module overview files and convert it to DOCX",
    long_about = "Scans <project root>/lms for lm-NN-<slug> module directories, pulls the \
student-facing block out of each lm-NN-overview.md (between the BLACKBOARD ULTRA CONTENT \
markers, or below the legacy heading) and converts it to DOCX with pandoc.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Module numbers to process (asks for confirmation). Omit to process all.
    #[arg(value_name = "MODULE", allow_negative_numbers = true)]
    modules: Vec<String>,

    /// Process the module containing the current directory.
    #[arg(long)]
    current: bool,

    /// Skip the confirmation prompt for explicit module numbers.
    #[arg(short, long)]
    yes: bool,

    /// Modules directory. Default: <git project root>/lms.
    #[arg(long, value_name = "DIR")]
    lms_dir: Option<PathBuf>,

    /// pandoc executable used for DOCX conversion.
    #[arg(long, value_name = "PATH", default_value = "pandoc")]
    pandoc: PathBuf,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Only print errors and the final summary.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Per-module outcomes reach the terminal through the progress callback;
    // library logs carry only run-level problems at the default level.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Selection (fatal on bad input, before anything else) ─────────────
    let selection = match Selection::from_args(cli.current, cli.modules.as_slice()) {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("{} {e}\n", red("ERROR:"));
            Cli::command()
                .print_help()
                .context("Failed to print usage")?;
            return Ok(ExitCode::FAILURE);
        }
    };

    let cwd = std::env::current_dir().context("Failed to read current directory")?;

    // ── Build config ─────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let callback = CliProgressCallback::new(show_progress, cli.quiet || cli.json);
    let (config, has_lms_dir) = build_config(&cli, &cwd, callback as ProgressCallback)?;

    let registry = if has_lms_dir {
        ModuleRegistry::discover(&config.lms_dir)
    } else {
        ModuleRegistry::empty(&config.lms_dir)
    };

    let modules = match selection.resolve(&registry, &cwd) {
        Ok(modules) => modules,
        Err(e @ BbExtractError::CurrentModuleNotDetected { .. }) => {
            eprintln!("{} {e}", red("ERROR:"));
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e).context("Failed to resolve modules"),
    };

    // ── Confirmation (explicit lists only) ───────────────────────────────
    if selection.needs_confirmation() && !cli.yes {
        let stdin = io::stdin();
        let proceed = confirm_modules(&modules, &registry, stdin.lock(), io::stderr())
            .context("Failed to read confirmation")?;
        if !proceed {
            eprintln!("\nCancelled by user.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    // ── Converter check ──────────────────────────────────────────────────
    let converter = PandocConverter::from_config(&config);
    if !modules.is_empty() {
        match converter.version() {
            Ok(version) => tracing::debug!("Using {}", version),
            Err(e) => {
                eprintln!("{} {e}", red("ERROR:"));
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    // ── Run ──────────────────────────────────────────────────────────────
    let processor = ModuleProcessor::new(&registry, &converter, &config);
    let summary = run_modules(&processor, &modules).context("Extraction aborted")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?;
        println!("{json}");
    } else {
        let mark = if summary.failed() == 0 {
            green("✔")
        } else {
            yellow("⚠")
        };
        println!("{}", banner_rule());
        println!(
            "{mark} Complete! Processed {} modules successfully",
            bold(&summary.to_string())
        );
        println!("{}", banner_rule());
        if registry.is_empty() && !cli.quiet {
            eprintln!(
                "{}",
                dim(&format!(
                    "No modules found in {}",
                    registry.lms_dir().display()
                ))
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Map CLI args to `ExtractConfig`.
///
/// The flag is false when no project root could be found. That is not
/// fatal: the run proceeds with nothing to process.
fn build_config(
    cli: &Cli,
    cwd: &Path,
    progress: ProgressCallback,
) -> Result<(ExtractConfig, bool)> {
    let (builder, has_lms_dir) = match cli.lms_dir {
        Some(ref dir) => (ExtractConfig::builder().lms_dir(dir), true),
        None => match ExtractConfig::for_project(cwd) {
            Ok(builder) => (builder, true),
            Err(e @ BbExtractError::ProjectRootNotFound { .. }) => {
                error!("{e}");
                (ExtractConfig::builder(), false)
            }
            Err(e) => return Err(e).context("Cannot locate the lms directory"),
        },
    };

    let config = builder
        .pandoc_path(&cli.pandoc)
        .progress_callback(progress)
        .build()
        .context("Invalid configuration")?;
    Ok((config, has_lms_dir))
}
