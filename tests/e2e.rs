//! End-to-end tests for bbextract.
//!
//! Each test builds a throwaway `lms/` tree in a temp directory and drives
//! the library the same way the binary does: discover → select → confirm →
//! run. Conversion goes through a recording fake so no pandoc is needed.
//! The one test that shells out to pandoc skips itself when pandoc is not
//! installed.

use bbextract::{
    confirm_modules, run_modules, BbExtractError, DocumentConverter, ExtractConfig, ModuleError,
    ModuleNumber, ModuleProcessor, ModuleRegistry, PandocConverter, RunProgressCallback, RunSummary,
    Selection,
};
use std::cell::RefCell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

const BEGIN: &str = "<!-- BLACKBOARD ULTRA CONTENT - COPY FROM HERE -->";
const END: &str = "<!-- END BLACKBOARD CONTENT -->";

/// Records every conversion request and writes a placeholder document.
#[derive(Default)]
struct RecordingConverter {
    calls: RefCell<Vec<(String, PathBuf)>>,
    fail_for: Option<PathBuf>,
}

impl DocumentConverter for RecordingConverter {
    fn convert(&self, markdown: &str, output: &Path) -> Result<(), BbExtractError> {
        self.calls
            .borrow_mut()
            .push((markdown.to_string(), output.to_path_buf()));
        if self.fail_for.as_deref() == Some(output) {
            return Err(BbExtractError::ConversionFailed {
                path: output.to_path_buf(),
                detail: "pandoc: simulated failure".into(),
            });
        }
        std::fs::write(output, b"docx").map_err(|e| BbExtractError::WriteFailed {
            path: output.to_path_buf(),
            source: e,
        })
    }
}

struct Course {
    root_dir: TempDir,
    lms: PathBuf,
}

impl Course {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let lms = root.path().join("lms");
        std::fs::create_dir(root.path().join(".git")).unwrap();
        std::fs::create_dir(&lms).unwrap();
        Self { root_dir: root, lms }
    }

    fn module(&self, dir: &str, overview_name: &str, text: Option<&str>) -> PathBuf {
        let d = self.lms.join(dir);
        std::fs::create_dir_all(&d).unwrap();
        if let Some(text) = text {
            std::fs::write(d.join(overview_name), text).unwrap();
        }
        d
    }

    fn root(&self) -> &Path {
        self.root_dir.path()
    }
}

fn marked(body: &str) -> String {
    format!("# Overview (staff)\n\n{BEGIN}\n{body}\n{END}\n\nInternal notes.\n")
}

fn legacy(body: &str) -> String {
    format!(
        "# Overview\n\n## BLACKBOARD ULTRA CONTENT\n\n\
<!-- Copy from here down for student-facing content -->\n\n{body}\n\n---\n\n*Note: staff only*\n"
    )
}

#[derive(Default)]
struct CountingCallback {
    started: AtomicUsize,
    modules: AtomicUsize,
    files: AtomicUsize,
    completed: AtomicUsize,
}

impl RunProgressCallback for CountingCallback {
    fn on_run_start(&self, total_modules: usize) {
        self.started.store(total_modules, Ordering::SeqCst);
    }
    fn on_module_start(&self, _number: ModuleNumber, _dir_name: &str) {
        self.modules.fetch_add(1, Ordering::SeqCst);
    }
    fn on_file_written(&self, _number: ModuleNumber, _path: &Path) {
        self.files.fetch_add(1, Ordering::SeqCst);
    }
    fn on_run_complete(&self, summary: &RunSummary) {
        self.completed.store(summary.attempted, Ordering::SeqCst);
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────────

#[test]
fn explicit_module_confirmed_end_to_end() {
    let course = Course::new();
    let dir = course.module("lm-07-probability", "lm-07-overview.md", Some(&marked("Hello world.")));

    let config = ExtractConfig::for_project(course.root())
        .unwrap()
        .build()
        .unwrap();
    let registry = ModuleRegistry::discover(&config.lms_dir);
    let selection = Selection::from_args(false, &["7"]).unwrap();
    let modules = selection.resolve(&registry, course.root()).unwrap();

    assert!(selection.needs_confirmation());
    let mut prompt = Vec::<u8>::new();
    assert!(confirm_modules(&modules, &registry, Cursor::new("y\n"), &mut prompt).unwrap());
    assert!(String::from_utf8(prompt).unwrap().contains("Module 07: lm-07-probability"));

    let converter = RecordingConverter::default();
    let processor = ModuleProcessor::new(&registry, &converter, &config);
    let summary = run_modules(&processor, &modules).unwrap();

    assert_eq!(
        std::fs::read_to_string(dir.join("lm-07-overview-bb.md")).unwrap(),
        "Hello world."
    );
    let calls = converter.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "Hello world.");
    assert_eq!(calls[0].1, dir.join("lm-07-overview-bb.docx"));
    assert_eq!(summary.to_string(), "1/1");
}

#[test]
fn declined_confirmation_processes_nothing() {
    let course = Course::new();
    let dir = course.module("lm-07-probability", "lm-07-overview.md", Some(&marked("Hello world.")));
    let registry = ModuleRegistry::discover(&course.lms);

    let modules = Selection::from_args(false, &["7", "9"])
        .unwrap()
        .resolve(&registry, course.root())
        .unwrap();
    let mut prompt = Vec::<u8>::new();
    let proceed = confirm_modules(&modules, &registry, Cursor::new("n\n"), &mut prompt).unwrap();

    assert!(!proceed);
    assert!(String::from_utf8(prompt).unwrap().contains("Module 09: [NOT FOUND]"));
    assert!(!dir.join("lm-07-overview-bb.md").exists());
    assert!(!dir.join("lm-07-overview-bb.docx").exists());
}

#[test]
fn current_mode_detects_module_from_subfolder() {
    let course = Course::new();
    let dir = course.module("lm-03-stats", "lm-03-overview.md", Some(&legacy("Weekly plan.")));
    let sub = dir.join("subfolder");
    std::fs::create_dir(&sub).unwrap();

    let registry = ModuleRegistry::discover(&course.lms);
    let selection = Selection::from_args(true, &[] as &[&str]).unwrap();
    assert!(!selection.needs_confirmation());
    assert_eq!(selection.resolve(&registry, &sub).unwrap(), vec![3]);

    let config = ExtractConfig::builder().lms_dir(&course.lms).build().unwrap();
    let converter = RecordingConverter::default();
    let processor = ModuleProcessor::new(&registry, &converter, &config);
    let summary = run_modules(&processor, &[3]).unwrap();

    assert_eq!(summary.to_string(), "1/1");
    assert_eq!(
        std::fs::read_to_string(dir.join("lm-03-overview-bb.md")).unwrap(),
        "Weekly plan."
    );
}

#[test]
fn current_mode_outside_modules_is_fatal() {
    let course = Course::new();
    course.module("lm-03-stats", "lm-03-overview.md", None);
    let registry = ModuleRegistry::discover(&course.lms);

    let err = Selection::Current
        .resolve(&registry, course.root())
        .unwrap_err();
    assert!(matches!(err, BbExtractError::CurrentModuleNotDetected { .. }));
}

#[test]
fn all_mode_tallies_mixed_outcomes() {
    let course = Course::new();
    let ok = course.module("lm-01-intro", "lm-01-overview.md", Some(&marked("Welcome.")));
    course.module("lm-02-data", "lm-02-overview.md", Some("# No markers at all\n"));
    course.module("lm-04-empty", "lm-04-overview.md", None);
    let bad = course.module("lm-05-models", "lm-05-overview.md", Some(&legacy("Models.")));
    course.module("_drafts", "notes.md", Some("ignored"));

    let callback = Arc::new(CountingCallback::default());
    let config = ExtractConfig::builder()
        .lms_dir(&course.lms)
        .progress_callback(callback.clone())
        .build()
        .unwrap();
    let registry = ModuleRegistry::discover(&config.lms_dir);
    let modules = Selection::All.resolve(&registry, course.root()).unwrap();
    assert_eq!(modules, vec![1, 2, 4, 5]);

    let converter = RecordingConverter {
        fail_for: Some(bad.join("lm-05-overview-bb.docx")),
        ..Default::default()
    };
    let processor = ModuleProcessor::new(&registry, &converter, &config);
    let summary = run_modules(&processor, &modules).unwrap();

    assert_eq!(summary.to_string(), "1/4");
    assert!(ok.join("lm-01-overview-bb.docx").exists());

    let errors: Vec<_> = summary.modules.iter().map(|m| m.error.clone()).collect();
    assert_eq!(errors[0], None);
    assert!(matches!(errors[1], Some(ModuleError::NoMarkedContent { .. })));
    assert!(matches!(errors[2], Some(ModuleError::OverviewMissing { .. })));
    assert!(matches!(errors[3], Some(ModuleError::ConversionFailed { .. })));
    // Markdown survives a failed conversion for review.
    assert!(bad.join("lm-05-overview-bb.md").exists());

    assert_eq!(callback.started.load(Ordering::SeqCst), 4);
    // Modules 1, 2 and 5 had an overview to work on.
    assert_eq!(callback.modules.load(Ordering::SeqCst), 3);
    // 1: md + docx, 5: md only.
    assert_eq!(callback.files.load(Ordering::SeqCst), 3);
    assert_eq!(callback.completed.load(Ordering::SeqCst), 4);
}

#[test]
fn unknown_explicit_module_counts_as_attempted() {
    let course = Course::new();
    course.module("lm-07-probability", "lm-07-overview.md", Some(&marked("Hello world.")));
    let registry = ModuleRegistry::discover(&course.lms);
    let config = ExtractConfig::builder().lms_dir(&course.lms).build().unwrap();
    let converter = RecordingConverter::default();
    let processor = ModuleProcessor::new(&registry, &converter, &config);

    let summary = run_modules(&processor, &[7, 42]).unwrap();

    assert_eq!(summary.to_string(), "1/2");
    assert_eq!(
        summary.modules[1].error,
        Some(ModuleError::NotRegistered { number: 42 })
    );
}

#[test]
fn missing_lms_dir_runs_nothing() {
    let tmp = TempDir::new().unwrap();
    let registry = ModuleRegistry::discover(tmp.path().join("lms"));
    let config = ExtractConfig::default();
    let converter = RecordingConverter::default();
    let processor = ModuleProcessor::new(&registry, &converter, &config);

    let modules = Selection::All.resolve(&registry, tmp.path()).unwrap();
    let summary = run_modules(&processor, &modules).unwrap();

    assert_eq!(summary.to_string(), "0/0");
    assert!(converter.calls.borrow().is_empty());
}

#[test]
fn summary_serialises_to_json() {
    let course = Course::new();
    course.module("lm-07-probability", "lm-07-overview.md", Some(&marked("Hello world.")));
    let registry = ModuleRegistry::discover(&course.lms);
    let config = ExtractConfig::builder().lms_dir(&course.lms).build().unwrap();
    let converter = RecordingConverter::default();
    let processor = ModuleProcessor::new(&registry, &converter, &config);

    let summary = run_modules(&processor, &[7, 8]).unwrap();
    let json: serde_json::Value = serde_json::to_value(&summary).unwrap();

    assert_eq!(json["attempted"], 2);
    assert_eq!(json["succeeded"], 1);
    assert_eq!(json["modules"][0]["dir_name"], "lm-07-probability");
    assert_eq!(json["modules"][1]["error"]["kind"], "not_registered");
}

// ── Real converter (needs pandoc on PATH) ────────────────────────────────────

#[test]
fn pandoc_produces_docx() {
    let converter = PandocConverter::from_config(&ExtractConfig::default());
    if converter.version().is_err() {
        println!("SKIP — pandoc not installed");
        return;
    }

    let course = Course::new();
    let dir = course.module(
        "lm-07-probability",
        "lm-07-overview.md",
        Some(&marked("## Week 7\n\n- Read chapter 7\n- Quiz on Friday")),
    );
    let registry = ModuleRegistry::discover(&course.lms);
    let config = ExtractConfig::builder().lms_dir(&course.lms).build().unwrap();
    let processor = ModuleProcessor::new(&registry, &converter, &config);

    let result = processor.process(7).unwrap();

    assert!(result.succeeded(), "got: {:?}", result.error);
    let docx = std::fs::read(dir.join("lm-07-overview-bb.docx")).unwrap();
    // DOCX is a zip archive.
    assert_eq!(&docx[..2], b"PK");
}
