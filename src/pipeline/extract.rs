//! Content extraction: pull the student-facing block out of an overview.
//!
//! Overview documents have carried two conventions over time and old ones are
//! never rewritten, so both stay supported:
//!
//! 1. **Marker pair** (current): an HTML comment line opens the block and
//!    another closes it.
//!
//!    ```text
//!    <!-- BLACKBOARD ULTRA CONTENT - COPY FROM HERE -->
//!    ...content...
//!    <!-- END BLACKBOARD CONTENT -->
//!    ```
//!
//! 2. **Legacy heading**: a `## BLACKBOARD ULTRA CONTENT` heading plus a fixed
//!    instruction comment; the block runs until a `---` / `*Note:` footer or
//!    the end of the document.
//!
//! Each format is a pure `&str → Option<&str>` strategy; they are tried in
//! order and the first hit wins.

use crate::error::BbExtractError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

pub const BEGIN_MARKER: &str = "<!-- BLACKBOARD ULTRA CONTENT - COPY FROM HERE -->";
pub const END_MARKER: &str = "<!-- END BLACKBOARD CONTENT -->";
pub const LEGACY_HEADING: &str = "## BLACKBOARD ULTRA CONTENT";
pub const LEGACY_INSTRUCTION: &str = "<!-- Copy from here down for student-facing content -->";

/// Footer that ends a legacy block: a rule, a blank line, then a `*Note:` line.
const LEGACY_TERMINATOR: &str = "\n---\n\n*Note:";

static RE_MARKED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s){}\n(.*?)\n{}",
        regex::escape(BEGIN_MARKER),
        regex::escape(END_MARKER)
    ))
    .unwrap()
});

static RE_LEGACY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?s){}\n\n{}\n\n(.*)",
        regex::escape(LEGACY_HEADING),
        regex::escape(LEGACY_INSTRUCTION)
    ))
    .unwrap()
});

type Strategy = fn(&str) -> Option<&str>;

const STRATEGIES: &[(&str, Strategy)] = &[("marker", extract_marked), ("legacy", extract_legacy)];

/// Extract the marked block from overview text, trimmed.
///
/// Returns `None` when neither format is present. A format that matches with
/// an empty span still wins; the caller decides what empty means.
pub fn extract_content(text: &str) -> Option<String> {
    let text = normalise_line_endings(text);
    STRATEGIES.iter().find_map(|(name, strategy)| {
        strategy(&text).map(|span| {
            debug!("Matched {} format ({} bytes)", name, span.len());
            span.trim().to_string()
        })
    })
}

/// Read an overview file and extract its marked block.
///
/// Read failures (permissions, invalid UTF-8) are fatal; a file without
/// markers is `Ok(None)`.
pub fn extract_from_file(path: &Path) -> Result<Option<String>, BbExtractError> {
    let text = std::fs::read_to_string(path).map_err(|e| BbExtractError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(extract_content(&text))
}

/// Span strictly between the marker lines, without their adjacent newlines.
fn extract_marked(text: &str) -> Option<&str> {
    RE_MARKED
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Span after the legacy heading block, up to the `*Note:` footer or EOF.
fn extract_legacy(text: &str) -> Option<&str> {
    let rest = RE_LEGACY.captures(text)?.get(1)?.as_str();
    Some(match rest.find(LEGACY_TERMINATOR) {
        Some(end) => &rest[..end],
        None => rest,
    })
}

/// CRLF and lone CR become LF, as text-mode reads do on every platform.
fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}
