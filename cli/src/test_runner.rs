//! Runner for `.test.md` fixtures.
//!
//! A fixture is TOML front matter between `---` lines followed by the
//! document to render:
//!
//! ```text
//! ---
//! description = "duplicate headings"
//! expect_output = """
//! <h2><a name="a"></a>A</h2>
//! <h2><a name="a-1"></a>A</h2>"""
//! expect_no_toc = false
//! ---
//! = A =
//! = A =
//! ```
//!
//! Only a line that is exactly `---` closes the front matter, so expected
//! plain-text output may contain longer `-` underlines.
//!
//! The document part is passed to the renderer as raw bytes, so fixtures
//! can hold invalid UTF-8 and expect an error.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use renderer::config::Mode;
use renderer::{EngineConfig, RenderedDocument};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// `html` (default) or `text`.
    #[serde(default)]
    pub mode: Mode,

    #[serde(default = "default_generate_toc")]
    pub generate_toc: bool,

    /// Expected rendered body (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// Expected table of contents HTML (trimmed comparison).
    #[serde(default)]
    pub expect_toc: Option<String>,

    /// The document must not produce a table of contents.
    #[serde(default)]
    pub expect_no_toc: bool,

    /// Rendering must fail with an error whose message contains this.
    #[serde(default)]
    pub expect_error: Option<String>,
}

fn default_generate_toc() -> bool {
    true
}

impl FixtureConfig {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default();
        config.output.mode = self.mode;
        config.header.generate_toc = self.generate_toc;
        config
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn strip_newline(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_prefix(b"\r\n")
        .or_else(|| bytes.strip_prefix(b"\n"))
        .unwrap_or(bytes)
}

/// Start of the first line that is exactly `---`, and the start of the line
/// after it. Lines that merely begin with `---`, such as an underline inside
/// a multi-line string, do not close the front matter.
fn closing_delimiter(bytes: &[u8]) -> Option<(usize, usize)> {
    let mut start = 0;
    loop {
        let end = find(&bytes[start..], b"\n").map_or(bytes.len(), |i| start + i);
        let line = &bytes[start..end];
        if line.strip_suffix(b"\r").unwrap_or(line) == b"---" {
            return Some((start, (end + 1).min(bytes.len())));
        }
        if end == bytes.len() {
            return None;
        }
        start = end + 1;
    }
}

/// Split a fixture into its config and document bytes.
fn parse_fixture(content: &[u8]) -> Result<(FixtureConfig, &[u8]), String> {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    let after_open = content
        .strip_prefix(b"---")
        .ok_or("missing opening --- front matter delimiter")?;
    let after_open = strip_newline(after_open);

    let (close, document_start) =
        closing_delimiter(after_open).ok_or("missing closing --- front matter delimiter")?;
    let header = std::str::from_utf8(&after_open[..close])
        .map_err(|e| format!("front matter is not valid UTF-8: {}", e))?
        .trim_end_matches(['\r', '\n']);
    let document = &after_open[document_start..];

    let config = toml::from_str(header).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, document))
}

fn compare(what: &str, expected: &str, actual: &str) -> Option<String> {
    let (expected, actual) = (expected.trim(), actual.trim());
    (expected != actual).then(|| {
        format!(
            "{} mismatch\n  expected: {}\n  actual:   {}",
            what, expected, actual
        )
    })
}

/// Every expectation the rendered document misses.
fn check_document(config: &FixtureConfig, document: &RenderedDocument) -> Vec<String> {
    let mut failures = Vec::new();
    if let Some(expected) = &config.expect_error {
        failures.push(format!(
            "expected error containing \"{}\", but rendering succeeded",
            expected
        ));
    }
    if let Some(expected) = &config.expect_output {
        failures.extend(compare("output", expected, &document.body()));
    }
    let toc = document.toc_html();
    match (&config.expect_toc, &toc) {
        (Some(expected), Some(actual)) => failures.extend(compare("toc", expected, actual)),
        (Some(_), None) => failures.push("expected a table of contents, got none".to_string()),
        _ => {}
    }
    if config.expect_no_toc {
        if let Some(actual) = &toc {
            failures.push(format!("expected no table of contents, got: {}", actual));
        }
    }
    failures
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_fixture(path: &Path) -> TestResult {
    let result = |description: Option<String>, outcome| TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    };

    let content = match std::fs::read(path) {
        Ok(c) => c,
        Err(e) => return result(None, TestOutcome::Fail(format!("cannot read file: {}", e))),
    };
    let (config, source) = match parse_fixture(&content) {
        Ok(pair) => pair,
        Err(e) => return result(None, TestOutcome::Fail(format!("front matter error: {}", e))),
    };
    debug!(target: "fixtures", path = %path.display(), bytes = source.len(), "fixture_run");

    let failures = match renderer::render_document(source, &config.engine_config()) {
        Ok(document) => check_document(&config, &document),
        Err(error) => {
            let message = error.to_string();
            match &config.expect_error {
                Some(expected) if message.contains(expected.as_str()) => Vec::new(),
                Some(expected) => vec![format!(
                    "expected error containing \"{}\", got: {}",
                    expected, message
                )],
                None => vec![format!("unexpected render error: {}", message)],
            }
        }
    };

    let outcome = if failures.is_empty() {
        TestOutcome::Pass
    } else {
        TestOutcome::Fail(failures.join("\n"))
    };
    result(config.description, outcome)
}

/// Discover `.test.md` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "".
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_fixtures(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_fixtures(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|entry| entry.path()) {
        if path.is_dir() {
            collect_fixtures(&path, root, out);
            continue;
        }
        let is_fixture = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".test.md"));
        if is_fixture {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Pick the categories to run. Unknown requested categories are reported.
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }
    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let before = selected.len();
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files);
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                available.join(", ")
            );
        }
    }
    selected
}

/// Run all `.test.md` files under `path` (or a single file).
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    let all = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };
    if all.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return 1;
    }
    let selected = select(&all, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();
    for (category, files) in &selected {
        eprintln!();
        eprintln!("{}", style.bold(category_label(category)));
        for file in *files {
            let result = run_fixture(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("31", "FAILED"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
