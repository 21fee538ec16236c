//! Renderer configuration, read from `markup.toml`:
//!
//! ```toml
//! [header]
//! generate-toc = true
//!
//! [output]
//! mode = "html"   # or "text"
//! ```
//!
//! Absent keys take their defaults and unknown keys are ignored. A file that
//! exists but does not parse is an error, not a silent fallback.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;

use markup::{GENERATE_TOC_OPTION, OutputMode};

use crate::error::RenderError;

pub const CONFIG_FILE_NAME: &str = "markup.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub header: HeaderConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HeaderConfig {
    /// Give headings anchors and collect a table of contents.
    pub generate_toc: bool,
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self { generate_toc: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub mode: Mode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Html,
    Text,
}

impl EngineConfig {
    /// A boolean engine option by its dotted name. Unknown options are off.
    pub fn option(&self, name: &str) -> bool {
        match name {
            GENERATE_TOC_OPTION => self.header.generate_toc,
            _ => false,
        }
    }

    pub fn output_mode(&self) -> OutputMode {
        match self.output.mode {
            Mode::Html => OutputMode::Structured,
            Mode::Text => OutputMode::PlainText,
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Config path in the working directory.
pub fn discover() -> PathBuf {
    PathBuf::from(CONFIG_FILE_NAME)
}

/// Load the config at `path`, or at the discovered location when `None`.
/// A missing file yields the defaults.
pub fn load_from(path: Option<PathBuf>) -> Result<EngineConfig, RenderError> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_missing_using_defaults");
            return Ok(EngineConfig::default());
        }
        Err(e) => {
            return Err(RenderError::Config {
                path,
                message: e.to_string(),
            });
        }
    };

    let config = EngineConfig::from_toml(&content).map_err(|e| RenderError::Config {
        path: path.clone(),
        message: e.message().to_string(),
    })?;
    info!(
        target: "config",
        path = %path.display(),
        generate_toc = config.header.generate_toc,
        mode = ?config.output.mode,
        "config_loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};
    use tracing::subscriber::with_default;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone)]
    struct BufferWriter {
        inner: Arc<Mutex<Vec<u8>>>,
    }

    impl BufferWriter {
        fn new() -> (Self, Arc<Mutex<Vec<u8>>>) {
            let buf = Arc::new(Mutex::new(Vec::new()));
            (Self { inner: buf.clone() }, buf)
        }
    }

    struct LockedWriter<'a> {
        guard: MutexGuard<'a, Vec<u8>>,
    }

    impl Write for LockedWriter<'_> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.guard.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for BufferWriter {
        type Writer = LockedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            LockedWriter {
                guard: self.inner.lock().expect("log buffer poisoned"),
            }
        }
    }

    #[test]
    fn defaults_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_markup__.toml"))).unwrap();
        assert_eq!(cfg, EngineConfig::default());
        assert!(cfg.option(GENERATE_TOC_OPTION));
        assert_eq!(cfg.output_mode(), OutputMode::Structured);
    }

    #[test]
    fn parses_both_sections() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[header]\ngenerate-toc = false\n[output]\nmode = \"text\"\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(!cfg.option(GENERATE_TOC_OPTION));
        assert_eq!(cfg.output_mode(), OutputMode::PlainText);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[output]\nmode = \"html\"\n[unrelated]\nkey = 1\n").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.header.generate_toc);
        assert_eq!(cfg.output.mode, Mode::Html);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[output]\nmode = \"pdf\"\n").unwrap();
        let err = load_from(Some(tmp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, RenderError::Config { .. }));
    }

    #[test]
    fn unknown_option_is_off() {
        assert!(!EngineConfig::default().option("header.unknown"));
    }

    #[test]
    fn logs_loaded_config() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "[header]\ngenerate-toc = false\n").unwrap();
        let (writer, buf) = BufferWriter::new();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(writer)
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .finish();
        with_default(subscriber, || {
            load_from(Some(tmp.path().to_path_buf())).unwrap();
        });
        let logs = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("config_loaded"), "logs: {logs}");
        assert!(logs.contains("generate_toc=false"), "logs: {logs}");
    }
}
