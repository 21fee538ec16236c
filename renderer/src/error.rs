use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label};
use glyphs::codec::REPLACEMENT;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error(transparent)]
    Encoding(#[from] glyphs::Error),

    #[error("invalid config file {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl RenderError {
    /// Convert to a codespan-reporting Diagnostic for display.
    ///
    /// Encoding errors label the first invalid byte as it appears in the
    /// repaired source, where it has become one U+FFFD, so register
    /// `glyphs::repair(source)` as file `file_id`.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        match self {
            RenderError::Encoding(glyphs::Error::InvalidEncoding { offset }) => {
                let span = *offset..*offset + REPLACEMENT.len();
                Diagnostic::error()
                    .with_message("document is not valid UTF-8")
                    .with_labels(vec![
                        Label::primary(file_id, span).with_message("invalid byte sequence starts here"),
                    ])
                    .with_notes(vec![
                        "run `markup repair` to replace invalid sequences with U+FFFD".to_string(),
                    ])
            }
            other => Diagnostic::error().with_message(other.to_string()),
        }
    }
}
