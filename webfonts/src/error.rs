//! Errors that can occur while generating a webfont

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

use crate::{format::Format, template::TemplateError};

/// A specialized result type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure that aborts a generation run.
///
/// Errors are `Clone` so that a failure memoized by the pipeline can be handed
/// to every format waiting on it.
#[derive(Clone, Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("\"options.{0}\" is undefined")]
    MissingOption(&'static str),

    #[error("\"options.files\" is empty")]
    NoGlyphs,

    #[error("glyph name '{0}' is used by more than one source file")]
    DuplicateName(String),

    #[error("invalid option: {0}")]
    InvalidOption(String),

    #[error("codepoint {codepoint:#X} assigned to '{name}' is not a Unicode scalar value")]
    InvalidCodepoint { name: String, codepoint: u32 },

    #[error("no codepoint left below U+10FFFF for '{name}'")]
    CodepointsExhausted { name: String },

    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: Arc<std::io::Error>,
    },

    #[error("malformed glyph '{name}': {reason}")]
    MalformedGlyph { name: String, reason: String },

    #[error("failed to generate {format} font: {reason}")]
    Conversion { format: Format, reason: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }

    pub(crate) fn conversion(format: Format, reason: impl std::fmt::Display) -> Self {
        Error::Conversion {
            format,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(name: &str, reason: impl std::fmt::Display) -> Self {
        Error::MalformedGlyph {
            name: name.to_owned(),
            reason: reason.to_string(),
        }
    }
}
