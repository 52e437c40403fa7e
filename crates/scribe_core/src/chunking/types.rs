//! Core data structures and errors for the chunking engine.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::media::MediaError;

/// Maximum file size before chunking is required (25 MiB).
///
/// Files strictly larger than this must be split before they can be
/// sent to the transcription API.
pub const MAX_FILE_SIZE_BYTES: u64 = 25 * 1024 * 1024;

/// One contiguous time segment of a source file.
///
/// Chunks tile `[0, total_duration)` exactly, in index order, with the
/// last chunk possibly shorter than the nominal chunk duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequence index (0-based, contiguous).
    pub index: usize,
    /// Start offset within the source, in seconds.
    pub start_secs: f64,
    /// Duration of this segment, in seconds.
    pub duration_secs: f64,
    /// Path of the extracted segment file on disk.
    pub path: PathBuf,
}

/// Output format for merging per-chunk transcription results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFormat {
    /// Plain text, chunks joined with a single space.
    Text,
    /// JSON object with a `text` field, combined across chunks.
    Json,
    /// SubRip subtitles, cues renumbered and re-timed.
    Srt,
    /// WebVTT subtitles, cues renumbered and re-timed, single header.
    Vtt,
}

impl MergeFormat {
    /// Parse a format name as accepted by the public API.
    pub fn parse(name: &str) -> ChunkerResult<Self> {
        match name {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            other => Err(ChunkerError::unsupported_format(other)),
        }
    }

    /// Canonical name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }

    /// Whether this format carries subtitle timing lines.
    pub fn is_subtitle(self) -> bool {
        matches!(self, Self::Srt | Self::Vtt)
    }
}

/// Errors from chunking operations.
#[derive(Error, Debug)]
pub enum ChunkerError {
    /// The source audio file does not exist.
    #[error("Audio file not found: {path}")]
    FileNotFound { path: String },

    /// The metadata probe could not determine the source duration.
    #[error("Could not determine audio duration for: {path}")]
    DurationUnavailable { path: String },

    /// An external media tool failed or could not be invoked.
    #[error(transparent)]
    Media(#[from] MediaError),

    /// The requested merge format is not recognized.
    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    /// A chunk payload could not be parsed during merge.
    #[error("Failed to parse {what}: {message}")]
    ParseError { what: String, message: String },

    /// File I/O error with operation context.
    #[error("I/O error in {operation}: {source}")]
    IoError {
        operation: String,
        #[source]
        source: io::Error,
    },
}

impl ChunkerError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a duration unavailable error.
    pub fn duration_unavailable(path: impl AsRef<Path>) -> Self {
        Self::DurationUnavailable {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create an unsupported format error.
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    /// Create a parse error.
    pub fn parse_error(what: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            what: what.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error with context.
    pub fn io_error(operation: impl Into<String>, source: io::Error) -> Self {
        Self::IoError {
            operation: operation.into(),
            source,
        }
    }
}

/// Result type for chunking operations.
pub type ChunkerResult<T> = Result<T, ChunkerError>;
