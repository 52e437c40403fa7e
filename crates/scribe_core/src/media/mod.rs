//! External media tool collaborators.
//!
//! The chunking engine treats duration probing and segment extraction as
//! pluggable contracts so tests can substitute recording fakes for the
//! real ffprobe/ffmpeg binaries.
//!
//! - **probe**: duration lookup (`DurationProbe`, ffprobe-backed impl)
//! - **transcoder**: segment extraction (`Transcoder`, ffmpeg-backed impl)

mod probe;
mod transcoder;

pub use probe::{DurationProbe, FfprobeDurationProbe};
pub use transcoder::{FfmpegTranscoder, Transcoder};

use std::io;
use std::path::Path;

use thiserror::Error;

/// Errors from external media tool invocations.
#[derive(Error, Debug)]
pub enum MediaError {
    /// A required input file was not found.
    #[error("Required file not found: {path}")]
    FileNotFound { path: String },

    /// The tool executable could not be invoked at all.
    #[error("{tool} not found: {source}")]
    ToolUnavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The tool ran but reported failure.
    #[error("{tool} failed with exit code {exit_code}: {message}")]
    CommandFailed {
        tool: String,
        exit_code: i32,
        message: String,
    },

    /// The tool's output could not be parsed.
    #[error("Failed to parse tool output: {0}")]
    OutputParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create a file not found error.
    pub fn file_not_found(path: impl AsRef<Path>) -> Self {
        Self::FileNotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    /// Create a tool unavailable error.
    pub fn tool_unavailable(tool: impl Into<String>, source: io::Error) -> Self {
        Self::ToolUnavailable {
            tool: tool.into(),
            source,
        }
    }

    /// Create a command failed error.
    pub fn command_failed(
        tool: impl Into<String>,
        exit_code: i32,
        message: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            tool: tool.into(),
            exit_code,
            message: message.into(),
        }
    }
}

/// Result type for media tool operations.
pub type MediaResult<T> = Result<T, MediaError>;
