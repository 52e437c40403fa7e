//! Media duration probing using ffprobe.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

use super::{MediaError, MediaResult};

/// Contract for looking up the duration of a media file.
///
/// Returns `Ok(None)` when the container does not report a duration;
/// callers decide whether that is fatal.
pub trait DurationProbe: Send + Sync {
    /// Duration of the file in seconds, if known.
    fn duration_secs(&self, path: &Path) -> MediaResult<Option<f64>>;
}

/// Duration probe backed by `ffprobe -print_format json`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeDurationProbe;

impl FfprobeDurationProbe {
    pub fn new() -> Self {
        Self
    }
}

impl DurationProbe for FfprobeDurationProbe {
    fn duration_secs(&self, path: &Path) -> MediaResult<Option<f64>> {
        if !path.exists() {
            return Err(MediaError::file_not_found(path));
        }

        tracing::debug!("Probing duration: {}", path.display());

        let output = Command::new("ffprobe")
            .arg("-v")
            .arg("error")
            .arg("-print_format")
            .arg("json")
            .arg("-show_format")
            .arg(path)
            .output()
            .map_err(|e| MediaError::tool_unavailable("ffprobe", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::command_failed(
                "ffprobe",
                output.status.code().unwrap_or(-1),
                stderr.to_string(),
            ));
        }

        let json: Value = serde_json::from_slice(&output.stdout)?;

        // ffprobe reports duration as a decimal string under "format".
        let duration = json
            .get("format")
            .and_then(|f| f.get("duration"))
            .and_then(|d| d.as_str())
            .and_then(|s| s.parse::<f64>().ok());

        Ok(duration)
    }
}
