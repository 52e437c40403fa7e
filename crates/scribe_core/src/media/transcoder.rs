//! Audio segment extraction using FFmpeg.
//!
//! Segments are re-encoded to 16kHz mono PCM WAV, the input format the
//! transcription API handles most reliably.

use std::path::Path;
use std::process::{Command, Stdio};

use super::{MediaError, MediaResult};

/// Contract for cutting a time-bounded segment out of a media file.
pub trait Transcoder: Send + Sync {
    /// Extract `[start_secs, start_secs + duration_secs)` from `input`
    /// into a new file at `output`.
    fn extract_segment(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> MediaResult<()>;
}

/// Transcoder backed by the `ffmpeg` binary.
#[derive(Debug, Clone, Copy)]
pub struct FfmpegTranscoder {
    /// Output sample rate in Hz.
    sample_rate: u32,
}

impl FfmpegTranscoder {
    pub fn new() -> Self {
        Self { sample_rate: 16000 }
    }

    /// Override the output sample rate.
    pub fn with_sample_rate(sample_rate: u32) -> Self {
        Self { sample_rate }
    }
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Transcoder for FfmpegTranscoder {
    fn extract_segment(
        &self,
        input: &Path,
        output: &Path,
        start_secs: f64,
        duration_secs: f64,
    ) -> MediaResult<()> {
        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y") // Overwrite output
            .arg("-i")
            .arg(input)
            .arg("-ss")
            .arg(format!("{}", start_secs))
            .arg("-t")
            .arg(format!("{}", duration_secs))
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-ar")
            .arg(self.sample_rate.to_string())
            .arg("-ac")
            .arg("1") // Mono
            .arg(output);

        cmd.stdout(Stdio::null()).stderr(Stdio::piped());

        tracing::debug!("Running FFmpeg: {:?}", cmd);

        let result = cmd
            .output()
            .map_err(|e| MediaError::tool_unavailable("ffmpeg", e))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MediaError::command_failed(
                "ffmpeg",
                result.status.code().unwrap_or(-1),
                stderr.to_string(),
            ));
        }

        Ok(())
    }
}
