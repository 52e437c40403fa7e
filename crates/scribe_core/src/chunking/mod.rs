//! Chunking engine for oversized audio files.
//!
//! The transcription API rejects uploads over 25 MiB, so larger files
//! are split into time-bounded WAV segments, processed independently,
//! and the per-segment results reassembled into one output.
//!
//! # Components
//!
//! - **types**: `Chunk`, `MergeFormat`, `ChunkerError`
//! - **timestamps**: subtitle timing-line arithmetic
//! - **merge**: four-format result reassembly
//!
//! # Usage
//!
//! ```ignore
//! use scribe_core::chunking::{Chunker, MergeFormat};
//! use scribe_core::media::{FfprobeDurationProbe, FfmpegTranscoder};
//!
//! let chunker = Chunker::new(600.0);
//! if chunker.needs_chunking(&audio_path)? {
//!     let chunks = chunker.split(&audio_path, &work_dir, &probe, &transcoder)?;
//!     // ... transcribe each chunk ...
//!     let merged = chunker.merge(&transcripts, MergeFormat::Srt)?;
//!     chunker.cleanup(chunks.iter().map(|c| c.path.clone()));
//! }
//! ```

mod merge;
pub mod timestamps;
mod types;

pub use types::{Chunk, ChunkerError, ChunkerResult, MergeFormat, MAX_FILE_SIZE_BYTES};

use std::fs;
use std::path::Path;

use crate::media::{DurationProbe, Transcoder};

/// Splits oversized audio into chunks and merges per-chunk results.
///
/// The chunk duration is fixed at construction so that `split` and
/// `merge` always agree on the per-chunk timestamp offsets.
#[derive(Debug, Clone)]
pub struct Chunker {
    chunk_duration_secs: f64,
}

impl Chunker {
    /// Create a chunker with the given nominal chunk duration.
    pub fn new(chunk_duration_secs: f64) -> Self {
        Self {
            chunk_duration_secs,
        }
    }

    /// The nominal chunk duration in seconds.
    pub fn chunk_duration_secs(&self) -> f64 {
        self.chunk_duration_secs
    }

    /// Whether a file exceeds the API size limit and must be split.
    ///
    /// The boundary is exclusive: a file of exactly 25 MiB is not
    /// chunked. A missing file is a fatal input error.
    pub fn needs_chunking(&self, path: &Path) -> ChunkerResult<bool> {
        let metadata = fs::metadata(path).map_err(|_| ChunkerError::file_not_found(path))?;
        Ok(metadata.len() > MAX_FILE_SIZE_BYTES)
    }

    /// Split a source file into chunks under `output_dir`.
    ///
    /// Chunk `i` covers `[i * chunk_duration, min((i + 1) * chunk_duration,
    /// total))` and is written to `chunk_{i:04}.wav`. The output directory
    /// is created if absent. Any transcoder failure aborts the whole split.
    pub fn split(
        &self,
        input: &Path,
        output_dir: &Path,
        probe: &dyn DurationProbe,
        transcoder: &dyn Transcoder,
    ) -> ChunkerResult<Vec<Chunk>> {
        if !input.exists() {
            return Err(ChunkerError::file_not_found(input));
        }

        let total_secs = probe
            .duration_secs(input)?
            .ok_or_else(|| ChunkerError::duration_unavailable(input))?;

        fs::create_dir_all(output_dir)
            .map_err(|e| ChunkerError::io_error("create chunk directory", e))?;

        let count = (total_secs / self.chunk_duration_secs).ceil() as usize;

        tracing::debug!(
            "Splitting {} ({:.1}s) into {} chunk(s) of up to {:.1}s",
            input.display(),
            total_secs,
            count,
            self.chunk_duration_secs
        );

        let mut chunks = Vec::with_capacity(count);
        for i in 0..count {
            let start_secs = i as f64 * self.chunk_duration_secs;
            let duration_secs = self.chunk_duration_secs.min(total_secs - start_secs);
            let path = output_dir.join(format!("chunk_{:04}.wav", i));

            transcoder.extract_segment(input, &path, start_secs, duration_secs)?;

            chunks.push(Chunk {
                index: i,
                start_secs,
                duration_secs,
                path,
            });
        }

        Ok(chunks)
    }

    /// Merge index-ordered per-chunk results into one output.
    pub fn merge<S: AsRef<str>>(&self, chunks: &[S], format: MergeFormat) -> ChunkerResult<String> {
        match format {
            MergeFormat::Text => Ok(merge::merge_text(chunks)),
            MergeFormat::Json => merge::merge_json(chunks),
            MergeFormat::Srt | MergeFormat::Vtt => Ok(merge::merge_subtitles(
                chunks,
                format,
                self.chunk_duration_secs,
            )),
        }
    }

    /// Delete chunk files, silently skipping paths that no longer exist.
    ///
    /// Best-effort: failures are logged, never raised.
    pub fn cleanup<I, P>(&self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            let path = path.as_ref();
            match fs::remove_file(path) {
                Ok(()) => tracing::debug!("Removed chunk file: {}", path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
    }
}
