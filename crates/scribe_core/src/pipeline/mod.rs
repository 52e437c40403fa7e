//! End-to-end chunked transcription orchestration.
//!
//! Thin glue over the core components. Data flows one way:
//!
//! ```text
//! source file
//!     -> Chunker::split            (ordered chunk files)
//!     -> ParallelExecutor          (per-chunk processing, rate limited)
//!     -> Chunker::merge            (single output)
//!     -> Chunker::cleanup          (chunk files removed)
//! ```
//!
//! The per-chunk processing function is caller-supplied; it is typically
//! a transcription API call, which is why every invocation first claims
//! a rate limiter slot.

use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use crate::chunking::{Chunker, ChunkerError, MergeFormat};
use crate::config::Settings;
use crate::executor::{ParallelExecutor, TaskError};
use crate::media::{DurationProbe, Transcoder};
use crate::ratelimit::RateLimiter;

/// Errors from a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Chunking, probing, or merging failed.
    #[error(transparent)]
    Chunker(#[from] ChunkerError),

    /// A per-chunk processing task failed; carries the first failure
    /// in chunk order.
    #[error(transparent)]
    Task(#[from] TaskError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Orchestrates chunked transcription of oversized audio files.
///
/// Files under the size limit are processed directly; larger files are
/// split, processed in parallel under the worker cap, merged, and their
/// chunk files cleaned up. Any chunk failure aborts the run before
/// merge (chunk files are still cleaned up).
pub struct ChunkedTranscriber {
    chunker: Chunker,
    executor: ParallelExecutor,
    limiter: RateLimiter,
}

impl ChunkedTranscriber {
    /// Create a transcriber from pre-built components.
    pub fn new(chunker: Chunker, executor: ParallelExecutor, limiter: RateLimiter) -> Self {
        Self {
            chunker,
            executor,
            limiter,
        }
    }

    /// Create a transcriber from application settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Chunker::new(settings.chunking.chunk_duration_secs),
            ParallelExecutor::new(settings.executor.max_workers),
            RateLimiter::new(
                settings.rate_limit.max_requests,
                std::time::Duration::from_secs_f64(settings.rate_limit.window_seconds),
            ),
        )
    }

    /// The chunking engine in use.
    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Transcribe a file, chunking it first if it exceeds the size limit.
    ///
    /// `process` is invoked once per chunk file (or once with the source
    /// path when no chunking is needed), after claiming a rate limiter
    /// slot. Blocking variant; see [`transcribe_async`](Self::transcribe_async).
    pub fn transcribe<F, E>(
        &self,
        input: &Path,
        work_root: &Path,
        format: MergeFormat,
        probe: &dyn DurationProbe,
        transcoder: &dyn Transcoder,
        process: F,
    ) -> PipelineResult<String>
    where
        F: Fn(&Path) -> Result<String, E> + Sync,
        E: std::error::Error + Send + Sync + 'static,
    {
        if !self.chunker.needs_chunking(input)? {
            self.limiter.wait_if_needed();
            return process(input)
                .map_err(|e| TaskError::new(input.display().to_string(), e).into());
        }

        let chunks = self
            .chunker
            .split(input, &self.work_dir(work_root), probe, transcoder)?;
        let total = chunks.len();
        tracing::info!("Processing {} chunk(s) of {}", total, input.display());

        let descriptions: Vec<String> = chunks
            .iter()
            .map(|c| format!("Chunk {}/{}", c.index + 1, total))
            .collect();
        let description_refs: Vec<&str> = descriptions.iter().map(String::as_str).collect();

        let limiter = &self.limiter;
        let process = &process;
        let tasks: Vec<_> = chunks
            .iter()
            .map(|c| {
                let path = c.path.clone();
                move || {
                    limiter.wait_if_needed();
                    process(&path)
                }
            })
            .collect();

        let results = self.executor.run_sync(tasks, &description_refs);
        self.finish(&chunks.iter().map(|c| c.path.clone()).collect::<Vec<_>>(), results, format)
    }

    /// Suspendable variant of [`transcribe`](Self::transcribe) for
    /// callers inside a tokio runtime.
    ///
    /// Same ordering, isolation, and throttling contract. The split
    /// itself still runs the transcoder synchronously.
    pub async fn transcribe_async<P, Fut, E>(
        &self,
        input: &Path,
        work_root: &Path,
        format: MergeFormat,
        probe: &dyn DurationProbe,
        transcoder: &dyn Transcoder,
        process: P,
    ) -> PipelineResult<String>
    where
        P: Fn(PathBuf) -> Fut,
        Fut: Future<Output = Result<String, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        if !self.chunker.needs_chunking(input)? {
            self.limiter.wait_if_needed_async().await;
            return process(input.to_path_buf())
                .await
                .map_err(|e| TaskError::new(input.display().to_string(), e).into());
        }

        let chunks = self
            .chunker
            .split(input, &self.work_dir(work_root), probe, transcoder)?;
        let total = chunks.len();
        tracing::info!("Processing {} chunk(s) of {}", total, input.display());

        let descriptions: Vec<String> = chunks
            .iter()
            .map(|c| format!("Chunk {}/{}", c.index + 1, total))
            .collect();
        let description_refs: Vec<&str> = descriptions.iter().map(String::as_str).collect();

        let limiter = &self.limiter;
        let process = &process;
        let tasks: Vec<_> = chunks
            .iter()
            .map(|c| {
                let path = c.path.clone();
                async move {
                    limiter.wait_if_needed_async().await;
                    process(path).await
                }
            })
            .collect();

        let results = self.executor.run_async(tasks, &description_refs).await;
        self.finish(&chunks.iter().map(|c| c.path.clone()).collect::<Vec<_>>(), results, format)
    }

    /// Merge successful results and clean up chunk files.
    ///
    /// Cleanup runs whether or not a chunk failed; the first failure in
    /// chunk order is surfaced after cleanup.
    fn finish(
        &self,
        chunk_paths: &[PathBuf],
        results: Vec<Result<String, TaskError>>,
        format: MergeFormat,
    ) -> PipelineResult<String> {
        let failures = self.executor.failure_count(&results);
        if failures > 0 {
            tracing::warn!("{} of {} chunk(s) failed", failures, results.len());
        }

        let outcome = self.executor.filter_results(results, true);
        self.chunker.cleanup(chunk_paths);

        let texts = outcome?;
        Ok(self.chunker.merge(&texts, format)?)
    }

    /// Timestamped working directory for this run's chunk files.
    fn work_dir(&self, work_root: &Path) -> PathBuf {
        work_root.join(format!("chunks_{}", Local::now().format("%Y%m%d-%H%M%S%3f")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{MediaError, MediaResult};

    use std::fmt;
    use std::fs::File;
    use std::time::Duration;

    use tempfile::TempDir;

    #[derive(Debug)]
    struct ApiError(String);

    impl fmt::Display for ApiError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl std::error::Error for ApiError {}

    struct FixedProbe {
        duration: Option<f64>,
    }

    impl DurationProbe for FixedProbe {
        fn duration_secs(&self, _path: &Path) -> MediaResult<Option<f64>> {
            Ok(self.duration)
        }
    }

    struct FakeTranscoder;

    impl Transcoder for FakeTranscoder {
        fn extract_segment(
            &self,
            _input: &Path,
            output: &Path,
            _start_secs: f64,
            _duration_secs: f64,
        ) -> MediaResult<()> {
            File::create(output).unwrap();
            Ok(())
        }
    }

    fn large_input(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("audio.mp3");
        let file = File::create(&path).unwrap();
        file.set_len(26 * 1024 * 1024).unwrap();
        path
    }

    fn small_input(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("audio.mp3");
        let file = File::create(&path).unwrap();
        file.set_len(1024).unwrap();
        path
    }

    fn transcriber() -> ChunkedTranscriber {
        ChunkedTranscriber::new(
            Chunker::new(600.0),
            ParallelExecutor::new(3),
            RateLimiter::new(100, Duration::from_secs(60)),
        )
    }

    fn stem(path: &Path) -> String {
        path.file_stem().unwrap().to_str().unwrap().to_string()
    }

    #[test]
    fn large_file_is_split_processed_and_merged_in_order() {
        let dir = TempDir::new().unwrap();
        let input = large_input(&dir);

        let probe = FixedProbe {
            duration: Some(1500.0),
        };

        let merged = transcriber()
            .transcribe(
                &input,
                dir.path(),
                MergeFormat::Text,
                &probe,
                &FakeTranscoder,
                |path: &Path| Ok::<_, ApiError>(stem(path)),
            )
            .unwrap();

        assert_eq!(merged, "chunk_0000 chunk_0001 chunk_0002");
    }

    #[test]
    fn chunk_files_are_cleaned_up() {
        let dir = TempDir::new().unwrap();
        let input = large_input(&dir);

        let probe = FixedProbe {
            duration: Some(1200.0),
        };

        transcriber()
            .transcribe(
                &input,
                dir.path(),
                MergeFormat::Text,
                &probe,
                &FakeTranscoder,
                |path: &Path| Ok::<_, ApiError>(stem(path)),
            )
            .unwrap();

        let leftover: Vec<_> = walk_wavs(dir.path());
        assert!(leftover.is_empty(), "chunk files left behind: {:?}", leftover);
    }

    #[test]
    fn small_file_is_processed_directly() {
        let dir = TempDir::new().unwrap();
        let input = small_input(&dir);

        let probe = FixedProbe { duration: None };

        let merged = transcriber()
            .transcribe(
                &input,
                dir.path(),
                MergeFormat::Text,
                &probe,
                &FakeTranscoder,
                |path: &Path| Ok::<_, ApiError>(format!("direct:{}", stem(path))),
            )
            .unwrap();

        assert_eq!(merged, "direct:audio");
    }

    #[test]
    fn failing_chunk_aborts_and_still_cleans_up() {
        let dir = TempDir::new().unwrap();
        let input = large_input(&dir);

        let probe = FixedProbe {
            duration: Some(1500.0),
        };

        let err = transcriber()
            .transcribe(
                &input,
                dir.path(),
                MergeFormat::Text,
                &probe,
                &FakeTranscoder,
                |path: &Path| {
                    if stem(path).ends_with("0001") {
                        Err(ApiError("rate limited".to_string()))
                    } else {
                        Ok(stem(path))
                    }
                },
            )
            .unwrap_err();

        match err {
            PipelineError::Task(task_err) => {
                assert_eq!(task_err.description, "Chunk 2/3");
                assert!(task_err.source.downcast_ref::<ApiError>().is_some());
            }
            other => panic!("expected task error, got {:?}", other),
        }

        assert!(walk_wavs(dir.path()).is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn async_pipeline_matches_sync_contract() {
        let dir = TempDir::new().unwrap();
        let input = large_input(&dir);

        let probe = FixedProbe {
            duration: Some(1500.0),
        };

        let merged = transcriber()
            .transcribe_async(
                &input,
                dir.path(),
                MergeFormat::Text,
                &probe,
                &FakeTranscoder,
                |path: PathBuf| async move { Ok::<_, ApiError>(stem(&path)) },
            )
            .await
            .unwrap();

        assert_eq!(merged, "chunk_0000 chunk_0001 chunk_0002");
        assert!(walk_wavs(dir.path()).is_empty());
    }

    #[test]
    fn from_settings_uses_configured_values() {
        let mut settings = Settings::default();
        settings.chunking.chunk_duration_secs = 120.0;

        let transcriber = ChunkedTranscriber::from_settings(&settings);
        assert_eq!(transcriber.chunker().chunk_duration_secs(), 120.0);
    }

    fn walk_wavs(root: &Path) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            for entry in std::fs::read_dir(&dir).unwrap() {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().is_some_and(|e| e == "wav") {
                    found.push(path);
                }
            }
        }
        found
    }
}
