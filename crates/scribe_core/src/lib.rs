//! Scribe Core - chunked audio transcription pipeline.
//!
//! This crate contains all business logic with zero CLI dependencies.
//! It can be used by the CLI application or embedded in a service.
//!
//! # Architecture
//!
//! ```text
//! pipeline (orchestration)
//!     ├── chunking   - split oversized audio, merge per-chunk results
//!     ├── executor   - bounded-concurrency task runner
//!     ├── ratelimit  - sliding-window API admission control
//!     └── media      - ffprobe/ffmpeg collaborator contracts
//! ```

pub mod chunking;
pub mod config;
pub mod executor;
pub mod logging;
pub mod media;
pub mod pipeline;
pub mod ratelimit;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_returns_value() {
        assert!(!version().is_empty());
    }
}
