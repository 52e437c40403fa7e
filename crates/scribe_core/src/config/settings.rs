//! Settings struct with TOML-based sections.
//!
//! Settings are organized into logical sections that map to TOML tables.
//! Every field carries a serde default so partial config files load
//! cleanly.

use serde::{Deserialize, Serialize};

/// Root settings structure containing all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Path-related settings.
    #[serde(default)]
    pub paths: PathSettings,

    /// Chunking settings.
    #[serde(default)]
    pub chunking: ChunkingSettings,

    /// Parallel execution settings.
    #[serde(default)]
    pub executor: ExecutorSettings,

    /// API rate limiting settings.
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

/// Path configuration for output and working files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathSettings {
    /// Output folder for merged transcripts.
    #[serde(default = "default_output_folder")]
    pub output_folder: String,

    /// Root folder for chunk working files.
    #[serde(default = "default_work_root")]
    pub work_root: String,
}

fn default_output_folder() -> String {
    "transcripts".to_string()
}

fn default_work_root() -> String {
    ".work".to_string()
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            output_folder: default_output_folder(),
            work_root: default_work_root(),
        }
    }
}

/// Chunking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingSettings {
    /// Nominal chunk duration in seconds.
    #[serde(default = "default_chunk_duration")]
    pub chunk_duration_secs: f64,
}

fn default_chunk_duration() -> f64 {
    600.0
}

impl Default for ChunkingSettings {
    fn default() -> Self {
        Self {
            chunk_duration_secs: default_chunk_duration(),
        }
    }
}

/// Parallel execution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// Maximum number of chunks processed concurrently.
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

fn default_max_workers() -> usize {
    3
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
        }
    }
}

/// API rate limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Maximum requests per trailing window.
    #[serde(default = "default_max_requests")]
    pub max_requests: usize,

    /// Trailing window length in seconds.
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,
}

fn default_max_requests() -> usize {
    50
}

fn default_window_seconds() -> f64 {
    60.0
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_seconds: default_window_seconds(),
        }
    }
}
