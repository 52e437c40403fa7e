//! Configuration handling.
//!
//! - **settings**: sectioned `Settings` struct with serde defaults
//! - **manager**: load/save with atomic writes

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ChunkingSettings, ExecutorSettings, PathSettings, RateLimitSettings, Settings,
};
