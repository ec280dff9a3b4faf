//! Configuration file loading for dbassist
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DBASSIST_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./dbassist.toml` or `./.dbassist.toml`
//! 4. Global: `<config dir>/dbassist/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    FileConfig, FileGrammarConfig, FileLlmConfig, FileLoggingConfig, FileReplConfig,
    FileSessionConfig, FileStoreConfig,
};
pub use loader::ConfigLoader;
