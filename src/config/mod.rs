//! Configuration module for topicsync
//!
//! This module is organized into submodules:
//! - `defaults` - Default constants and values
//! - `args` - CLI argument definitions (flags and environment variables)
//! - `document` - Topics document schema
//! - `source` - Where the topics document is read from (file or Consul KV)

mod args;
mod defaults;
mod document;
mod source;

// Re-export submodule types
pub use args::{CliArgs, LogFormat};
pub use defaults::*;
pub use document::{RawTopicSpec, TopicsConfig};
pub use source::{ConfigSource, ConsulSource};
