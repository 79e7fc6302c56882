//! Error types for topicsync
//!
//! None of these errors are recovered locally. They surface to the driver in
//! `main`, which logs them and exits non-zero. The single recovered case, a
//! create request answered with "topic already exists", never becomes an
//! error: the cluster client reports it as [`crate::cluster::CreateOutcome::AlreadyExists`].

use thiserror::Error;

mod kafka_error_code;

pub(crate) use kafka_error_code::describe_code;
pub use kafka_error_code::KafkaErrorCode;

/// Result type alias for topicsync operations
pub type Result<T> = std::result::Result<T, TopicSyncError>;

/// Main error type for topicsync
#[derive(Error, Debug)]
pub enum TopicSyncError {
    /// The configuration document is unreadable or malformed
    #[error("Configuration load error: {0}")]
    ConfigLoad(String),

    /// The config store or the broker cluster cannot be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Topic metadata query failed for a reason other than absence
    #[error("Describe failed for topic '{topic}': {detail}")]
    Describe { topic: String, detail: String },

    /// Desired partition count is below the current one
    #[error(
        "New num.partitions value for topic '{topic}' is less than current num.partitions value: {desired} < {current}"
    )]
    ShrinkRejected {
        topic: String,
        desired: i32,
        current: i32,
    },

    #[error("Topic '{topic}' creation error: {detail}")]
    Create { topic: String, detail: String },

    #[error("Update failed for '{topic}' topic: {detail}")]
    Alter { topic: String, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Wire encode/decode failure
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl TopicSyncError {
    // ========== Error Context Builders ==========

    pub fn config_load(detail: impl Into<String>) -> Self {
        TopicSyncError::ConfigLoad(detail.into())
    }

    pub fn connection(detail: impl Into<String>) -> Self {
        TopicSyncError::Connection(detail.into())
    }

    pub fn describe(topic: &str, detail: impl ToString) -> Self {
        TopicSyncError::Describe {
            topic: topic.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn shrink_rejected(topic: &str, desired: i32, current: i32) -> Self {
        TopicSyncError::ShrinkRejected {
            topic: topic.to_string(),
            desired,
            current,
        }
    }

    pub fn create(topic: &str, detail: impl ToString) -> Self {
        TopicSyncError::Create {
            topic: topic.to_string(),
            detail: detail.to_string(),
        }
    }

    pub fn alter(topic: &str, detail: impl ToString) -> Self {
        TopicSyncError::Alter {
            topic: topic.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Create a protocol error with operation context
    ///
    /// # Example
    /// ```ignore
    /// TopicSyncError::protocol("decode header", "unexpected eof")
    /// // produces: "Protocol error: decode header: unexpected eof"
    /// ```
    pub fn protocol(operation: &str, detail: impl std::fmt::Display) -> Self {
        TopicSyncError::Protocol(format!("{}: {}", operation, detail))
    }

    /// Short, stable name of the error class, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            TopicSyncError::ConfigLoad(_) => "config_load",
            TopicSyncError::Connection(_) => "connection",
            TopicSyncError::Describe { .. } => "describe",
            TopicSyncError::ShrinkRejected { .. } => "shrink_rejected",
            TopicSyncError::Create { .. } => "create",
            TopicSyncError::Alter { .. } => "alter",
            TopicSyncError::Io(_) => "io",
            TopicSyncError::Protocol(_) => "protocol",
        }
    }

    /// Process exit status for this error. Every failure class exits with 1.
    pub fn exit_code(&self) -> u8 {
        1
    }
}
