//! Kafka protocol error codes returned by the admin APIs topicsync uses

use std::fmt;

/// Kafka protocol error codes
/// See: <https://kafka.apache.org/protocol.html#protocol_error_codes>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i16)]
pub enum KafkaErrorCode {
    /// No error
    None = 0,
    /// Unknown server error
    UnknownServerError = -1,
    /// Unknown topic or partition
    UnknownTopicOrPartition = 3,
    /// Leader not available
    LeaderNotAvailable = 5,
    /// Not leader or follower
    NotLeaderOrFollower = 6,
    /// Request timed out
    RequestTimedOut = 7,
    /// Broker not available
    BrokerNotAvailable = 8,
    /// Invalid topic
    InvalidTopicException = 17,
    /// Topic authorization failed
    TopicAuthorizationFailed = 29,
    /// Cluster authorization failed
    ClusterAuthorizationFailed = 31,
    /// Unsupported version
    UnsupportedVersion = 35,
    /// Topic already exists
    TopicAlreadyExists = 36,
    /// Invalid partitions
    InvalidPartitions = 37,
    /// Invalid replication factor
    InvalidReplicationFactor = 38,
    /// Invalid replica assignment
    InvalidReplicaAssignment = 39,
    /// Invalid config
    InvalidConfig = 40,
    /// Not controller
    NotController = 41,
    /// Invalid request
    InvalidRequest = 42,
    /// Policy violation
    PolicyViolation = 44,
    /// Throttling quota exceeded
    ThrottlingQuotaExceeded = 89,
}

impl KafkaErrorCode {
    /// Map a raw wire code to a known variant
    pub fn from_i16(code: i16) -> Option<Self> {
        let known = match code {
            0 => KafkaErrorCode::None,
            -1 => KafkaErrorCode::UnknownServerError,
            3 => KafkaErrorCode::UnknownTopicOrPartition,
            5 => KafkaErrorCode::LeaderNotAvailable,
            6 => KafkaErrorCode::NotLeaderOrFollower,
            7 => KafkaErrorCode::RequestTimedOut,
            8 => KafkaErrorCode::BrokerNotAvailable,
            17 => KafkaErrorCode::InvalidTopicException,
            29 => KafkaErrorCode::TopicAuthorizationFailed,
            31 => KafkaErrorCode::ClusterAuthorizationFailed,
            35 => KafkaErrorCode::UnsupportedVersion,
            36 => KafkaErrorCode::TopicAlreadyExists,
            37 => KafkaErrorCode::InvalidPartitions,
            38 => KafkaErrorCode::InvalidReplicationFactor,
            39 => KafkaErrorCode::InvalidReplicaAssignment,
            40 => KafkaErrorCode::InvalidConfig,
            41 => KafkaErrorCode::NotController,
            42 => KafkaErrorCode::InvalidRequest,
            44 => KafkaErrorCode::PolicyViolation,
            89 => KafkaErrorCode::ThrottlingQuotaExceeded,
            _ => return None,
        };
        Some(known)
    }

    /// Returns true if this error is retriable.
    ///
    /// Informational only, it ends up in log output. Nothing in topicsync
    /// retries.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            KafkaErrorCode::LeaderNotAvailable
                | KafkaErrorCode::NotLeaderOrFollower
                | KafkaErrorCode::RequestTimedOut
                | KafkaErrorCode::NotController
                | KafkaErrorCode::ThrottlingQuotaExceeded
        )
    }

    /// Convert to the i16 error code used in Kafka protocol
    pub fn as_i16(&self) -> i16 {
        *self as i16
    }
}

impl fmt::Display for KafkaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_i16())
    }
}

/// Human readable rendering of a raw error code, including an optional
/// broker-supplied message.
pub(crate) fn describe_code(code: i16, message: Option<&str>) -> String {
    let base = match KafkaErrorCode::from_i16(code) {
        Some(known) => known.to_string(),
        None => format!("error code {}", code),
    };
    match message {
        Some(msg) if !msg.is_empty() => format!("{}: {}", base, msg),
        _ => base,
    }
}
