//! Kafka admin client
//!
//! Implements [`ClusterAdmin`] with plain Kafka protocol requests:
//! Metadata (describe), CreateTopics (create) and AlterConfigs (alter).
//! API versions are pinned to ones every broker since 2.4 accepts.

use super::wire::{BrokerConnection, ConnectionSettings};
use super::{ClusterAdmin, CreateOutcome};
use crate::config::{DEFAULT_CLIENT_ID, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::error::{describe_code, KafkaErrorCode, Result, TopicSyncError};
use crate::reconcile::{ClusterTopicState, ConfigEntries, TopicSpec};
use kafka_protocol::messages::alter_configs_request::{AlterConfigsResource, AlterableConfig};
use kafka_protocol::messages::create_topics_request::{CreatableTopic, CreateableTopicConfig};
use kafka_protocol::messages::metadata_request::MetadataRequestTopic;
use kafka_protocol::messages::{
    AlterConfigsRequest, AlterConfigsResponse, ApiKey, CreateTopicsRequest, CreateTopicsResponse,
    MetadataRequest, MetadataResponse, TopicName,
};
use kafka_protocol::protocol::StrBytes;
use std::time::Duration;
use tracing::{debug, info, warn};

const METADATA_VERSION: i16 = 8;
const CREATE_TOPICS_VERSION: i16 = 4;
const ALTER_CONFIGS_VERSION: i16 = 1;

/// AlterConfigs resource type for topics
const TOPIC_RESOURCE_TYPE: i8 = 2;

/// Upper bound on how much earlier than the socket the broker gives up
const MAX_BROKER_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Admin client configuration
#[derive(Debug, Clone)]
pub struct AdminClientConfig {
    /// Bootstrap brokers, "host:port", tried in order
    pub brokers: Vec<String>,
    pub client_id: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl AdminClientConfig {
    pub fn new(brokers: Vec<String>) -> Self {
        Self {
            brokers,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Session with a Kafka cluster.
///
/// Holds one connection to a bootstrap broker and, when the controller is a
/// different broker, a lazily opened connection to the controller for
/// CreateTopics. Connections close when the client is dropped.
pub struct KafkaAdminClient {
    bootstrap: BrokerConnection,
    controller_addr: Option<String>,
    controller: Option<BrokerConnection>,
    settings: ConnectionSettings,
    /// Broker-side timeout for CreateTopics
    create_timeout_ms: i32,
}

impl KafkaAdminClient {
    /// Connect to the first bootstrap broker that answers a Metadata request
    pub fn connect(config: &AdminClientConfig) -> Result<Self> {
        let settings = ConnectionSettings {
            client_id: config.client_id.clone(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
        };

        let mut failures = Vec::new();
        for broker in config
            .brokers
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
        {
            match Self::bootstrap(broker, &settings) {
                Ok((bootstrap, metadata)) => {
                    let controller_addr =
                        controller_address(&metadata).filter(|addr| addr != broker);
                    info!(
                        broker,
                        brokers = metadata.brokers.len(),
                        controller = ?controller_addr,
                        "Connected to kafka cluster"
                    );
                    return Ok(Self {
                        bootstrap,
                        controller_addr,
                        controller: None,
                        create_timeout_ms: broker_timeout_ms(config.request_timeout),
                        settings,
                    });
                }
                Err(e) => {
                    warn!(broker, error = %e, "Kafka broker unreachable");
                    failures.push(format!("{}: {}", broker, e));
                }
            }
        }

        if failures.is_empty() {
            return Err(TopicSyncError::connection("no kafka brokers configured"));
        }
        Err(TopicSyncError::connection(format!(
            "Couldn't connect to kafka brokers: {}",
            failures.join("; ")
        )))
    }

    fn bootstrap(
        broker: &str,
        settings: &ConnectionSettings,
    ) -> Result<(BrokerConnection, MetadataResponse)> {
        let mut conn = BrokerConnection::connect(broker, settings)?;
        let request = MetadataRequest::default()
            .with_topics(Some(Vec::new()))
            .with_allow_auto_topic_creation(false);
        let metadata = conn.send_request(ApiKey::Metadata, METADATA_VERSION, &request)?;
        Ok((conn, metadata))
    }

    /// Address of the broker CreateTopics is sent to
    pub fn controller_addr(&self) -> &str {
        self.controller_addr
            .as_deref()
            .unwrap_or_else(|| self.bootstrap.addr())
    }

    fn controller_connection(&mut self) -> Result<&mut BrokerConnection> {
        let Some(addr) = self.controller_addr.clone() else {
            return Ok(&mut self.bootstrap);
        };
        let conn = match self.controller.take() {
            Some(conn) => conn,
            None => {
                debug!(controller = %addr, "Opening controller connection");
                BrokerConnection::connect(&addr, &self.settings)?
            }
        };
        Ok(self.controller.insert(conn))
    }
}

impl ClusterAdmin for KafkaAdminClient {
    fn describe_topic(&mut self, topic: &str) -> Result<ClusterTopicState> {
        let requested = MetadataRequestTopic::default().with_name(Some(topic_name(topic)));
        let request = MetadataRequest::default()
            .with_topics(Some(vec![requested]))
            .with_allow_auto_topic_creation(false);

        let response: MetadataResponse = self
            .bootstrap
            .send_request(ApiKey::Metadata, METADATA_VERSION, &request)
            .map_err(|e| TopicSyncError::describe(topic, e))?;

        let state = topic_state_from_metadata(topic, &response)?;
        debug!(
            topic,
            exists = state.exists(),
            partitions = ?state.current_partition_count(),
            "Described topic"
        );
        Ok(state)
    }

    fn create_topic(&mut self, spec: &TopicSpec) -> Result<CreateOutcome> {
        let request = CreateTopicsRequest::default()
            .with_topics(vec![creatable_topic(spec)])
            .with_timeout_ms(self.create_timeout_ms)
            .with_validate_only(false);

        let conn = self.controller_connection()?;
        let response: CreateTopicsResponse = conn
            .send_request(ApiKey::CreateTopics, CREATE_TOPICS_VERSION, &request)
            .map_err(|e| TopicSyncError::create(&spec.name, e))?;

        create_outcome(&spec.name, &response)
    }

    fn alter_topic_config(&mut self, topic: &str, entries: &ConfigEntries) -> Result<()> {
        let configs: Vec<AlterableConfig> = entries
            .iter()
            .map(|(name, value)| {
                AlterableConfig::default()
                    .with_name(StrBytes::from_string(name.clone()))
                    .with_value(value.clone().map(StrBytes::from_string))
            })
            .collect();

        let resource = AlterConfigsResource::default()
            .with_resource_type(TOPIC_RESOURCE_TYPE)
            .with_resource_name(StrBytes::from_string(topic.to_string()))
            .with_configs(configs);
        let request = AlterConfigsRequest::default()
            .with_resources(vec![resource])
            .with_validate_only(false);

        let response: AlterConfigsResponse = self
            .bootstrap
            .send_request(ApiKey::AlterConfigs, ALTER_CONFIGS_VERSION, &request)
            .map_err(|e| TopicSyncError::alter(topic, e))?;

        alter_result(topic, &response)
    }
}

/// Broker-side timeout for a request whose socket times out after
/// `socket_timeout`.
///
/// Kept below the socket timeout so a broker that gives up answers with
/// `RequestTimedOut` before the read times out. A zero socket timeout blocks
/// forever, so the broker gets the default.
fn broker_timeout_ms(socket_timeout: Duration) -> i32 {
    let timeout = if socket_timeout.is_zero() {
        Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)
    } else {
        let margin = (socket_timeout / 5).min(MAX_BROKER_TIMEOUT_MARGIN);
        socket_timeout - margin
    };
    i32::try_from(timeout.as_millis()).unwrap_or(i32::MAX)
}

fn topic_name(name: &str) -> TopicName {
    TopicName(StrBytes::from_string(name.to_string()))
}

fn creatable_topic(spec: &TopicSpec) -> CreatableTopic {
    let configs: Vec<CreateableTopicConfig> = spec
        .config_entries
        .iter()
        .map(|(name, value)| {
            CreateableTopicConfig::default()
                .with_name(StrBytes::from_string(name.clone()))
                .with_value(value.clone().map(StrBytes::from_string))
        })
        .collect();

    CreatableTopic::default()
        .with_name(topic_name(&spec.name))
        .with_num_partitions(spec.partitions)
        .with_replication_factor(spec.replication_factor)
        .with_configs(configs)
}

fn log_broker_error(operation: &'static str, topic: &str, code: i16) {
    let retriable = KafkaErrorCode::from_i16(code).is_some_and(|c| c.is_retriable());
    warn!(
        operation,
        topic,
        error_code = code,
        retriable,
        "Broker returned an error"
    );
}

/// Controller `host:port` from a Metadata response, if it advertises one
fn controller_address(metadata: &MetadataResponse) -> Option<String> {
    if metadata.controller_id.0 < 0 {
        return None;
    }
    metadata
        .brokers
        .iter()
        .find(|b| b.node_id == metadata.controller_id)
        .map(|b| format!("{}:{}", b.host.as_str(), b.port))
}

/// Interpret the Metadata entry for `topic`.
///
/// Existence comes from the error code, never from the partition count.
fn topic_state_from_metadata(
    topic: &str,
    response: &MetadataResponse,
) -> Result<ClusterTopicState> {
    let entry = response
        .topics
        .iter()
        .find(|t| t.name.as_ref().map(|n| n.as_str()) == Some(topic));

    let Some(entry) = entry else {
        return Ok(ClusterTopicState::Absent);
    };

    match KafkaErrorCode::from_i16(entry.error_code) {
        Some(KafkaErrorCode::None) => Ok(ClusterTopicState::Exists {
            partition_count: i32::try_from(entry.partitions.len()).unwrap_or(i32::MAX),
        }),
        Some(KafkaErrorCode::UnknownTopicOrPartition) => Ok(ClusterTopicState::Absent),
        _ => {
            log_broker_error("describe", topic, entry.error_code);
            Err(TopicSyncError::describe(
                topic,
                describe_code(entry.error_code, None),
            ))
        }
    }
}

fn create_outcome(topic: &str, response: &CreateTopicsResponse) -> Result<CreateOutcome> {
    let result = response
        .topics
        .iter()
        .find(|t| t.name.as_str() == topic)
        .ok_or_else(|| TopicSyncError::create(topic, "topic missing from CreateTopics response"))?;

    match KafkaErrorCode::from_i16(result.error_code) {
        Some(KafkaErrorCode::None) => Ok(CreateOutcome::Created),
        Some(KafkaErrorCode::TopicAlreadyExists) => Ok(CreateOutcome::AlreadyExists),
        _ => {
            log_broker_error("create", topic, result.error_code);
            Err(TopicSyncError::create(
                topic,
                describe_code(
                    result.error_code,
                    result.error_message.as_ref().map(|m| m.as_str()),
                ),
            ))
        }
    }
}

fn alter_result(topic: &str, response: &AlterConfigsResponse) -> Result<()> {
    let result = response
        .responses
        .iter()
        .find(|r| r.resource_name.as_str() == topic)
        .ok_or_else(|| TopicSyncError::alter(topic, "topic missing from AlterConfigs response"))?;

    if result.error_code == KafkaErrorCode::None.as_i16() {
        return Ok(());
    }
    log_broker_error("alter", topic, result.error_code);
    Err(TopicSyncError::alter(
        topic,
        describe_code(
            result.error_code,
            result.error_message.as_ref().map(|m| m.as_str()),
        ),
    ))
}
