//! Kafka admin client tests against an in-process fake broker
//!
//! The fake broker listens on 127.0.0.1:0, decodes real Kafka frames with
//! `kafka-protocol` and answers Metadata, CreateTopics and AlterConfigs from
//! an in-memory topic table.

use bytes::{BufMut, BytesMut};
use kafka_protocol::messages::alter_configs_response::AlterConfigsResourceResponse;
use kafka_protocol::messages::create_topics_response::CreatableTopicResult;
use kafka_protocol::messages::metadata_response::{
    MetadataResponseBroker, MetadataResponsePartition, MetadataResponseTopic,
};
use kafka_protocol::messages::{
    AlterConfigsRequest, AlterConfigsResponse, ApiKey, BrokerId, CreateTopicsRequest,
    CreateTopicsResponse, MetadataRequest, MetadataResponse, RequestHeader, ResponseHeader,
};
use kafka_protocol::protocol::{Decodable, Encodable, StrBytes};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use topicsync::cluster::wire::{read_frame, request_header_version};
use topicsync::cluster::{AdminClientConfig, ClusterAdmin, CreateOutcome, KafkaAdminClient};
use topicsync::config::RawTopicSpec;
use topicsync::reconcile::{
    ClusterTopicState, ConfigEntries, ReconcileOptions, Reconciler, TopicSpec,
};
use topicsync::TopicSyncError;

#[derive(Debug, Clone, Default)]
struct FakeTopic {
    partitions: i32,
    replication_factor: i16,
    configs: BTreeMap<String, Option<String>>,
}

#[derive(Debug, Default)]
struct BrokerState {
    topics: HashMap<String, FakeTopic>,
    /// API keys of every request received, in order
    requests: Vec<i16>,
    /// Controller advertised in Metadata responses, if not this broker
    controller: Option<(i32, u16)>,
}

struct FakeBroker {
    port: u16,
    state: Arc<Mutex<BrokerState>>,
}

const FAKE_NODE_ID: i32 = 1;
const NOT_HOSTED: &str = "This server does not host this topic-partition.";

impl FakeBroker {
    fn start() -> Self {
        Self::start_with(BrokerState::default())
    }

    fn start_with(state: BrokerState) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(Mutex::new(state));

        let shared = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                let shared = Arc::clone(&shared);
                thread::spawn(move || serve(stream, port, shared));
            }
        });

        Self { port, state }
    }

    fn addr(&self) -> String {
        format!("127.0.0.1:{}", self.port)
    }

    fn with_topic(self, name: &str, partitions: i32) -> Self {
        self.state.lock().unwrap().topics.insert(
            name.to_string(),
            FakeTopic {
                partitions,
                replication_factor: 1,
                configs: BTreeMap::new(),
            },
        );
        self
    }

    fn topic(&self, name: &str) -> Option<FakeTopic> {
        self.state.lock().unwrap().topics.get(name).cloned()
    }

    fn requests(&self) -> Vec<i16> {
        self.state.lock().unwrap().requests.clone()
    }
}

fn serve(mut stream: TcpStream, port: u16, state: Arc<Mutex<BrokerState>>) {
    while let Ok(frame) = read_frame(&mut stream) {
        let mut buf = frame;
        let api_key = i16::from_be_bytes([buf[0], buf[1]]);
        let api_version = i16::from_be_bytes([buf[2], buf[3]]);
        let key = ApiKey::try_from(api_key).unwrap();
        let header =
            RequestHeader::decode(&mut buf, request_header_version(key, api_version)).unwrap();

        let mut body = BytesMut::new();
        ResponseHeader::default()
            .with_correlation_id(header.correlation_id)
            .encode(&mut body, 0)
            .unwrap();

        let mut state = state.lock().unwrap();
        state.requests.push(api_key);
        match key {
            ApiKey::Metadata => {
                let request = MetadataRequest::decode(&mut buf, api_version).unwrap();
                metadata_response(&state, port, &request)
                    .encode(&mut body, api_version)
                    .unwrap();
            }
            ApiKey::CreateTopics => {
                let request = CreateTopicsRequest::decode(&mut buf, api_version).unwrap();
                create_topics_response(&mut state, &request)
                    .encode(&mut body, api_version)
                    .unwrap();
            }
            ApiKey::AlterConfigs => {
                let request = AlterConfigsRequest::decode(&mut buf, api_version).unwrap();
                alter_configs_response(&mut state, &request)
                    .encode(&mut body, api_version)
                    .unwrap();
            }
            other => panic!("fake broker does not handle {:?}", other),
        }
        drop(state);

        let mut frame = BytesMut::with_capacity(4 + body.len());
        frame.put_i32(body.len() as i32);
        frame.extend_from_slice(&body);
        if stream.write_all(&frame).is_err() {
            break;
        }
    }
}

fn broker(node_id: i32, port: u16) -> MetadataResponseBroker {
    MetadataResponseBroker::default()
        .with_node_id(BrokerId(node_id))
        .with_host(StrBytes::from_static_str("127.0.0.1"))
        .with_port(i32::from(port))
}

fn metadata_response(
    state: &BrokerState,
    port: u16,
    request: &MetadataRequest,
) -> MetadataResponse {
    let mut brokers = vec![broker(FAKE_NODE_ID, port)];
    let mut controller_id = FAKE_NODE_ID;
    if let Some((id, controller_port)) = state.controller {
        brokers.push(broker(id, controller_port));
        controller_id = id;
    }

    let topics = request
        .topics
        .iter()
        .flatten()
        .filter_map(|t| t.name.clone())
        .map(|name| {
            let topic = MetadataResponseTopic::default().with_name(Some(name.clone()));
            let Some(existing) = state.topics.get(name.as_str()) else {
                return topic.with_error_code(3);
            };
            let partitions = (0..existing.partitions)
                .map(|i| MetadataResponsePartition::default().with_partition_index(i))
                .collect();
            topic.with_error_code(0).with_partitions(partitions)
        })
        .collect();

    MetadataResponse::default()
        .with_brokers(brokers)
        .with_controller_id(BrokerId(controller_id))
        .with_topics(topics)
}

fn create_topics_response(
    state: &mut BrokerState,
    request: &CreateTopicsRequest,
) -> CreateTopicsResponse {
    let results = request
        .topics
        .iter()
        .map(|t| {
            let name = t.name.as_str().to_string();
            let result = CreatableTopicResult::default().with_name(t.name.clone());
            if state.topics.contains_key(&name) {
                let message = format!("Topic '{}' already exists.", name);
                return result
                    .with_error_code(36)
                    .with_error_message(Some(StrBytes::from_string(message)));
            }
            let configs = t
                .configs
                .iter()
                .map(|c| {
                    (
                        c.name.as_str().to_string(),
                        c.value.as_ref().map(|v| v.as_str().to_string()),
                    )
                })
                .collect();
            state.topics.insert(
                name,
                FakeTopic {
                    partitions: t.num_partitions.max(1),
                    replication_factor: t.replication_factor,
                    configs,
                },
            );
            result.with_error_code(0)
        })
        .collect();

    CreateTopicsResponse::default().with_topics(results)
}

fn alter_configs_response(
    state: &mut BrokerState,
    request: &AlterConfigsRequest,
) -> AlterConfigsResponse {
    let responses = request
        .resources
        .iter()
        .map(|r| {
            let response = AlterConfigsResourceResponse::default()
                .with_resource_type(r.resource_type)
                .with_resource_name(r.resource_name.clone());
            match state.topics.get_mut(r.resource_name.as_str()) {
                Some(topic) if r.resource_type == 2 => {
                    topic.configs = r
                        .configs
                        .iter()
                        .map(|c| {
                            (
                                c.name.as_str().to_string(),
                                c.value.as_ref().map(|v| v.as_str().to_string()),
                            )
                        })
                        .collect();
                    response.with_error_code(0)
                }
                _ => response
                    .with_error_code(3)
                    .with_error_message(Some(StrBytes::from_static_str(NOT_HOSTED))),
            }
        })
        .collect();

    AlterConfigsResponse::default().with_responses(responses)
}

fn client_config(brokers: Vec<String>) -> AdminClientConfig {
    AdminClientConfig::new(brokers).with_request_timeout(Duration::from_secs(5))
}

/// Address of a port nothing listens on
fn closed_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

#[test]
fn test_describe_existing_and_absent_topics() {
    let broker = FakeBroker::start().with_topic("orders", 6);
    let mut client = KafkaAdminClient::connect(&client_config(vec![broker.addr()])).unwrap();

    assert_eq!(
        client.describe_topic("orders").unwrap(),
        ClusterTopicState::Exists { partition_count: 6 }
    );
    assert_eq!(
        client.describe_topic("missing").unwrap(),
        ClusterTopicState::Absent
    );
    // Describing never auto-creates
    assert!(broker.topic("missing").is_none());
}

#[test]
fn test_create_then_create_again_reports_already_exists() {
    let broker = FakeBroker::start();
    let mut client = KafkaAdminClient::connect(&client_config(vec![broker.addr()])).unwrap();

    let spec = TopicSpec::new("payments", 3, 2).with_config("retention.ms", "1000");
    assert_eq!(client.create_topic(&spec).unwrap(), CreateOutcome::Created);

    let stored = broker.topic("payments").unwrap();
    assert_eq!(stored.partitions, 3);
    assert_eq!(stored.replication_factor, 2);
    assert_eq!(
        stored.configs.get("retention.ms"),
        Some(&Some("1000".to_string()))
    );

    assert_eq!(
        client.create_topic(&spec).unwrap(),
        CreateOutcome::AlreadyExists
    );
}

#[test]
fn test_create_sends_unmanaged_sentinels() {
    let broker = FakeBroker::start();
    let mut client = KafkaAdminClient::connect(&client_config(vec![broker.addr()])).unwrap();

    client.create_topic(&TopicSpec::new("logs", -1, -1)).unwrap();

    let stored = broker.topic("logs").unwrap();
    assert_eq!(stored.partitions, 1);
    assert_eq!(stored.replication_factor, -1);
}

#[test]
fn test_alter_replaces_config_entries() {
    let broker = FakeBroker::start().with_topic("orders", 6);
    let mut client = KafkaAdminClient::connect(&client_config(vec![broker.addr()])).unwrap();

    let mut entries = ConfigEntries::new();
    entries.insert("cleanup.policy".to_string(), Some("compact".to_string()));
    entries.insert("segment.ms".to_string(), None);
    client.alter_topic_config("orders", &entries).unwrap();

    assert_eq!(broker.topic("orders").unwrap().configs, entries);
}

#[test]
fn test_alter_unknown_topic_is_alter_error() {
    let broker = FakeBroker::start();
    let mut client = KafkaAdminClient::connect(&client_config(vec![broker.addr()])).unwrap();

    let err = client
        .alter_topic_config("missing", &ConfigEntries::new())
        .unwrap_err();

    assert!(matches!(err, TopicSyncError::Alter { .. }));
    assert!(err.to_string().contains("UnknownTopicOrPartition"));
}

#[test]
fn test_connect_skips_unreachable_brokers() {
    let broker = FakeBroker::start();

    let client = KafkaAdminClient::connect(&client_config(vec![closed_addr(), broker.addr()]));

    assert!(client.is_ok());
}

#[test]
fn test_connect_fails_when_no_broker_answers() {
    let err = KafkaAdminClient::connect(&client_config(vec![closed_addr(), closed_addr()]))
        .err()
        .unwrap();

    assert!(matches!(err, TopicSyncError::Connection(_)));
}

#[test]
fn test_connect_rejects_empty_broker_list() {
    let err = KafkaAdminClient::connect(&client_config(vec![]))
        .err()
        .unwrap();

    assert!(matches!(err, TopicSyncError::Connection(_)));
}

#[test]
fn test_create_goes_to_controller() {
    let controller = FakeBroker::start();
    let bootstrap = FakeBroker::start_with(BrokerState {
        controller: Some((2, controller.port)),
        ..BrokerState::default()
    });

    let mut client = KafkaAdminClient::connect(&client_config(vec![bootstrap.addr()])).unwrap();
    assert_eq!(client.controller_addr(), controller.addr());

    client
        .create_topic(&TopicSpec::new("orders", 3, 1))
        .unwrap();

    assert!(controller.topic("orders").is_some());
    assert!(bootstrap.topic("orders").is_none());
    assert!(!bootstrap
        .requests()
        .contains(&(ApiKey::CreateTopics as i16)));
}

#[test]
fn test_reconciler_over_the_wire() {
    let broker = FakeBroker::start()
        .with_topic("orders", 6)
        .with_topic("audit", 4);
    let client = KafkaAdminClient::connect(&client_config(vec![broker.addr()])).unwrap();
    let mut reconciler = Reconciler::new(client, ReconcileOptions::default());

    let report = reconciler
        .run(vec![
            RawTopicSpec::named("orders")
                .with_partitions(6)
                .with_config("retention.ms", "1000"),
            RawTopicSpec::named("payments").with_partitions(3),
        ])
        .unwrap();
    assert_eq!(report.updated(), vec!["orders"]);
    assert_eq!(report.created(), vec!["payments"]);
    assert_eq!(broker.topic("payments").unwrap().partitions, 3);

    let err = reconciler
        .run(vec![RawTopicSpec::named("audit").with_partitions(2)])
        .unwrap_err();
    assert!(matches!(
        err,
        TopicSyncError::ShrinkRejected { desired: 2, current: 4, .. }
    ));
}
