//! Kafka request/response framing over a blocking TCP stream
//!
//! Every message on the wire is a big-endian `i32` size followed by a header
//! and a body. Header versions depend on whether the API version is
//! "flexible" (tagged fields), which this module resolves for the APIs
//! topicsync sends.

use crate::error::{Result, TopicSyncError};
use bytes::{BufMut, Bytes, BytesMut};
use kafka_protocol::messages::{ApiKey, RequestHeader, ResponseHeader};
use kafka_protocol::protocol::{Decodable, Encodable, StrBytes};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;
use tracing::trace;

/// Upper bound for a single response frame
const MAX_FRAME_BYTES: usize = 100 * 1024 * 1024;

/// First flexible version of an API, if topicsync knows it
fn first_flexible_version(api_key: ApiKey) -> Option<i16> {
    match api_key {
        ApiKey::ApiVersions => Some(3),
        ApiKey::Metadata => Some(9),
        ApiKey::CreateTopics => Some(5),
        ApiKey::AlterConfigs => Some(2),
        _ => None,
    }
}

fn is_flexible(api_key: ApiKey, api_version: i16) -> bool {
    first_flexible_version(api_key).is_some_and(|first| api_version >= first)
}

/// Request header version for an API key and version
pub fn request_header_version(api_key: ApiKey, api_version: i16) -> i16 {
    if is_flexible(api_key, api_version) {
        2
    } else {
        1
    }
}

/// Response header version for an API key and version.
///
/// ApiVersions always answers with header v0.
pub fn response_header_version(api_key: ApiKey, api_version: i16) -> i16 {
    match api_key {
        ApiKey::ApiVersions => 0,
        _ if is_flexible(api_key, api_version) => 1,
        _ => 0,
    }
}

/// Encode a size-prefixed request frame
pub fn encode_request<Req: Encodable>(
    api_key: ApiKey,
    api_version: i16,
    correlation_id: i32,
    client_id: &str,
    request: &Req,
) -> Result<BytesMut> {
    let header = RequestHeader::default()
        .with_request_api_key(api_key as i16)
        .with_request_api_version(api_version)
        .with_correlation_id(correlation_id)
        .with_client_id(Some(StrBytes::from_string(client_id.to_string())));

    let mut body = BytesMut::new();
    header
        .encode(&mut body, request_header_version(api_key, api_version))
        .map_err(|e| TopicSyncError::protocol("encode header", e))?;
    request
        .encode(&mut body, api_version)
        .map_err(|e| TopicSyncError::protocol("encode request", e))?;

    let mut frame = BytesMut::with_capacity(4 + body.len());
    frame.put_i32(body.len() as i32);
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Decode a response frame body (size prefix already stripped), checking the
/// correlation id
pub fn decode_response<Resp: Decodable>(
    api_key: ApiKey,
    api_version: i16,
    expected_correlation_id: i32,
    body: Bytes,
) -> Result<Resp> {
    let mut buf = body;
    let header = ResponseHeader::decode(&mut buf, response_header_version(api_key, api_version))
        .map_err(|e| TopicSyncError::protocol("decode header", e))?;
    if header.correlation_id != expected_correlation_id {
        return Err(TopicSyncError::protocol(
            "decode header",
            format!(
                "correlation id mismatch: expected {}, got {}",
                expected_correlation_id, header.correlation_id
            ),
        ));
    }
    Resp::decode(&mut buf, api_version).map_err(|e| TopicSyncError::protocol("decode response", e))
}

/// Read one size-prefixed frame and return its body
pub fn read_frame<R: Read>(reader: &mut R) -> Result<Bytes> {
    let mut len_buf = [0u8; 4];
    reader.read_exact(&mut len_buf)?;
    let len = i32::from_be_bytes(len_buf);
    let len = usize::try_from(len)
        .ok()
        .filter(|l| *l <= MAX_FRAME_BYTES)
        .ok_or_else(|| {
            TopicSyncError::protocol("read frame", format!("invalid frame size {}", len))
        })?;

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok(Bytes::from(body))
}

/// Socket settings shared by every broker connection
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub client_id: String,
    pub connect_timeout: Duration,
    /// Read/write timeout; zero means block indefinitely
    pub request_timeout: Duration,
}

/// One blocking connection to one broker
pub struct BrokerConnection {
    stream: TcpStream,
    addr: String,
    correlation_id: i32,
    client_id: String,
}

impl BrokerConnection {
    /// Resolve `host:port` and connect to the first address that accepts
    pub fn connect(addr: &str, settings: &ConnectionSettings) -> Result<Self> {
        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|e| {
                TopicSyncError::connection(format!("Couldn't resolve broker {}: {}", addr, e))
            })?
            .collect();

        let mut last_error = None;
        for candidate in &candidates {
            match TcpStream::connect_timeout(candidate, settings.connect_timeout) {
                Ok(stream) => {
                    let timeout =
                        (!settings.request_timeout.is_zero()).then_some(settings.request_timeout);
                    stream.set_read_timeout(timeout)?;
                    stream.set_write_timeout(timeout)?;
                    stream.set_nodelay(true)?;
                    trace!(broker = addr, socket = %candidate, "Connected to broker");
                    return Ok(Self {
                        stream,
                        addr: addr.to_string(),
                        correlation_id: 0,
                        client_id: settings.client_id.clone(),
                    });
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(TopicSyncError::connection(format!(
            "Couldn't connect to kafka broker {}: {}",
            addr,
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    /// Send one request and wait for its response
    pub fn send_request<Req: Encodable, Resp: Decodable>(
        &mut self,
        api_key: ApiKey,
        api_version: i16,
        request: &Req,
    ) -> Result<Resp> {
        self.correlation_id = self.correlation_id.wrapping_add(1);

        let frame = encode_request(
            api_key,
            api_version,
            self.correlation_id,
            &self.client_id,
            request,
        )?;
        self.stream.write_all(&frame)?;
        self.stream.flush()?;

        let body = read_frame(&mut self.stream)?;
        trace!(
            broker = %self.addr,
            api_key = ?api_key,
            api_version,
            bytes = body.len(),
            "Received response"
        );
        decode_response(api_key, api_version, self.correlation_id, body)
    }
}
