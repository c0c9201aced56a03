//! Client for the event store's Streams gRPC API.
//!
//! Connection strings follow the `esdb://` scheme the store's own tooling
//! uses. Only plaintext connections are supported: a string that asks for
//! TLS, explicitly or by omission, is rejected before any dialing happens.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::uri::PathAndQuery;
use tonic::Request;
use tracing::{debug, info};
use uuid::Uuid;

use crate::proto;

/// Port an out-of-the-box event store listens on.
const DEFAULT_PORT: u16 = 2113;

/// Full RPC path of the Streams append call.
const APPEND_RPC: &str = "/event_store.client.streams.Streams/Append";

/// Errors produced by [`KurrentClient`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The connection string did not use the `esdb://` scheme.
    #[error("unsupported connection scheme in: {0}")]
    Scheme(String),
    /// The connection string named no host.
    #[error("connection string names no host")]
    MissingAuthority,
    /// The connection string's port was not a number.
    #[error("invalid port in connection string: {0}")]
    InvalidPort(String),
    /// The connection string requires TLS, which this client does not speak.
    #[error("TLS is not supported, disable it with tls=false")]
    TlsUnsupported,
    /// The assembled endpoint was not a valid URI.
    #[error("invalid endpoint URI: {0}")]
    Uri(#[from] http::uri::InvalidUri),
    /// gRPC transport error
    #[error("gRPC transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
    /// The remote RPC endpoint returned an error.
    #[error("RPC endpoint error: {0}")]
    Rpc(#[from] tonic::Status),
    /// The server rejected the append's revision expectation.
    #[error("wrong expected version appending to stream {stream}")]
    WrongExpectedVersion {
        /// The stream appended to.
        stream: String,
    },
    /// The server answered the append without a verdict.
    #[error("append response carried no result")]
    EmptyAppendResult,
}

/// A parsed `esdb://` connection string.
///
/// Only the pieces this tool acts on are retained: the endpoint authority
/// and whether the server expects TLS. Unrecognized options are logged at
/// debug level and ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionString {
    /// Host the event store listens on.
    pub host: String,
    /// Port the event store listens on.
    pub port: u16,
    /// Whether the server expects TLS. Absent an explicit `tls=false`
    /// option this is true, exactly as the server defaults.
    pub tls: bool,
}

impl ConnectionString {
    /// The plaintext URI handed to the transport.
    #[must_use]
    pub fn endpoint_uri(&self) -> String {
        format!("http://{host}:{port}", host = self.host, port = self.port)
    }
}

impl FromStr for ConnectionString {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix("esdb://")
            .ok_or_else(|| Error::Scheme(s.to_string()))?;

        let (authority, options) = match rest.split_once('?') {
            Some((authority, options)) => (authority, Some(options)),
            None => (rest, None),
        };
        if authority.is_empty() {
            return Err(Error::MissingAuthority);
        }

        let (host, port) = match authority.split_once(':') {
            Some((host, port)) => (
                host,
                port.parse::<u16>()
                    .map_err(|_| Error::InvalidPort(port.to_string()))?,
            ),
            None => (authority, DEFAULT_PORT),
        };
        if host.is_empty() {
            return Err(Error::MissingAuthority);
        }

        let mut tls = true;
        for option in options
            .unwrap_or_default()
            .split('&')
            .filter(|option| !option.is_empty())
        {
            let (key, value) = option.split_once('=').unwrap_or((option, ""));
            if key.eq_ignore_ascii_case("tls") {
                tls = !value.eq_ignore_ascii_case("false");
            } else {
                debug!("ignoring connection string option: {key}");
            }
        }

        Ok(Self {
            host: host.to_string(),
            port,
            tls,
        })
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{host}:{port}", host = self.host, port = self.port)
    }
}

/// Destination for encoded events.
///
/// [`KurrentClient`] is the production implementation. Tests substitute
/// their own to observe the publish loop without a server behind it.
#[allow(async_fn_in_trait)]
pub trait EventSink {
    /// Append one event of `event_type` to `stream`.
    ///
    /// # Errors
    ///
    /// Implementations return an error when the event was not durably
    /// appended.
    async fn append(&mut self, stream: &str, event_type: &str, data: Vec<u8>) -> Result<(), Error>;
}

/// A minimal event store client speaking the Streams gRPC protocol.
pub struct KurrentClient {
    client: tonic::client::Grpc<tonic::transport::Channel>,
}

impl KurrentClient {
    /// Parse `connection_string` and establish the gRPC channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string cannot be parsed, if it
    /// requires TLS or if the endpoint cannot be dialed.
    pub async fn connect(connection_string: &str) -> Result<Self, Error> {
        let parsed: ConnectionString = connection_string.parse()?;
        if parsed.tls {
            return Err(Error::TlsUnsupported);
        }

        let uri: http::Uri = parsed.endpoint_uri().parse()?;
        let endpoint = tonic::transport::Endpoint::new(uri)?;
        let endpoint = endpoint.connect_timeout(Duration::from_secs(1));
        let conn = endpoint.connect().await?;

        info!("connected to event store at {parsed}");

        Ok(Self {
            client: tonic::client::Grpc::new(conn),
        })
    }

    /// Build one append call's frames.
    ///
    /// The append protocol is client-streaming: an options frame naming the
    /// stream, then one frame per event. Events are published one per call,
    /// so every call carries exactly two frames.
    fn append_frames(stream: &str, event_type: &str, data: Vec<u8>) -> [proto::AppendReq; 2] {
        let options = proto::AppendReq {
            content: Some(proto::append_req::Content::Options(
                proto::append_req::Options {
                    stream_identifier: Some(proto::StreamIdentifier {
                        stream_name: stream.as_bytes().to_vec(),
                    }),
                    expected_stream_revision: Some(
                        proto::append_req::options::ExpectedStreamRevision::Any(proto::Empty {}),
                    ),
                },
            )),
        };
        let message = proto::AppendReq {
            content: Some(proto::append_req::Content::ProposedMessage(
                proto::append_req::ProposedMessage {
                    id: Some(proto::Uuid {
                        value: Some(proto::uuid::Value::String(Uuid::new_v4().to_string())),
                    }),
                    metadata: HashMap::from([
                        ("type".to_string(), event_type.to_string()),
                        ("content-type".to_string(), "application/json".to_string()),
                    ]),
                    custom_metadata: Vec::new(),
                    data,
                },
            )),
        };
        [options, message]
    }
}

impl EventSink for KurrentClient {
    async fn append(&mut self, stream: &str, event_type: &str, data: Vec<u8>) -> Result<(), Error> {
        self.client.ready().await.map_err(|e| {
            tonic::Status::new(tonic::Code::Unknown, format!("Service was not ready: {e}"))
        })?;

        let frames = Self::append_frames(stream, event_type, data);
        let response = self
            .client
            .client_streaming(
                Request::new(futures::stream::iter(frames)),
                PathAndQuery::from_static(APPEND_RPC),
                tonic::codec::ProstCodec::<proto::AppendReq, proto::AppendResp>::default(),
            )
            .await?;

        match response.into_inner().result {
            Some(proto::append_resp::Result::Success(_)) => Ok(()),
            Some(proto::append_resp::Result::WrongExpectedVersion(_)) => {
                Err(Error::WrongExpectedVersion {
                    stream: stream.to_string(),
                })
            }
            None => Err(Error::EmptyAppendResult),
        }
    }
}

impl fmt::Debug for KurrentClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KurrentClient").finish_non_exhaustive()
    }
}
