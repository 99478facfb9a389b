use std::fmt;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::Config;
use crate::http::dfa::TransitionTable;
use crate::http::parser::{extract_resource, find_headers_end, HEADERS_TERMINATOR};
use crate::http::request::ResolvedPath;
use crate::http::response::{self, Outcome};
use crate::http::writer::ResponseWriter;

/// Bytes requested from the socket per read call.
pub const READ_CHUNK: usize = 1024;

/// Why a connection was abandoned before a response went out in full.
#[derive(Debug)]
pub enum ConnectionError {
    /// No connection could be accepted.
    Accept(io::Error),
    /// Peer closed before sending `\r\n\r\n`.
    ClosedBeforeHeaders,
    /// Request head grew past the configured limit.
    RequestTooLarge(usize),
    /// A read blocked longer than the configured timeout.
    ReadTimeout(Duration),
    /// Reading failed.
    Io(io::Error),
    /// Writing the response failed.
    Write(anyhow::Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::Accept(e) => write!(f, "accept failed: {}", e),
            ConnectionError::ClosedBeforeHeaders => {
                write!(f, "connection closed before end of headers")
            }
            ConnectionError::RequestTooLarge(limit) => {
                write!(f, "request head exceeds {} bytes", limit)
            }
            ConnectionError::ReadTimeout(d) => write!(f, "no data received for {:?}", d),
            ConnectionError::Io(e) => write!(f, "read failed: {}", e),
            ConnectionError::Write(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl std::error::Error for ConnectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectionError::Accept(e) | ConnectionError::Io(e) => Some(e),
            ConnectionError::Write(e) => Some(&**e),
            _ => None,
        }
    }
}

impl From<io::Error> for ConnectionError {
    fn from(e: io::Error) -> Self {
        ConnectionError::Io(e)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingHeaders,
    HeadersComplete(Option<ResolvedPath>),
    ResponseSent(Outcome),
    Closed,
}

/// One client, handled once: accumulate, parse, respond, close.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    config: Arc<Config>,
    table: &'static TransitionTable,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: Arc<Config>) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
            state: ConnectionState::AwaitingHeaders,
            config,
            table: TransitionTable::shared(),
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Drives the connection to completion.
    ///
    /// The stream is shut down before this returns, whether or not the
    /// exchange succeeded.
    pub async fn run(&mut self) -> Result<Outcome, ConnectionError> {
        let result = self.drive().await;
        self.close().await;
        result
    }

    async fn drive(&mut self) -> Result<Outcome, ConnectionError> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::AwaitingHeaders => {
                    let path = self.read_request().await?;
                    ConnectionState::HeadersComplete(path)
                }

                ConnectionState::HeadersComplete(path) => {
                    let outcome = self.respond(path.as_ref()).await?;
                    ConnectionState::ResponseSent(outcome)
                }

                ConnectionState::ResponseSent(outcome) => {
                    self.state = ConnectionState::ResponseSent(outcome);
                    return Ok(outcome);
                }

                ConnectionState::Closed => {
                    return Err(ConnectionError::Io(io::Error::new(
                        io::ErrorKind::NotConnected,
                        "connection already closed",
                    )));
                }
            };
        }
    }

    /// Reads until the end-of-headers marker and resolves the requested path.
    async fn read_request(&mut self) -> Result<Option<ResolvedPath>, ConnectionError> {
        let max_bytes = self.config.limits.max_request_bytes;
        let read_timeout = self.config.limits.read_timeout();
        let mut temp = [0u8; READ_CHUNK];
        let mut scanned: usize = 0;

        let headers_end = loop {
            // Resume the search a few bytes back in case the marker straddles reads
            let from = scanned.saturating_sub(HEADERS_TERMINATOR.len() - 1);
            if let Some(pos) = find_headers_end(&self.buffer[from..]) {
                break from + pos;
            }
            scanned = self.buffer.len();

            if self.buffer.len() >= max_bytes {
                return Err(ConnectionError::RequestTooLarge(max_bytes));
            }

            let n = match read_timeout {
                Some(limit) => tokio::time::timeout(limit, self.stream.read(&mut temp))
                    .await
                    .map_err(|_| ConnectionError::ReadTimeout(limit))??,
                None => self.stream.read(&mut temp).await?,
            };

            if n == 0 {
                return Err(ConnectionError::ClosedBeforeHeaders);
            }

            self.buffer.extend_from_slice(&temp[..n]);
        };

        let head = self.buffer.split_to(headers_end);
        self.buffer.clear();

        let resource = extract_resource(self.table, &head);
        let path = ResolvedPath::normalize(&resource, &self.config.files.default_document);

        tracing::debug!(
            resource = %resource,
            path = ?path.as_ref().map(ResolvedPath::as_str),
            head_bytes = head.len(),
            "Request received"
        );

        Ok(path)
    }

    async fn respond(&mut self, path: Option<&ResolvedPath>) -> Result<Outcome, ConnectionError> {
        let files = &self.config.files;
        let responded = response::load(&files.root, path, files.confine_to_root).await;

        let mut writer = ResponseWriter::new(&responded.response, self.config.wire.line_ending);
        writer
            .write_to(&mut self.stream)
            .await
            .map_err(ConnectionError::Write)?;

        tracing::info!(
            path = path.map(ResolvedPath::as_str).unwrap_or(""),
            status = responded.response.status.as_u16(),
            bytes = writer.len(),
            "Response sent"
        );

        Ok(responded.outcome)
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.shutdown().await {
            tracing::debug!(error = %e, "Shutdown after exchange failed");
        }
        self.state = ConnectionState::Closed;
    }
}
