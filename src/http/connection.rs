use std::io::ErrorKind;
use std::sync::Arc;
use std::time::Duration;

use bytes::{Buf, BytesMut};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::timeout;
use tracing::warn;

use crate::http::log::{self, RequestSummary};
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::dispatcher::Dispatcher;

/// Reasons a connection loop stops early.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("timed out waiting for request data")]
    ReadTimeout,
    #[error("connection closed in the middle of a request")]
    UnexpectedEof,
    #[error("HTTP parse error: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConnectionError {
    /// Whether this is ordinary client behaviour (idle timeout, hang-up)
    /// rather than something worth a warning.
    pub fn is_expected(&self) -> bool {
        match self {
            ConnectionError::ReadTimeout | ConnectionError::UnexpectedEof => true,
            ConnectionError::Io(e) => matches!(
                e.kind(),
                ErrorKind::ConnectionReset
                    | ErrorKind::ConnectionAborted
                    | ErrorKind::BrokenPipe
                    | ErrorKind::UnexpectedEof
            ),
            ConnectionError::Parse(_) => false,
        }
    }
}

/// One client connection, served one request at a time.
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    state: ConnectionState,
    dispatcher: Arc<Dispatcher>,
    read_timeout: Duration,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter, bool), // bool = keep_alive?
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, dispatcher: Arc<Dispatcher>, read_timeout: Duration) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(4096),
            state: ConnectionState::Reading,
            dispatcher,
            read_timeout,
        }
    }

    /// Serves requests until the client hangs up, asks to close, or an
    /// error ends the connection.
    pub async fn run(&mut self) -> Result<(), ConnectionError> {
        loop {
            self.state = match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => match self.read_request().await {
                    Ok(Some(req)) => ConnectionState::Processing(req),
                    Ok(None) => ConnectionState::Closed,
                    Err(ConnectionError::Parse(e)) => {
                        self.reject_malformed(&e).await;
                        return Err(e.into());
                    }
                    Err(e) => return Err(e),
                },

                ConnectionState::Processing(req) => {
                    log::request(&req);
                    let keep_alive = req.keep_alive();
                    let summary = RequestSummary::from(&req);

                    let mut response = self.dispatcher.dispatch(req).await;
                    if !keep_alive {
                        response.headers.set("Connection", "close");
                    }
                    log::response(&response, &summary);

                    let writer = self.prepare(response).await;
                    ConnectionState::Writing(writer, keep_alive)
                }

                ConnectionState::Writing(mut writer, keep_alive) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    if keep_alive {
                        ConnectionState::Reading // go back for next request
                    } else {
                        ConnectionState::Closed
                    }
                }

                ConnectionState::Closed => {
                    break;
                }
            };
        }

        Ok(())
    }

    /// Reads the next request.
    ///
    /// Returns `Ok(None)` if the client closed the connection between
    /// requests. Each socket read is bounded by the read timeout.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ConnectionError> {
        loop {
            // Try parsing whatever we already have
            match parse_http_request(&self.buffer) {
                Ok((request, consumed)) => {
                    self.buffer.advance(consumed);
                    return Ok(Some(request));
                }

                Err(ParseError::Incomplete) => {
                    // Need more data → fall through to read
                }

                Err(e) => return Err(e.into()),
            }

            let n = timeout(self.read_timeout, self.stream.read_buf(&mut self.buffer))
                .await
                .map_err(|_| ConnectionError::ReadTimeout)??;

            if n == 0 {
                if self.buffer.iter().all(u8::is_ascii_whitespace) {
                    // Client closed connection
                    return Ok(None);
                }
                return Err(ConnectionError::UnexpectedEof);
            }
        }
    }

    /// Prepares a response for writing, answering 404 when a file body
    /// has disappeared.
    async fn prepare(&self, response: Response) -> ResponseWriter {
        match ResponseWriter::new(&response).await {
            Ok(writer) => writer,
            Err(e) => {
                warn!(error = %e, body = ?response.body, "Response body unavailable");
                let mut fallback = Response::not_found();
                fallback.headers.merge(self.dispatcher.default_headers());
                ResponseWriter::buffered(&fallback)
            }
        }
    }

    /// Best-effort error response before a malformed request closes the
    /// connection: 431 or 413 for oversized requests, 400 otherwise.
    async fn reject_malformed(&mut self, err: &ParseError) {
        let status = match err {
            ParseError::HeadersTooLarge => StatusCode::RequestHeaderFieldsTooLarge,
            ParseError::BodyTooLarge => StatusCode::PayloadTooLarge,
            _ => StatusCode::BadRequest,
        };
        let mut response = Response::builder(status)
            .body(format!("{} {}", status.as_u16(), status.reason_phrase()))
            .build();
        response.headers.merge(self.dispatcher.default_headers());
        response.headers.set("Connection", "close");

        let _ = ResponseWriter::buffered(&response)
            .write_to_stream(&mut self.stream)
            .await;
    }
}
