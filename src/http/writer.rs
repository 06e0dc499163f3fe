use std::path::PathBuf;

use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::Headers;
use crate::http::response::{Body, Response, StatusCode};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes the status line and headers.
///
/// Any caller-supplied `Content-Length` is replaced by `content_length`.
pub fn serialize_head(status: StatusCode, headers: &Headers, content_length: u64) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in headers.iter() {
        if k.eq_ignore_ascii_case("Content-Length") {
            continue;
        }
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
    buf.extend_from_slice(format!("Content-Length: {}\r\n", content_length).as_bytes());

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Serializes an in-memory response in full.
///
/// File bodies are not read; only their head is produced, with a length of 0.
pub fn serialize_response(resp: &Response) -> Vec<u8> {
    let body = resp.body.as_bytes();
    let mut buf = serialize_head(resp.status, &resp.headers, body.len() as u64);

    // Body
    buf.extend_from_slice(body);

    buf
}

enum PendingBody {
    Bytes(Bytes),
    File { path: PathBuf, len: u64 },
}

/// A response with its head already serialized, ready to be written.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: PendingBody,
}

impl ResponseWriter {
    /// Prepares `response` for sending, computing its `Content-Length`.
    ///
    /// For file bodies the length comes from the file's metadata, which
    /// fails if the file cannot be found.
    pub async fn new(response: &Response) -> std::io::Result<Self> {
        let (len, body) = match &response.body {
            Body::Bytes(bytes) => (bytes.len() as u64, PendingBody::Bytes(bytes.clone())),
            Body::File(path) => {
                let len = tokio::fs::metadata(path).await?.len();
                (len, PendingBody::File { path: path.clone(), len })
            }
        };

        Ok(Self {
            head: serialize_head(response.status, &response.headers, len),
            body,
        })
    }

    /// Prepares an in-memory response; a file body is sent as empty.
    pub fn buffered(response: &Response) -> Self {
        let body = Bytes::copy_from_slice(response.body.as_bytes());
        Self {
            head: serialize_head(response.status, &response.headers, body.len() as u64),
            body: PendingBody::Bytes(body),
        }
    }

    /// Writes the head and then the body, returning the body bytes sent.
    ///
    /// File bodies are streamed after the head has been flushed, without
    /// loading the whole file into memory. There is no zero-copy `sendfile`
    /// path; the file goes through `tokio::io::copy`'s buffer on every
    /// platform.
    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> std::io::Result<u64>
    where
        W: AsyncWrite + Unpin,
    {
        stream.write_all(&self.head).await?;

        let sent = match &self.body {
            PendingBody::Bytes(bytes) => {
                stream.write_all(bytes).await?;
                bytes.len() as u64
            }
            PendingBody::File { path, len } => {
                stream.flush().await?;
                let file = tokio::fs::File::open(path).await?;
                let mut reader = tokio::io::AsyncReadExt::take(file, *len);
                tokio::io::copy(&mut reader, stream).await?
            }
        };

        stream.flush().await?;
        Ok(sent)
    }
}
