use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{LineEnding, Response};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Turns a response into wire bytes.
///
/// No headers are added beyond the ones on `resp`.
pub fn serialize_response(resp: &Response, line_ending: LineEnding) -> Vec<u8> {
    let eol = line_ending.as_bytes();
    let mut buf = Vec::with_capacity(64 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());
    buf.extend_from_slice(eol);

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(eol);
    }

    // Header/body separator
    buf.extend_from_slice(eol);

    // Body
    buf.extend_from_slice(&resp.body);

    buf
}

pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
}

impl ResponseWriter {
    pub fn new(response: &Response, line_ending: LineEnding) -> Self {
        Self {
            buffer: serialize_response(response, line_ending),
            written: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes still waiting to go out.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.written
    }

    /// Writes the whole buffer, retrying short writes.
    ///
    /// A write that reports an error or accepts zero bytes aborts.
    pub async fn write_to<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
