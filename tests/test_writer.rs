//! Tests for response flushing over transports that accept few bytes per write

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use dfa_httpd::http::response::{LineEnding, Response};
use dfa_httpd::http::writer::{serialize_response, ResponseWriter};
use tokio::io::AsyncWrite;

/// Accepts at most `per_write` bytes per call and records what it got.
struct TrickleWriter {
    per_write: usize,
    written: Vec<u8>,
    calls: usize,
}

impl TrickleWriter {
    fn new(per_write: usize) -> Self {
        Self {
            per_write,
            written: Vec::new(),
            calls: 0,
        }
    }
}

impl AsyncWrite for TrickleWriter {
    fn poll_write(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let n = buf.len().min(self.per_write);
        self.written.extend_from_slice(&buf[..n]);
        self.calls += 1;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Fails every write.
struct BrokenWriter;

impl AsyncWrite for BrokenWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone")))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

#[tokio::test]
async fn test_short_writes_deliver_everything() {
    let response = Response::ok_html(b"<html>some longer body</html>".to_vec());
    let expected = serialize_response(&response, LineEnding::Lf);
    let mut sink = TrickleWriter::new(3);

    let mut writer = ResponseWriter::new(&response, LineEnding::Lf);
    writer.write_to(&mut sink).await.unwrap();

    assert_eq!(sink.written, expected);
    assert_eq!(sink.calls, expected.len().div_ceil(3));
    assert_eq!(writer.remaining(), 0);
}

#[tokio::test]
async fn test_single_byte_writes() {
    let response = Response::not_found();
    let mut sink = TrickleWriter::new(1);

    let mut writer = ResponseWriter::new(&response, LineEnding::Lf);
    writer.write_to(&mut sink).await.unwrap();

    assert_eq!(
        sink.written,
        b"HTTP/1.1 404 Not Found\n\n<b>404 Error - resource not found on this server</b>\n".to_vec()
    );
}

#[tokio::test]
async fn test_zero_length_write_aborts() {
    let response = Response::ok_html("hi");
    let mut sink = TrickleWriter::new(0);

    let mut writer = ResponseWriter::new(&response, LineEnding::Lf);
    let result = writer.write_to(&mut sink).await;

    assert!(result.is_err());
    assert_eq!(writer.remaining(), writer.len());
}

#[tokio::test]
async fn test_write_error_aborts() {
    let response = Response::ok_html("hi");
    let mut writer = ResponseWriter::new(&response, LineEnding::Lf);

    let err = writer.write_to(&mut BrokenWriter).await.unwrap_err();

    assert!(err.to_string().contains("peer gone"));
}

#[test]
fn test_writer_length_matches_serialized_response() {
    let response = Response::ok_html("abc");
    let writer = ResponseWriter::new(&response, LineEnding::Crlf);

    assert_eq!(writer.len(), serialize_response(&response, LineEnding::Crlf).len());
    assert!(!writer.is_empty());
}
