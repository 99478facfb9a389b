//! HTTP protocol implementation.
//!
//! Just enough HTTP/1.1 to hand out files: one request per connection, GET
//! only, and nothing past the request line is interpreted.
//!
//! # Architecture
//!
//! - **`dfa`**: transition table recognizing `GET ` and the resource after it
//! - **`parser`**: runs the table over request bytes, finds the header terminator
//! - **`request`**: turns the extracted resource into a path below the serving root
//! - **`response`**: status codes, response assembly, file loading
//! - **`writer`**: serializes responses and flushes them through short writes
//! - **`connection`**: the per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌──────────────────┐
//!        │ AwaitingHeaders  │ ← read until \r\n\r\n
//!        └──────┬───────────┘
//!               │ terminator seen
//!               ▼
//!        ┌──────────────────┐
//!        │ HeadersComplete  │ ← resource extracted and normalized
//!        └──────┬───────────┘
//!               │ 200 or 404 written
//!               ▼
//!        ┌──────────────────┐
//!        │  ResponseSent    │
//!        └──────┬───────────┘
//!               ▼
//!            Closed          ← reached on every path, errors included
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use dfa_httpd::config::Config;
//! use dfa_httpd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let (socket, _addr) = listener.accept().await?;
//!     let mut conn = Connection::new(socket, Arc::new(Config::default()));
//!     conn.run().await?;
//!     Ok(())
//! }
//! ```

pub mod connection;
pub mod dfa;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
