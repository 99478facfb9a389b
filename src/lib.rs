//! dfa-httpd - minimal file server
//!
//! Core library for request recognition, file responses and the accept loop.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
