//! Transport: listening socket setup and accept loops.

pub mod listener;

pub use listener::{bind, run, serve_forever, serve_once};
