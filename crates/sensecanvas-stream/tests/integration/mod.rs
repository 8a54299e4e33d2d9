//! Integration tests for sensecanvas-stream.
//!
//! These tests drive the stream client against a local WebSocket server.

pub mod common;
