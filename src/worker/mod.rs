//! Worker communication module.
//!
//! Database drivers live in an external worker process. This module talks
//! to it over NDJSON and exposes each worker session as a
//! [`Connection`](crate::executor::Connection).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 schemascope (Rust + Tokio)                      │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │  WorkerConnection (one session_id)                        │  │
//! │  │         │                                                 │  │
//! │  │  WorkerClient (async)                                     │  │
//! │  │  - Spawns worker as child process                         │  │
//! │  │  - Request IDs for concurrent request correlation         │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │               stdin (NDJSON) │ stdout (NDJSON)                  │
//! └──────────────────────────────┼──────────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │        Worker process (sessions → pinned DB connections)        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod client;
mod connection;
mod error;
pub mod protocol;

pub use client::{WorkerClient, DEFAULT_TIMEOUT_SECS};
pub use connection::WorkerConnection;
pub use error::{WorkerError, WorkerResult};
