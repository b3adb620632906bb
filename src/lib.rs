//! # epmd-client
//!
//! A client for the Erlang Port Mapper Daemon (EPMD) wire protocol:
//! - Node registration (ALIVE_REQ) with a long-lived keepalive socket
//! - Name-to-port resolution (PORT_PLEASE2_REQ)
//! - Node listing and dumping (NAMES_REQ / DUMP_REQ)
//! - Daemon shutdown (KILL_REQ)
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   One-shot query facade                      │
//! │        (resolve_node / node_names / dump_nodes)              │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Connection                              │
//! │        (one TcpStream, one exchange, state machine)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │          │   Decoder   │
//!   │  (framing)  │          │ (responses) │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! Every request travels as `[2-byte length][opcode + payload]`. Responses
//! are not length-framed: typed responses arrive as `[opcode][payload]`,
//! and NAMES/DUMP replies are plain text preceded by the daemon's own port.
//!
//! The protocol allows at most one request/response exchange per socket,
//! except for the registration socket, which stays open as a liveness
//! signal: the daemon treats its closure as deregistration. The
//! [`client::Connection`] state machine enforces that discipline.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{EpmdError, Result};
pub use config::{Config, DEFAULT_EPMD_PORT};
pub use protocol::{AliveAck, NodeInfo, NodeQueryResult, Request, Response};
pub use client::{dump_nodes, node_names, resolve_node, Connection};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of epmd-client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
