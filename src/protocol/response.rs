//! Response definitions
//!
//! Represents responses received from the daemon.

use bytes::Bytes;
use serde::Serialize;

/// Response opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ResponseOp {
    Port2 = 119,
    Alive = 121,
}

/// Acknowledgment of a successful registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliveAck {
    /// Opaque token the daemon assigns to this incarnation of the name,
    /// used to tell restarts of the same node apart
    pub creation: Bytes,
}

/// The daemon's answer to "who listens under this name"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeQueryResult {
    /// Node type tag (77 = normal, 72 = hidden)
    pub node_type: u8,

    /// Protocol family tag (0 = IPv4)
    pub protocol: u8,

    /// Port the node listens on
    pub port: u16,

    /// Registered node name
    pub name: String,

    /// Opaque trailing bytes
    pub extra: Bytes,
}

/// One entry of a NAMES or DUMP listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeInfo {
    /// Registered node name
    pub name: String,

    /// Port the node listens on
    pub port: u16,

    /// Daemon-internal file descriptor; present only in DUMP listings
    pub fd: Option<u32>,
}

/// A decoded response
///
/// Closed over everything the daemon can send back: the registration
/// acknowledgment, a single node query answer, or a node listing parsed
/// from a NAMES/DUMP text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// ALIVE_RESP with a zero result byte
    Alive(AliveAck),

    /// PORT2_RESP with a zero result byte
    Node(NodeQueryResult),

    /// Newline-delimited node-info listing
    Nodes(Vec<NodeInfo>),
}
