//! Protocol Module
//!
//! Defines the EPMD wire protocol for client-daemon communication.
//!
//! ## Request Format
//!
//! Every outbound request is preceded by a two-byte length field covering
//! the opcode and payload (the length field itself is not counted):
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Len (2)  │ Op (1)   │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Requests
//! - 120: ALIVE_REQ        - port (2) + node_type (1) + protocol (1) +
//!                           highest_version (2) + lowest_version (2) +
//!                           name_len (2) + name + extra_len (2) + extra
//! - 122: PORT_PLEASE2_REQ - name
//! - 110: NAMES_REQ        - empty
//! - 100: DUMP_REQ         - empty
//! - 107: KILL_REQ         - empty
//!
//! ## Response Format
//!
//! Responses are *not* length-framed. Typed responses carry an opcode:
//!
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Op (1)   │Result(1) │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! - 121: ALIVE_RESP - creation bytes
//! - 119: PORT2_RESP - port (2) + node_type (1) + protocol (1) +
//!                     highest_version (2) + lowest_version (2) +
//!                     name_len (2) + name + extra_len (2) + extra
//!
//! A nonzero result byte means the daemon rejected the request.
//!
//! NAMES/DUMP replies have no opcode at all: a raw 4-byte daemon port
//! followed by newline-delimited `name <name> at port <port>[, fd = <fd>]`
//! lines. Absence of a recognized leading opcode is what selects the text
//! branch of the decoder.

mod request;
mod response;
mod codec;

pub use request::{NodeType, ProtocolFamily, Request, RequestOp};
pub use response::{AliveAck, NodeInfo, NodeQueryResult, Response, ResponseOp};
pub use codec::{
    decode_response, encode_framed, encode_request, frame, ALIVE_RESP_LEN,
    FRAME_HEADER_SIZE, HIGHEST_VERSION, LOWEST_VERSION,
};
