//! Protocol codec
//!
//! Encoding and decoding functions for the EPMD wire protocol.
//!
//! ## Wire Format
//!
//! ### ALIVE_REQ
//! ```text
//! ┌───┬──────┬────────┬────────┬───────┬───────┬────┬──────┬────┬─────┐
//! │120│Port 2│NodeTy 1│Proto 1 │HiVer 2│LoVer 2│Nlen│ Name │Elen│Extra│
//! └───┴──────┴────────┴────────┴───────┴───────┴────┴──────┴────┴─────┘
//! ```
//!
//! ### PORT_PLEASE2_REQ
//! ```text
//! ┌───┬──────────┐
//! │122│ NodeName │
//! └───┴──────────┘
//! ```
//!
//! NAMES_REQ (110), DUMP_REQ (100) and KILL_REQ (107) are a bare opcode.
//!
//! ### PORT2_RESP
//! ```text
//! ┌───┬──────┬──────┬────────┬────────┬───────┬───────┬────┬──────┬────┬─────┐
//! │119│Result│Port 2│NodeTy 1│Proto 1 │HiVer 2│LoVer 2│Nlen│ Name │Elen│Extra│
//! └───┴──────┴──────┴────────┴────────┴───────┴───────┴────┴──────┴────┴─────┘
//! ```
//!
//! ### ALIVE_RESP
//! ```text
//! ┌───┬──────┬──────────┐
//! │121│Result│ Creation │
//! └───┴──────┴──────────┘
//! ```
//!
//! All integers are big-endian. Length fields count bytes, not characters.

use std::sync::OnceLock;

use bytes::Bytes;
use regex::Regex;

use crate::error::{EpmdError, Result};
use super::{AliveAck, NodeInfo, NodeQueryResult, NodeType, ProtocolFamily, Request, Response, ResponseOp};

/// Frame header size: the 2-byte big-endian length prefix on every request
pub const FRAME_HEADER_SIZE: usize = 2;

/// Fixed size of an ALIVE_RESP message: opcode, result, 2-byte creation
pub const ALIVE_RESP_LEN: usize = 4;

/// Highest protocol version this client speaks
pub const HIGHEST_VERSION: u16 = 5;

/// Lowest protocol version this client speaks
pub const LOWEST_VERSION: u16 = 5;

/// Fixed PORT2_RESP prefix: opcode through the name length field
const PORT2_RESP_HEADER_LEN: usize = 12;

// =============================================================================
// Request Encoding
// =============================================================================

/// Encode a request to bytes, without the length frame
///
/// Pure and total: any well-formed request encodes to its exact wire layout.
pub fn encode_request(request: &Request) -> Vec<u8> {
    let opcode = request.opcode() as u8;

    match request {
        Request::Alive { port, name } => {
            let name = name.as_bytes();
            let mut req = Vec::with_capacity(13 + name.len());
            req.push(opcode);
            req.extend_from_slice(&port.to_be_bytes());
            req.push(NodeType::Normal as u8);
            req.push(ProtocolFamily::Ipv4 as u8);
            req.extend_from_slice(&HIGHEST_VERSION.to_be_bytes());
            req.extend_from_slice(&LOWEST_VERSION.to_be_bytes());
            req.extend_from_slice(&(name.len() as u16).to_be_bytes());
            req.extend_from_slice(name);
            // Elen = 0, no extra bytes follow
            req.extend_from_slice(&0u16.to_be_bytes());
            req
        }
        Request::PortPlease { name } => {
            let name = name.as_bytes();
            let mut req = Vec::with_capacity(1 + name.len());
            req.push(opcode);
            req.extend_from_slice(name);
            req
        }
        Request::Names | Request::Dump | Request::Kill => vec![opcode],
    }
}

/// Wrap an encoded request with the 2-byte big-endian length frame
///
/// The length covers the request bytes only, not the frame header itself.
/// The daemon rejects or misreads anything sent unframed.
pub fn frame(request: &[u8]) -> Vec<u8> {
    let mut framed = Vec::with_capacity(FRAME_HEADER_SIZE + request.len());
    framed.extend_from_slice(&(request.len() as u16).to_be_bytes());
    framed.extend_from_slice(request);
    framed
}

/// Encode a request and apply the length frame in one step
pub fn encode_framed(request: &Request) -> Vec<u8> {
    frame(&encode_request(request))
}

// =============================================================================
// Response Decoding
// =============================================================================

/// Decode a complete response buffer
///
/// Dispatches on the first byte: a recognized response opcode selects the
/// typed decoders, anything else is treated as a newline-delimited node
/// listing. The buffer must hold the full logical message; the session
/// layer guarantees that by its read strategy.
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    match bytes.first().copied() {
        Some(op) if op == ResponseOp::Alive as u8 => decode_alive_resp(bytes),
        Some(op) if op == ResponseOp::Port2 as u8 => decode_port2_resp(bytes),
        _ => Ok(Response::Nodes(decode_node_lines(bytes))),
    }
}

/// Decode ALIVE_RESP: result byte, then the opaque creation token
fn decode_alive_resp(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < 2 {
        return Err(EpmdError::Decode(format!(
            "Incomplete ALIVE_RESP: expected at least 2 bytes, got {}",
            bytes.len()
        )));
    }

    let result = bytes[1];
    if result > 0 {
        return Err(EpmdError::Decode(format!(
            "Daemon rejected registration, result {result}"
        )));
    }

    Ok(Response::Alive(AliveAck {
        creation: Bytes::copy_from_slice(&bytes[2..]),
    }))
}

/// Decode PORT2_RESP into a node query result
fn decode_port2_resp(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < 2 {
        return Err(EpmdError::Decode(format!(
            "Incomplete PORT2_RESP: expected at least 2 bytes, got {}",
            bytes.len()
        )));
    }

    let result = bytes[1];
    if result > 0 {
        return Err(EpmdError::Decode(format!(
            "Daemon could not resolve node, result {result}"
        )));
    }

    if bytes.len() < PORT2_RESP_HEADER_LEN {
        return Err(EpmdError::Decode(format!(
            "Incomplete PORT2_RESP header: expected {} bytes, got {}",
            PORT2_RESP_HEADER_LEN,
            bytes.len()
        )));
    }

    let port = u16::from_be_bytes([bytes[2], bytes[3]]);
    let node_type = bytes[4];
    let protocol = bytes[5];
    let highest_version = u16::from_be_bytes([bytes[6], bytes[7]]);
    let lowest_version = u16::from_be_bytes([bytes[8], bytes[9]]);
    let name_len = u16::from_be_bytes([bytes[10], bytes[11]]) as usize;

    let name_end = PORT2_RESP_HEADER_LEN + name_len;
    if bytes.len() < name_end + 2 {
        return Err(EpmdError::Decode(format!(
            "Incomplete PORT2_RESP: name length {} exceeds payload ({} bytes)",
            name_len,
            bytes.len()
        )));
    }

    let name = std::str::from_utf8(&bytes[PORT2_RESP_HEADER_LEN..name_end])
        .map_err(|e| EpmdError::Decode(format!("Node name is not valid UTF-8: {e}")))?
        .to_string();

    // Elen is advisory; everything after it belongs to the extra field
    let extra = Bytes::copy_from_slice(&bytes[name_end + 2..]);

    // The advertised version range must overlap ours, in both directions
    if highest_version < LOWEST_VERSION {
        return Err(EpmdError::Decode(format!(
            "Daemon's highest protocol version {highest_version} is below our lowest {LOWEST_VERSION}"
        )));
    }
    if lowest_version > HIGHEST_VERSION {
        return Err(EpmdError::Decode(format!(
            "Daemon's lowest protocol version {lowest_version} is above our highest {HIGHEST_VERSION}"
        )));
    }

    Ok(Response::Node(NodeQueryResult {
        node_type,
        protocol,
        port,
        name,
        extra,
    }))
}

// =============================================================================
// Node-info Text Decoding
// =============================================================================

static NODE_LINE: OnceLock<Regex> = OnceLock::new();

/// Pattern for one NAMES/DUMP listing line:
/// `name <name> at port <port>[, fd = <fd>]`, case-insensitive
fn node_line_pattern() -> &'static Regex {
    NODE_LINE.get_or_init(|| {
        Regex::new(r"(?i).*name.*\W(?P<name>\w+)\W.*at port (?P<port>\d+)(?:, fd = (?P<fd>\d+))?.*")
            .expect("valid node-line pattern")
    })
}

/// Decode a NAMES_RESP/DUMP_RESP text payload into node-info records
///
/// The payload starts with the daemon's own port as 4 raw bytes, fused onto
/// the first text line; that prefix never matches the node-line pattern and
/// is dropped with every other unmatched line. Line order is preserved.
/// An empty or fully non-matching payload is an empty listing, not an error.
fn decode_node_lines(bytes: &[u8]) -> Vec<NodeInfo> {
    let text = String::from_utf8_lossy(bytes);
    text.split('\n').filter_map(parse_node_line).collect()
}

fn parse_node_line(line: &str) -> Option<NodeInfo> {
    let caps = node_line_pattern().captures(line)?;
    let name = caps.name("name")?.as_str().to_string();
    let port = caps.name("port")?.as_str().parse().ok()?;
    let fd = match caps.name("fd") {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };

    Some(NodeInfo { name, port, fd })
}
