//! Decoder Tests
//!
//! Tests for response decoding: typed responses, node listings, and the
//! failure modes.

use epmd_client::protocol::{decode_response, Response};
use epmd_client::EpmdError;

// =============================================================================
// Test Helpers
// =============================================================================

fn alive_resp(result: u8) -> Vec<u8> {
    let mut buf = vec![121, result];
    buf.extend_from_slice(&1u16.to_be_bytes());
    buf
}

fn port2_resp(result: u8, name: &str, port: u16, highest: u16, lowest: u16) -> Vec<u8> {
    let mut buf = vec![119, result];
    buf.extend_from_slice(&port.to_be_bytes());
    buf.push(77); // normal node
    buf.push(0); // IPv4
    buf.extend_from_slice(&highest.to_be_bytes());
    buf.extend_from_slice(&lowest.to_be_bytes());
    buf.extend_from_slice(&(name.len() as u16).to_be_bytes());
    buf.extend_from_slice(name.as_bytes());
    buf.extend_from_slice(&0u16.to_be_bytes());
    buf
}

// =============================================================================
// ALIVE_RESP Tests
// =============================================================================

#[test]
fn test_decode_alive_ok() {
    let buf = alive_resp(0);
    let decoded = decode_response(&buf).unwrap();

    match decoded {
        Response::Alive(ack) => assert_eq!(&ack.creation[..], &buf[2..]),
        _ => panic!("Expected registration ack"),
    }
}

#[test]
fn test_decode_alive_error_result() {
    let buf = alive_resp(1);
    let result = decode_response(&buf);

    assert!(matches!(result, Err(EpmdError::Decode(_))));
}

#[test]
fn test_decode_alive_truncated() {
    let result = decode_response(&[121]);

    assert!(matches!(result, Err(EpmdError::Decode(_))));
}

// =============================================================================
// PORT2_RESP Tests
// =============================================================================

#[test]
fn test_decode_port2_ok() {
    let buf = port2_resp(0, "testing", 1337, 5, 5);
    let decoded = decode_response(&buf).unwrap();

    match decoded {
        Response::Node(node) => {
            assert_eq!(node.node_type, 77);
            assert_eq!(node.protocol, 0);
            assert_eq!(node.port, 1337);
            assert_eq!(node.name, "testing");
            assert!(node.extra.is_empty());
        }
        _ => panic!("Expected node query result"),
    }
}

#[test]
fn test_decode_port2_trailing_extra_bytes() {
    let mut buf = port2_resp(0, "testing", 1337, 5, 5);
    buf.extend_from_slice(&[0xAA, 0xBB, 0xCC]);
    let decoded = decode_response(&buf).unwrap();

    match decoded {
        Response::Node(node) => assert_eq!(&node.extra[..], &[0xAA, 0xBB, 0xCC]),
        _ => panic!("Expected node query result"),
    }
}

#[test]
fn test_decode_port2_error_result() {
    let buf = port2_resp(1, "testing", 1337, 5, 5);
    let result = decode_response(&buf);

    assert!(matches!(result, Err(EpmdError::Decode(_))));
}

#[test]
fn test_decode_port2_highest_version_below_ours() {
    let buf = port2_resp(0, "testing", 1337, 0, 5);
    let result = decode_response(&buf);

    assert!(matches!(result, Err(EpmdError::Decode(_))));
}

#[test]
fn test_decode_port2_lowest_version_above_ours() {
    let buf = port2_resp(0, "testing", 1337, 5, 10);
    let result = decode_response(&buf);

    assert!(matches!(result, Err(EpmdError::Decode(_))));
}

#[test]
fn test_decode_port2_truncated_name() {
    let mut buf = port2_resp(0, "testing", 1337, 5, 5);
    // Cut into the name bytes so the declared length overruns the payload
    buf.truncate(14);
    let result = decode_response(&buf);

    assert!(matches!(result, Err(EpmdError::Decode(_))));
}

// =============================================================================
// Node Listing Tests
// =============================================================================

fn expect_nodes(buf: &[u8]) -> Vec<epmd_client::NodeInfo> {
    match decode_response(buf).unwrap() {
        Response::Nodes(nodes) => nodes,
        other => panic!("Expected node listing, got {other:?}"),
    }
}

#[test]
fn test_decode_names_single_node() {
    let nodes = expect_nodes(b"name test at port 342");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "test");
    assert_eq!(nodes[0].port, 342);
    assert_eq!(nodes[0].fd, None);
}

#[test]
fn test_decode_names_three_nodes_in_order() {
    let nodes =
        expect_nodes(b"name test at port 342\nname llool at port 456\nname hehehe at port 596");

    assert_eq!(nodes.len(), 3);
    assert_eq!((nodes[0].name.as_str(), nodes[0].port), ("test", 342));
    assert_eq!((nodes[1].name.as_str(), nodes[1].port), ("llool", 456));
    assert_eq!((nodes[2].name.as_str(), nodes[2].port), ("hehehe", 596));
    assert!(nodes.iter().all(|n| n.fd.is_none()));
}

#[test]
fn test_decode_dump_single_node_with_fd() {
    let nodes = expect_nodes(b"name test at port 342, fd = 5");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "test");
    assert_eq!(nodes[0].port, 342);
    assert_eq!(nodes[0].fd, Some(5));
}

#[test]
fn test_decode_dump_three_nodes_with_fds() {
    let nodes = expect_nodes(
        b"name test at port 342, fd = 5\nname llool at port 456, fd = 6\nname hehehe at port 596, fd = 17",
    );

    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].fd, Some(5));
    assert_eq!(nodes[1].fd, Some(6));
    assert_eq!(nodes[2].fd, Some(17));
}

#[test]
fn test_decode_names_daemon_port_prefix_is_skipped() {
    // A real NAMES_RESP opens with the daemon's port as 4 raw bytes fused
    // onto the first line
    let mut buf = vec![0x00, 0x00, 0x11, 0x11];
    buf.extend_from_slice(b"name test at port 342\nname other at port 400");
    let nodes = expect_nodes(&buf);

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].name, "test");
    assert_eq!(nodes[1].name, "other");
}

#[test]
fn test_decode_unmatched_lines_are_ignored() {
    let nodes = expect_nodes(b"kernel poll: false\nname test at port 342\nnothing here");

    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].name, "test");
}

#[test]
fn test_decode_empty_payload_is_empty_listing() {
    let nodes = expect_nodes(b"");

    assert!(nodes.is_empty());
}

#[test]
fn test_decode_kill_ok_reply_is_empty_listing() {
    // The daemon acknowledges KILL_REQ with a bare "OK"
    let nodes = expect_nodes(b"OK");

    assert!(nodes.is_empty());
}
