//! Integration tests for epmd-client
//!
//! These run against a live epmd (`epmd -daemon`) on localhost:4369 and are
//! ignored by default: `cargo test -- --ignored` to include them. A fresh
//! daemon is assumed; other registered nodes will show up in the listings.

use epmd_client::{
    dump_nodes, node_names, resolve_node, Config, Connection, DEFAULT_EPMD_PORT,
};

const HOST: &str = "127.0.0.1";
const TEST_NAME: &str = "integration-test";
const TEST_PORT: u16 = 34564;

fn registered_connection() -> Connection {
    let config = Config::builder().host(HOST).port(DEFAULT_EPMD_PORT).build();
    let mut conn = Connection::connect(&config).expect("epmd not reachable");
    conn.register(TEST_PORT, TEST_NAME)
        .expect("registration failed");
    conn
}

// =============================================================================
// Registration
// =============================================================================

#[test]
#[ignore]
fn test_register_as_node() {
    let conn = registered_connection();

    assert!(conn.is_registered());
}

// =============================================================================
// Name Resolution
// =============================================================================

#[test]
#[ignore]
fn test_resolve_own_registration() {
    let _keepalive = registered_connection();

    let node = resolve_node(HOST, DEFAULT_EPMD_PORT, TEST_NAME).unwrap();

    assert_eq!(node.name, TEST_NAME);
    assert_eq!(node.port, TEST_PORT);
}

// =============================================================================
// Listings
// =============================================================================

#[test]
#[ignore]
fn test_names_lists_own_registration_without_fd() {
    let _keepalive = registered_connection();

    let nodes = node_names(HOST, DEFAULT_EPMD_PORT).unwrap();

    let node = nodes
        .iter()
        .find(|n| n.name == TEST_NAME)
        .expect("registered node missing from listing");
    assert_eq!(node.port, TEST_PORT);
    assert_eq!(node.fd, None);
}

#[test]
#[ignore]
fn test_dump_lists_own_registration_with_fd() {
    let _keepalive = registered_connection();

    let nodes = dump_nodes(HOST, DEFAULT_EPMD_PORT).unwrap();

    let node = nodes
        .iter()
        .find(|n| n.name == TEST_NAME)
        .expect("registered node missing from dump");
    assert_eq!(node.port, TEST_PORT);
    assert!(node.fd.is_some());
}
