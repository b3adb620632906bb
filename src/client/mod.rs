//! Client Module
//!
//! The daemon connection and the one-shot query facade.
//!
//! ## Architecture
//! - One `Connection` per socket, single-owner, single exchange
//! - Facade functions open an ephemeral connection, perform exactly one
//!   exchange, and always close the socket before returning
//! - Registration keeps its connection alive as the daemon's liveness
//!   signal; everything else is fire-once

mod connection;

pub use connection::Connection;

use crate::config::Config;
use crate::error::{EpmdError, Result};
use crate::protocol::{NodeInfo, NodeQueryResult, Response};

/// Resolve a registered node name to its listening port
///
/// Opens a fresh connection to the daemon at `host:port`, sends one
/// PORT_PLEASE2_REQ, and returns the daemon's answer. The connection is
/// closed before this returns, success or not.
pub fn resolve_node(host: &str, port: u16, name: &str) -> Result<NodeQueryResult> {
    let config = Config::builder().host(host).port(port).build();
    let mut conn = Connection::connect(&config)?;

    conn.query_port(name)?;
    let outcome = conn.recv();
    conn.close();

    match outcome? {
        Some(Response::Node(node)) => Ok(node),
        Some(_) => Err(EpmdError::Protocol(
            "unexpected response to PORT_PLEASE2_REQ".to_string(),
        )),
        None => Err(EpmdError::Protocol(
            "daemon closed the connection without answering the port query".to_string(),
        )),
    }
}

/// List all nodes registered with the daemon at `host:port`
///
/// A daemon with no registrations may answer with an empty payload; that is
/// an empty listing, not an error.
pub fn node_names(host: &str, port: u16) -> Result<Vec<NodeInfo>> {
    let config = Config::builder().host(host).port(port).build();
    let mut conn = Connection::connect(&config)?;

    conn.list_names()?;
    let outcome = conn.recv();
    conn.close();

    match outcome? {
        Some(Response::Nodes(nodes)) => Ok(nodes),
        Some(_) => Err(EpmdError::Protocol(
            "unexpected response to NAMES_REQ".to_string(),
        )),
        None => Ok(Vec::new()),
    }
}

/// Dump everything the daemon at `host:port` knows about its nodes
///
/// Entries carry the daemon-internal file descriptor, unlike [`node_names`].
pub fn dump_nodes(host: &str, port: u16) -> Result<Vec<NodeInfo>> {
    let config = Config::builder().host(host).port(port).build();
    let mut conn = Connection::connect(&config)?;

    conn.dump_all()?;
    let outcome = conn.recv();
    conn.close();

    match outcome? {
        Some(Response::Nodes(nodes)) => Ok(nodes),
        Some(_) => Err(EpmdError::Protocol(
            "unexpected response to DUMP_REQ".to_string(),
        )),
        None => Ok(Vec::new()),
    }
}
