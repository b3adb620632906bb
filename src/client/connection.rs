//! Connection Handler
//!
//! Owns one socket to the daemon and drives its single exchange.

use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{EpmdError, Result};
use crate::protocol::{decode_response, encode_framed, AliveAck, Request, Response, ALIVE_RESP_LEN};

/// Connection lifecycle
///
/// The protocol allows one request/response exchange per socket; only a
/// registration socket lives on afterwards, as the keepalive the daemon
/// watches. Sends are valid only in `Open`, so a spent or registered
/// connection cannot be reused by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Connected, no request sent yet
    Open,

    /// ALIVE_REQ sent; the next read is the fixed-size registration ack
    AwaitingAck,

    /// Query sent; the daemon answers and closes, so the reply is
    /// delimited by EOF
    AwaitingReply,

    /// Registration acknowledged; the socket is now only a liveness
    /// signal, and closing it deregisters the node
    Registered,

    /// Socket shut down (terminal)
    Closed,
}

/// A single connection to the daemon
///
/// Owns its `TcpStream` exclusively and closes it on drop. Any I/O or
/// decode failure closes the socket before the error is returned.
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    state: State,
}

impl Connection {
    /// Open a TCP connection to the daemon
    ///
    /// Applies the configured connect/read/write timeouts (0 disables) and
    /// disables Nagle's algorithm, so small protocol messages go out
    /// immediately.
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = resolve_addr(&config.host, config.port)?;

        let stream = if config.connect_timeout_ms > 0 {
            TcpStream::connect_timeout(&addr, Duration::from_millis(config.connect_timeout_ms))?
        } else {
            TcpStream::connect(addr)?
        };

        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        stream.set_nodelay(true)?;

        if config.read_timeout_ms > 0 {
            stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
        }
        if config.write_timeout_ms > 0 {
            stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
        }

        // Clone stream for separate read/write handles
        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        tracing::debug!("Connected to daemon at {}", peer_addr);

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            state: State::Open,
        })
    }

    // -------------------------------------------------------------------------
    // Request sends
    // -------------------------------------------------------------------------

    /// Send an ALIVE_REQ registering `name` as listening on `port`
    ///
    /// On acknowledgment this socket becomes the registration's liveness
    /// signal: it must be kept open, and nothing else may be sent on it.
    pub fn register_alive(&mut self, port: u16, name: &str) -> Result<()> {
        self.send(&Request::Alive {
            port,
            name: name.to_string(),
        })
    }

    /// Send a PORT_PLEASE2_REQ resolving `name` to its listening port
    pub fn query_port(&mut self, name: &str) -> Result<()> {
        self.send(&Request::PortPlease {
            name: name.to_string(),
        })
    }

    /// Send a NAMES_REQ listing all registered nodes
    pub fn list_names(&mut self) -> Result<()> {
        self.send(&Request::Names)
    }

    /// Send a DUMP_REQ listing everything the daemon knows about its nodes
    pub fn dump_all(&mut self) -> Result<()> {
        self.send(&Request::Dump)
    }

    /// Send a KILL_REQ - use with caution
    pub fn kill(&mut self) -> Result<()> {
        self.send(&Request::Kill)
    }

    /// Encode, frame and write one request
    ///
    /// Valid only while the connection is open; a session error here does
    /// not touch the socket, so a mistaken send cannot tear down a
    /// keepalive registration.
    fn send(&mut self, request: &Request) -> Result<()> {
        match self.state {
            State::Open => {}
            State::Registered => {
                return Err(EpmdError::Session(
                    "connection holds a registration keepalive; open a new connection for further requests".to_string(),
                ));
            }
            State::AwaitingAck | State::AwaitingReply => {
                return Err(EpmdError::Session(
                    "a request is already in flight on this connection".to_string(),
                ));
            }
            State::Closed => {
                return Err(EpmdError::Session("connection is closed".to_string()));
            }
        }

        let framed = encode_framed(request);
        tracing::debug!("> {:?} ({} bytes)", request.opcode(), framed.len());

        if let Err(e) = self
            .writer
            .write_all(&framed)
            .and_then(|_| self.writer.flush())
        {
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            self.close();
            return Err(e.into());
        }

        self.state = match request {
            Request::Alive { .. } => State::AwaitingAck,
            _ => State::AwaitingReply,
        };

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Response receive
    // -------------------------------------------------------------------------

    /// Receive the response to the request in flight
    ///
    /// Returns `Ok(None)` when the peer closed the connection instead of
    /// answering. On a registered connection this blocks until the daemon
    /// closes the keepalive socket (subject to the read timeout).
    pub fn recv(&mut self) -> Result<Option<Response>> {
        let raw = match self.state {
            State::Open => {
                return Err(EpmdError::Session(
                    "no request in flight on this connection".to_string(),
                ));
            }
            State::Closed => return Ok(None),
            State::AwaitingAck => self.read_ack(),
            State::AwaitingReply | State::Registered => self.read_until_close(),
        };

        let raw = match raw {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                self.close();
                return Err(e);
            }
        };

        let Some(raw) = raw else {
            // Peer closed without a payload
            self.close();
            return Ok(None);
        };

        let response = match decode_response(&raw) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Undecodable response from {}: {}", self.peer_addr, e);
                self.close();
                return Err(e);
            }
        };

        match (&response, self.state) {
            (Response::Alive(_), State::AwaitingAck) => {
                tracing::debug!("< ALIVE_RESP, holding socket as keepalive");
                self.state = State::Registered;
            }
            (Response::Node(_), _) => {
                tracing::debug!("< PORT2_RESP");
                self.close();
            }
            (Response::Nodes(nodes), _) => {
                tracing::debug!("< node listing, {} entries", nodes.len());
                self.close();
            }
            // A registration ack outside the ack window; nothing to keep alive
            (_, _) => self.close(),
        }

        Ok(Some(response))
    }

    /// Perform the full registration exchange
    ///
    /// Sends ALIVE_REQ and waits for the acknowledgment. On success the
    /// connection stays open as the liveness signal and yields the
    /// daemon's creation token.
    pub fn register(&mut self, port: u16, name: &str) -> Result<AliveAck> {
        self.register_alive(port, name)?;

        match self.recv()? {
            Some(Response::Alive(ack)) => Ok(ack),
            Some(_) => Err(EpmdError::Protocol(
                "unexpected response to ALIVE_REQ".to_string(),
            )),
            None => Err(EpmdError::Protocol(
                "daemon closed the connection without acknowledging registration".to_string(),
            )),
        }
    }

    // -------------------------------------------------------------------------
    // Socket reads
    // -------------------------------------------------------------------------

    /// Read the fixed-size registration ack
    fn read_ack(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = [0u8; ALIVE_RESP_LEN];
        match self.reader.read_exact(&mut buf) {
            Ok(()) => Ok(Some(buf.to_vec())),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read until the daemon closes the socket
    ///
    /// Query replies are not length-framed; the daemon answers and closes,
    /// so EOF delimits the complete message.
    fn read_until_close(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        if buf.is_empty() {
            Ok(None)
        } else {
            Ok(Some(buf))
        }
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Shut down the socket; idempotent
    ///
    /// On a registered connection this withdraws the registration: the
    /// daemon treats closure of the keepalive socket as deregistration.
    pub fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }
        tracing::debug!("Closing connection to {}", self.peer_addr);
        let _ = self.writer.flush();
        let _ = self.writer.get_ref().shutdown(Shutdown::Both);
        self.state = State::Closed;
    }

    /// Whether this connection holds a live registration keepalive
    pub fn is_registered(&self) -> bool {
        self.state == State::Registered
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

/// Resolve a host/port pair to a concrete socket address
fn resolve_addr(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| EpmdError::Config(format!("host {host} did not resolve to any address")))
}
