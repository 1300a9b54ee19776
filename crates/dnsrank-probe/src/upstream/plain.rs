//! Plain DNS upstream over UDP (RFC 1035).
//!
//! Stateless: every exchange binds a fresh socket, sends one datagram,
//! and reads until a response carries the query's ID. The caller bounds
//! the whole call with its trial timeout.

use std::net::SocketAddr;

use async_trait::async_trait;
use hickory_proto::op::Message;
use tokio::net::UdpSocket;
use tracing::debug;

use super::{parse_addr, Upstream};
use crate::error::{ProbeError, ProbeResult};

/// Standard DNS port.
const DEFAULT_PORT: u16 = 53;

/// Large enough for EDNS0 responses.
const RECV_BUFFER_SIZE: usize = 4096;

/// Plain UDP DNS client.
#[derive(Debug)]
pub struct PlainUpstream {
    server_addr: SocketAddr,
}

impl PlainUpstream {
    /// Create a client for a stamp address field.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidStamp`] if the address is not an IP.
    pub fn new(addr: &str) -> ProbeResult<Self> {
        Ok(Self {
            server_addr: parse_addr(addr, DEFAULT_PORT)?,
        })
    }
}

#[async_trait]
impl Upstream for PlainUpstream {
    async fn exchange(&self, query: &Message) -> ProbeResult<Message> {
        let request = query
            .to_vec()
            .map_err(|e| ProbeError::Proto(e.to_string()))?;

        let bind_addr = if self.server_addr.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(self.server_addr).await?;
        socket.send(&request).await?;

        let mut buf = vec![0u8; RECV_BUFFER_SIZE];
        loop {
            let n = socket.recv(&mut buf).await?;
            // Stale, spoofed, or garbled datagrams are skipped, not
            // fatal; the trial timeout upstack bounds this loop.
            match Message::from_vec(&buf[..n]) {
                Ok(response) if response.id() == query.id() => return Ok(response),
                Ok(response) => debug!(
                    got = response.id(),
                    want = query.id(),
                    "mismatched response id"
                ),
                Err(e) => debug!(error = %e, "undecodable datagram ignored"),
            }
        }
    }
}
