//! DNS-over-TLS upstream (RFC 7858).
//!
//! TLS 1.2/1.3 via tokio-rustls with webpki roots, messages framed by
//! the usual 2-byte length prefix. The TLS session is kept across
//! exchanges and rebuilt after any failure.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use hickory_proto::op::Message;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::debug;

use super::{parse_addr, split_host_port, Upstream};
use crate::error::{ProbeError, ProbeResult};

/// Standard DoT port (RFC 7858).
const DEFAULT_PORT: u16 = 853;

/// DoT client for one resolver endpoint.
pub struct DotUpstream {
    server_addr: SocketAddr,
    server_name: ServerName<'static>,
    connector: TlsConnector,
    session: Mutex<Option<TlsStream<TcpStream>>>,
}

impl DotUpstream {
    /// Create a client from the stamp's address and hostname fields.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidStamp`] if neither field yields an address
    /// or the hostname is not a valid TLS server name.
    pub fn new(addr: &str, hostname: &str) -> ProbeResult<Self> {
        let (host, port) = split_host_port(hostname, DEFAULT_PORT);
        // The stamp's address field bootstraps the connection; without
        // it the hostname itself must be an IP literal.
        let server_addr = if addr.is_empty() {
            parse_addr(&host, port)?
        } else {
            parse_addr(addr, port)?
        };

        let _ = rustls::crypto::ring::default_provider().install_default();
        let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder()
            .with_root_certificates(roots)
            .with_no_client_auth();
        let server_name = ServerName::try_from(host.clone())
            .map_err(|e| ProbeError::InvalidStamp(format!("bad TLS server name {host}: {e}")))?;

        Ok(Self {
            server_addr,
            server_name,
            connector: TlsConnector::from(Arc::new(config)),
            session: Mutex::new(None),
        })
    }

    async fn connect(&self) -> ProbeResult<TlsStream<TcpStream>> {
        debug!(addr = %self.server_addr, "DoT connect");
        let tcp = TcpStream::connect(self.server_addr).await?;
        tcp.set_nodelay(true)?;
        self.connector
            .connect(self.server_name.clone(), tcp)
            .await
            .map_err(|e| ProbeError::Tls(e.to_string()))
    }

    async fn send_recv(
        stream: &mut TlsStream<TcpStream>,
        request: &[u8],
    ) -> ProbeResult<Message> {
        let len = u16::try_from(request.len())
            .map_err(|_| ProbeError::Proto("query exceeds 64 KiB".to_string()))?;
        stream.write_all(&len.to_be_bytes()).await?;
        stream.write_all(request).await?;
        stream.flush().await?;

        let mut len_buf = [0u8; 2];
        stream.read_exact(&mut len_buf).await?;
        let mut body = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
        stream.read_exact(&mut body).await?;

        Message::from_vec(&body).map_err(|e| ProbeError::Proto(e.to_string()))
    }
}

#[async_trait]
impl Upstream for DotUpstream {
    async fn exchange(&self, query: &Message) -> ProbeResult<Message> {
        let request = query
            .to_vec()
            .map_err(|e| ProbeError::Proto(e.to_string()))?;

        let mut session = self.session.lock().await;
        if session.is_none() {
            *session = Some(self.connect().await?);
        }
        let stream = session
            .as_mut()
            .ok_or_else(|| ProbeError::Tls("no session".to_string()))?;

        match Self::send_recv(stream, &request).await {
            Ok(response) if response.id() == query.id() => Ok(response),
            Ok(response) => {
                *session = None;
                Err(ProbeError::BadResponse(format!(
                    "id {} does not match query {}",
                    response.id(),
                    query.id()
                )))
            }
            Err(e) => {
                // Drop the broken session so the next trial reconnects.
                *session = None;
                Err(e)
            }
        }
    }
}
