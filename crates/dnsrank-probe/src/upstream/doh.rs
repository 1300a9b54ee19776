//! DNS-over-HTTPS upstream (RFC 8484).
//!
//! POST with `application/dns-message` bodies over reqwest's rustls
//! stack. When the stamp carries a bootstrap address the client pins the
//! hostname to it, so probing never depends on the system resolver.

use async_trait::async_trait;
use hickory_proto::op::Message;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use super::{parse_addr, Upstream, UpstreamOptions};
use crate::error::{ProbeError, ProbeResult};

/// RFC 8484 media type for DNS wire format.
const DNS_MESSAGE: &str = "application/dns-message";

const DEFAULT_PORT: u16 = 443;

/// DoH client for one resolver endpoint.
pub struct DohUpstream {
    endpoint: Url,
    http: reqwest::Client,
}

impl DohUpstream {
    /// Create a client from the stamp's address, hostname, and path.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidStamp`] for unusable endpoint pieces,
    /// [`ProbeError::Http`] if the HTTP client cannot be built.
    pub fn new(addr: &str, hostname: &str, path: &str, opts: UpstreamOptions) -> ProbeResult<Self> {
        let raw = format!("https://{hostname}{path}");
        let endpoint = Url::parse(&raw)
            .map_err(|e| ProbeError::InvalidStamp(format!("bad DoH endpoint {raw}: {e}")))?;

        let mut builder = reqwest::Client::builder().timeout(opts.timeout);
        if !addr.is_empty() {
            let pinned = parse_addr(addr, DEFAULT_PORT)?;
            let host = endpoint
                .host_str()
                .ok_or_else(|| ProbeError::InvalidStamp(format!("no host in {raw}")))?;
            builder = builder.resolve(host, pinned);
        }
        let http = builder
            .build()
            .map_err(|e| ProbeError::Http(e.to_string()))?;

        Ok(Self { endpoint, http })
    }
}

#[async_trait]
impl Upstream for DohUpstream {
    async fn exchange(&self, query: &Message) -> ProbeResult<Message> {
        let body = query
            .to_vec()
            .map_err(|e| ProbeError::Proto(e.to_string()))?;
        debug!(endpoint = %self.endpoint, "DoH exchange");

        let response = self
            .http
            .post(self.endpoint.as_str())
            .header(CONTENT_TYPE, DNS_MESSAGE)
            .header(ACCEPT, DNS_MESSAGE)
            .body(body)
            .send()
            .await
            .map_err(|e| ProbeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Http(format!("status {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProbeError::Http(e.to_string()))?;
        Message::from_vec(&bytes).map_err(|e| ProbeError::Proto(e.to_string()))
    }
}
