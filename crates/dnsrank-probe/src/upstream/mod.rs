//! Transport clients used to probe resolvers.
//!
//! Every stamp protocol maps onto one [`Upstream`] implementation with a
//! single operation: exchange a DNS query for a response. The prober
//! never sees anything below that seam, and tests substitute the
//! [`UpstreamFactory`] to script outcomes without the network.

mod doh;
mod dot;
mod plain;

pub use doh::DohUpstream;
pub use dot::DotUpstream;
pub use plain::PlainUpstream;

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::op::Message;

use crate::error::{ProbeError, ProbeResult};
use crate::stamp::Stamp;

/// Options applied to every upstream construction.
///
/// Certificate verification is always on; the rustls clients validate
/// against the webpki root set.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamOptions {
    /// Per-exchange timeout
    pub timeout: Duration,
}

impl Default for UpstreamOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
        }
    }
}

/// A reachable resolver capable of one operation: exchange a query.
///
/// Implementations may keep a connection alive across calls; the timing
/// contract upstack covers the whole `exchange` call either way.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Send `query` and await the matching response.
    async fn exchange(&self, query: &Message) -> ProbeResult<Message>;
}

/// Builds upstreams from stamp strings.
///
/// This is the injection seam the prober is generic over.
pub trait UpstreamFactory: Send + Sync {
    /// Construct an upstream for one resolver.
    ///
    /// # Errors
    ///
    /// Any [`ProbeError`]; a construction failure disqualifies the
    /// resolver, nothing more.
    fn create(&self, stamp: &str, opts: UpstreamOptions) -> ProbeResult<Box<dyn Upstream>>;
}

/// Production factory: decodes the stamp and picks the matching client.
#[derive(Debug, Clone, Copy, Default)]
pub struct StampFactory;

impl UpstreamFactory for StampFactory {
    fn create(&self, stamp: &str, opts: UpstreamOptions) -> ProbeResult<Box<dyn Upstream>> {
        match Stamp::decode(stamp)? {
            Stamp::Plain { addr } => Ok(Box::new(PlainUpstream::new(&addr)?)),
            Stamp::DnsOverHttps {
                addr,
                hostname,
                path,
            } => Ok(Box::new(DohUpstream::new(&addr, &hostname, &path, opts)?)),
            Stamp::DnsOverTls { addr, hostname } => {
                Ok(Box::new(DotUpstream::new(&addr, &hostname)?))
            }
            // No DNSCrypt client in this stack; the resolver is
            // disqualified rather than failing the run.
            Stamp::DnsCrypt { provider, .. } => {
                Err(ProbeError::Unsupported(format!("DNSCrypt ({provider})")))
            }
        }
    }
}

/// Parse a stamp address field: `ip`, `ip:port`, or `[ipv6]` forms.
pub(crate) fn parse_addr(addr: &str, default_port: u16) -> ProbeResult<SocketAddr> {
    if let Ok(sa) = addr.parse::<SocketAddr>() {
        return Ok(sa);
    }
    let bare = addr
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(addr);
    bare.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, default_port))
        .map_err(|_| ProbeError::InvalidStamp(format!("bad address: {addr}")))
}

/// Split a stamp hostname field into host and port.
pub(crate) fn split_host_port(hostname: &str, default_port: u16) -> (String, u16) {
    if let Some((host, port)) = hostname.rsplit_once(':') {
        if let Ok(port) = port.parse::<u16>() {
            if !host.contains(':') || (host.starts_with('[') && host.ends_with(']')) {
                return (host.trim_matches(['[', ']']).to_string(), port);
            }
        }
    }
    (hostname.trim_matches(['[', ']']).to_string(), default_port)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ipv4_with_and_without_port() {
        assert_eq!(
            parse_addr("9.9.9.9", 53).unwrap(),
            "9.9.9.9:53".parse().unwrap()
        );
        assert_eq!(
            parse_addr("9.9.9.9:5353", 53).unwrap(),
            "9.9.9.9:5353".parse().unwrap()
        );
    }

    #[test]
    fn parses_ipv6_forms() {
        assert_eq!(
            parse_addr("2620:fe::fe", 53).unwrap(),
            "[2620:fe::fe]:53".parse().unwrap()
        );
        assert_eq!(
            parse_addr("[2620:fe::fe]", 53).unwrap(),
            "[2620:fe::fe]:53".parse().unwrap()
        );
        assert_eq!(
            parse_addr("[2620:fe::fe]:853", 53).unwrap(),
            "[2620:fe::fe]:853".parse().unwrap()
        );
    }

    #[test]
    fn rejects_hostnames_in_address_fields() {
        assert!(parse_addr("dns.example.com", 53).is_err());
    }

    #[test]
    fn splits_hostname_and_port() {
        assert_eq!(
            split_host_port("dns.quad9.net", 853),
            ("dns.quad9.net".to_string(), 853)
        );
        assert_eq!(
            split_host_port("dns.quad9.net:8853", 853),
            ("dns.quad9.net".to_string(), 8853)
        );
    }

    #[test]
    fn dnscrypt_stamps_are_reported_unsupported() {
        let mut raw = vec![0x01];
        raw.extend_from_slice(&[0; 8]);
        for field in [&b"1.2.3.4"[..], &[0u8; 32][..], &b"2.dnscrypt-cert.x"[..]] {
            raw.push(u8::try_from(field.len()).unwrap());
            raw.extend_from_slice(field);
        }
        let stamp = format!(
            "sdns://{}",
            base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, &raw)
        );

        let result = StampFactory.create(&stamp, UpstreamOptions::default());
        assert!(matches!(result, Err(ProbeError::Unsupported(_))));
    }
}
