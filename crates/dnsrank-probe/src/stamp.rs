//! `sdns://` server stamp decoding.
//!
//! Server stamps encode everything needed to reach a resolver in one
//! base64url string (no padding): a protocol byte, 64 bits of server
//! properties, then length-prefixed fields. List fields (certificate
//! hashes, bootstrap addresses) chain elements by setting the high bit
//! of the length byte.
//!
//! Only the fields the transports need are surfaced; properties and
//! certificate hashes are decoded past but not retained.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::{ProbeError, ProbeResult};

/// URI scheme every server stamp starts with.
pub const STAMP_SCHEME: &str = "sdns://";

const PROTO_PLAIN: u8 = 0x00;
const PROTO_DNSCRYPT: u8 = 0x01;
const PROTO_DOH: u8 = 0x02;
const PROTO_DOT: u8 = 0x03;

/// A decoded server stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stamp {
    /// Plain DNS over UDP
    Plain {
        /// Server address, `ip` or `ip:port`
        addr: String,
    },
    /// DNSCrypt v2
    DnsCrypt {
        /// Server address
        addr: String,
        /// Provider name, e.g. `2.dnscrypt-cert.example.com`
        provider: String,
    },
    /// DNS-over-HTTPS (RFC 8484)
    DnsOverHttps {
        /// Bootstrap address; may be empty when the hostname must be
        /// resolved externally
        addr: String,
        /// Server hostname, optionally `host:port`
        hostname: String,
        /// Query path, e.g. `/dns-query`
        path: String,
    },
    /// DNS-over-TLS (RFC 7858)
    DnsOverTls {
        /// Bootstrap address; may be empty
        addr: String,
        /// Server hostname, optionally `host:port`
        hostname: String,
    },
}

impl Stamp {
    /// Decode a stamp string.
    ///
    /// # Errors
    ///
    /// [`ProbeError::InvalidStamp`] for syntactic problems,
    /// [`ProbeError::Unsupported`] for protocols outside the four
    /// defined above (relays, DoQ, oDoH).
    pub fn decode(stamp: &str) -> ProbeResult<Self> {
        let encoded = stamp.strip_prefix(STAMP_SCHEME).ok_or_else(|| {
            ProbeError::InvalidStamp(format!("missing {STAMP_SCHEME} scheme"))
        })?;
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|e| ProbeError::InvalidStamp(format!("bad base64: {e}")))?;

        let mut reader = Reader::new(&bytes);
        let protocol = reader.byte()?;
        reader.skip(8)?; // server properties bitmap

        match protocol {
            PROTO_PLAIN => Ok(Self::Plain {
                addr: reader.lp_string()?,
            }),
            PROTO_DNSCRYPT => {
                let addr = reader.lp_string()?;
                reader.lp_bytes()?; // provider public key
                let provider = reader.lp_string()?;
                Ok(Self::DnsCrypt { addr, provider })
            }
            PROTO_DOH => {
                let addr = reader.lp_string()?;
                reader.lp_list()?; // certificate hashes
                let hostname = reader.lp_string()?;
                let path = reader.lp_string()?;
                Ok(Self::DnsOverHttps {
                    addr,
                    hostname,
                    path,
                })
            }
            PROTO_DOT => {
                let addr = reader.lp_string()?;
                reader.lp_list()?; // certificate hashes
                let hostname = reader.lp_string()?;
                Ok(Self::DnsOverTls { addr, hostname })
            }
            other => Err(ProbeError::Unsupported(format!(
                "stamp protocol 0x{other:02x}"
            ))),
        }
    }
}

/// Cursor over the decoded stamp bytes.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    const fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn byte(&mut self) -> ProbeResult<u8> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| ProbeError::InvalidStamp("truncated stamp".to_string()))?;
        self.pos += 1;
        Ok(b)
    }

    fn skip(&mut self, n: usize) -> ProbeResult<()> {
        self.take(n).map(|_| ())
    }

    fn take(&mut self, n: usize) -> ProbeResult<&'a [u8]> {
        let end = self.pos.checked_add(n).filter(|&end| end <= self.buf.len());
        let end = end.ok_or_else(|| ProbeError::InvalidStamp("truncated stamp".to_string()))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// One length-prefixed field.
    fn lp_bytes(&mut self) -> ProbeResult<&'a [u8]> {
        let len = self.byte()?;
        self.take(usize::from(len))
    }

    fn lp_string(&mut self) -> ProbeResult<String> {
        let bytes = self.lp_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ProbeError::InvalidStamp(format!("non-UTF-8 field: {e}")))
    }

    /// A chained list of length-prefixed fields: the length byte's high
    /// bit marks "another element follows".
    fn lp_list(&mut self) -> ProbeResult<Vec<&'a [u8]>> {
        let mut items = Vec::new();
        loop {
            let len = self.byte()?;
            let more = len & 0x80 != 0;
            items.push(self.take(usize::from(len & 0x7f))?);
            if !more {
                return Ok(items);
            }
        }
    }
}
