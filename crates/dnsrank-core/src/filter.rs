//! Capability filtering over parsed resolver entries.
//!
//! The directory advertises transport support in free text ("Supports
//! DNSCrypt", "DoH protocol"), so filtering is a case-sensitive keyword
//! search over each entry's metadata lines.

use crate::types::ResolverEntry;

/// A transport capability a resolver can advertise in its metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// DNSCrypt v2 transport
    DnsCrypt,
    /// DNS-over-HTTPS transport
    Doh,
}

impl Capability {
    /// Metadata keyword this capability matches on (case-sensitive).
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::DnsCrypt => "DNSCrypt",
            Self::Doh => "DoH",
        }
    }
}

/// Keep only entries whose metadata mentions every requested capability.
///
/// Capabilities compose by AND; an empty list keeps everything. Relative
/// order is preserved and entries are never mutated.
#[must_use]
pub fn retain_capable(
    entries: Vec<ResolverEntry>,
    capabilities: &[Capability],
) -> Vec<ResolverEntry> {
    if capabilities.is_empty() {
        return entries;
    }
    entries
        .into_iter()
        .filter(|entry| {
            capabilities
                .iter()
                .all(|cap| entry.metadata.iter().any(|line| line.contains(cap.tag())))
        })
        .collect()
}
