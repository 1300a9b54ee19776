//! Parsing of the public resolver directory.
//!
//! The directory is line-oriented text in dnscrypt-proxy's
//! `public-resolvers.md` layout: `##` opens a new resolver section,
//! `sdns://` carries the server stamp, and every other line (blank lines
//! included) is free-form metadata kept for capability filtering.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::types::ResolverEntry;

/// Prefix that opens a new resolver section.
pub const HEADER_PREFIX: &str = "##";

/// Prefix of a server stamp line.
pub const STAMP_PREFIX: &str = "sdns://";

/// Read and parse a directory file.
///
/// # Errors
///
/// Returns [`RankError::Io`](crate::RankError::Io) if the file cannot be
/// read. This is the only fatal error in the whole pipeline.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ResolverEntry>> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse(&text))
}

/// Parse directory text into resolver entries, in order of appearance.
///
/// Sections without a stamp are dropped, so lines before the first
/// header are discarded unless a stray stamp precedes any header. When a
/// section carries several stamp lines, the last one wins.
#[must_use]
pub fn parse(text: &str) -> Vec<ResolverEntry> {
    let mut entries = Vec::new();
    let mut current = ResolverEntry::new("");

    for line in text.lines() {
        if line.starts_with(HEADER_PREFIX) {
            if !current.stamp.is_empty() {
                entries.push(current);
            }
            current = ResolverEntry::new(line);
        } else if line.starts_with(STAMP_PREFIX) {
            current.stamp = line.to_string();
        } else {
            current.metadata.push(line.to_string());
        }
    }
    if !current.stamp.is_empty() {
        entries.push(current);
    }

    debug!(count = entries.len(), "parsed resolver directory");
    entries
}
