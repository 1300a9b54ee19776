//! dnsrank - rank public DNS resolvers by measured query latency.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dnsrank_cli::run().await
}
