// # Public IP Source Trait
//
// Defines the interface for discovering the caller's current public IPv4
// address.
//
// ## Implementations
//
// - HTTP "what is my IP" services: `dynr53-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dynr53_core::PublicIpSource;
//
// async fn show(source: &dyn PublicIpSource) -> dynr53_core::Result<()> {
//     let ip = source.fetch_public_ip().await?;
//     println!("public address: {ip}");
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for public-IP source implementations
///
/// A source performs exactly one outbound request per call and returns the
/// address it observed. It does not cache, retry or decide anything: an
/// error is returned as-is and the [`Reconciler`](crate::Reconciler) turns it
/// into an absent value.
///
/// Implementations must only ever return IPv4 addresses. A response that does
/// not parse as a dotted-quad is an error, not a value.
#[async_trait]
pub trait PublicIpSource: Send + Sync {
    /// Fetch the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address reported by the source
    /// - `Err(Error)`: Transport failure, non-success status, or a body that
    ///   is not an IPv4 address
    async fn fetch_public_ip(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Human-readable identity of this source (for logging)
    fn source_name(&self) -> &str;
}
