// # Record Lookup Trait
//
// Defines the interface for reading the address currently advertised for the
// target record.
//
// ## Implementations
//
// - System resolver lookup: `dynr53-lookup-dns` crate
// - Route 53 record-set query: `dynr53-provider-route53` crate
//
// The two strategies answer different questions. The resolver reports what
// the wider internet sees and may lag behind the provider while a change
// propagates. The record-set query is authoritative. A deployment must use
// one of them consistently.

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::config::LookupStrategy;

/// Trait for current-value lookup implementations
#[async_trait]
pub trait RecordLookup: Send + Sync {
    /// Fetch the address currently advertised for `record_name`
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ip))`: The first A value found for the name
    /// - `Ok(None)`: The name resolved but carries no A record
    /// - `Err(Error)`: The lookup itself failed
    async fn fetch_current_value(&self, record_name: &str)
    -> Result<Option<Ipv4Addr>, crate::Error>;

    /// The strategy this implementation follows
    fn strategy(&self) -> LookupStrategy;
}
