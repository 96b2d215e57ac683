// # Resolver Record Lookup
//
// This crate reads the value a record currently advertises through the
// system's configured DNS resolver (`/etc/resolv.conf` on Unix).
//
// ## What It Reports
//
// The answer reflects what the wider internet sees, including resolver
// caching. Right after an upsert it can lag behind the provider until the
// old TTL expires; an extra upsert in that window is harmless because upserts
// are idempotent.
//
// ## Platform Support
//
// Works wherever hickory can read the system resolver configuration. When it
// cannot, the lookup fails and the reconciler carries on without a baseline.

use dynr53_core::config::LookupStrategy;
use dynr53_core::traits::RecordLookup;
use dynr53_core::{Error, Result};

use hickory_resolver::TokioResolver;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Record lookup through the system resolver
#[derive(Debug, Clone)]
pub struct DnsRecordLookup {
    /// Per-query timeout
    timeout: Duration,
}

impl DnsRecordLookup {
    /// Create a lookup using the system resolver configuration
    pub fn system(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Build a resolver for one run
    ///
    /// Built on demand so that a missing resolver configuration surfaces as
    /// a lookup failure rather than a startup failure.
    fn resolver(&self) -> Result<TokioResolver> {
        let mut builder = TokioResolver::builder_tokio()
            .map_err(|e| Error::lookup(format!("failed to create resolver: {e}")))?;
        let options = builder.options_mut();
        options.timeout = self.timeout;
        options.attempts = 1;
        Ok(builder.build())
    }
}

/// Bound a whole lookup by `timeout`
///
/// The resolver's own timeout applies per nameserver; this caps the total.
pub async fn within_deadline<T, F>(record_name: &str, timeout: Duration, lookup: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, lookup).await.map_err(|_| {
        Error::lookup(format!(
            "DNS lookup for {} timed out after {:?}",
            record_name, timeout
        ))
    })?
}

/// Make a record name absolute so resolver search domains are not applied
pub fn absolute_name(record_name: &str) -> String {
    if record_name.ends_with('.') {
        record_name.to_string()
    } else {
        format!("{}.", record_name)
    }
}

#[async_trait::async_trait]
impl RecordLookup for DnsRecordLookup {
    async fn fetch_current_value(&self, record_name: &str) -> Result<Option<Ipv4Addr>> {
        let name = absolute_name(record_name);
        tracing::debug!("Resolving A record for {}", name);

        let resolver = self.resolver()?;

        within_deadline(record_name, self.timeout, async {
            match resolver.ipv4_lookup(name.as_str()).await {
                Ok(answer) => Ok(answer.iter().map(|a| a.0).next()),
                Err(e) if e.is_no_records_found() => {
                    tracing::debug!("No A records for {}: {}", name, e);
                    Ok(None)
                }
                Err(e) => Err(Error::lookup(format!(
                    "Error resolving DNS for {}: {}",
                    record_name, e
                ))),
            }
        })
        .await
    }

    fn strategy(&self) -> LookupStrategy {
        LookupStrategy::Resolver
    }
}
