// # DNS Provider Traits
//
// Defines the interface for establishing an authenticated provider session
// and upserting the address record through it.
//
// ## Implementations
//
// - Route 53: `dynr53-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use dynr53_core::traits::{RecordChange, SessionProvider};
//
// async fn push(sessions: &dyn SessionProvider, change: &RecordChange) -> dynr53_core::Result<()> {
//     let updater = sessions.establish_session().await?;
//     updater.upsert(change).await?;
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::Serialize;
use std::net::Ipv4Addr;

/// A single address-record upsert request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordChange {
    /// Hosted zone holding the record
    pub hosted_zone_id: String,
    /// Fully-qualified record name
    pub record_name: String,
    /// The address to publish
    pub ip: Ipv4Addr,
    /// Time-to-live in seconds
    pub ttl: u32,
}

/// Result of a successful upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UpsertResult {
    /// The provider accepted the change
    Submitted,
    /// Dry-run mode: the change was logged but not submitted
    DryRun,
}

/// Trait for record updater implementations
///
/// An updater is obtained from a [`SessionProvider`] and is bound to an
/// authenticated client.
///
/// # Idempotency
///
/// `upsert` must be a create-or-replace: submitting the same change twice
/// leaves the record in the same state as submitting it once. Callers rely on
/// this and do not guard against double submission.
///
/// # Trust Level: Untrusted
///
/// - ✅ Perform API calls to the provider endpoint only
/// - ✅ Return the provider's rejection message on failure
/// - ❌ Retry or back off (runs are retried by the external scheduler)
/// - ❌ Decide whether an update is needed (owned by `Reconciler`)
#[async_trait]
pub trait RecordUpdater: Send + Sync {
    /// Create or replace the address record described by `change`
    ///
    /// # Returns
    ///
    /// - `Ok(UpsertResult)`: The change was accepted (or logged in dry-run)
    /// - `Err(Error)`: The provider rejected the change or was unreachable
    async fn upsert(&self, change: &RecordChange) -> Result<UpsertResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Trait for session/credential provider implementations
///
/// Establishing a session validates that usable credentials exist and that
/// the identity they represent is active before any write is attempted.
/// The `Reconciler` only calls this when an update is actually needed.
///
/// # Errors
///
/// Implementations report credential problems with the dedicated variants so
/// the caller can log them distinctly:
///
/// - [`Error::NoCredentials`](crate::Error::NoCredentials): nothing found
/// - [`Error::IncompleteCredentials`](crate::Error::IncompleteCredentials):
///   found but malformed or partial
/// - anything else: reported generically
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Validate credentials and return an updater bound to the session
    async fn establish_session(&self) -> Result<Box<dyn RecordUpdater>, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
