//! Core traits for dynr53
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`PublicIpSource`]: Discover the caller's public IPv4 address
//! - [`RecordLookup`]: Read the address currently advertised for a record
//! - [`SessionProvider`]: Validate credentials and open a provider session
//! - [`RecordUpdater`]: Upsert the address record through a session

pub mod ip_source;
pub mod record_lookup;
pub mod dns_provider;

pub use ip_source::PublicIpSource;
pub use record_lookup::RecordLookup;
pub use dns_provider::{RecordChange, RecordUpdater, SessionProvider, UpsertResult};
