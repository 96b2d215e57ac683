// # dynr53-core
//
// Core library for the dynr53 Route 53 address-record updater.
//
// ## Architecture Overview
//
// This library provides everything that is not I/O:
// - **PublicIpSource**: Trait for discovering the caller's public IPv4 address
// - **RecordLookup**: Trait for reading the value a record currently advertises
// - **SessionProvider**: Trait for validating credentials and opening a session
// - **RecordUpdater**: Trait for upserting the address record
// - **Reconciler**: The decision procedure tying the four together
//
// ## Design Principles
//
// 1. **Separation of Concerns**: The decision procedure is separate from the
//    services it talks to
// 2. **One-Shot**: A run is a single pass; scheduling is external
// 3. **Stateless**: Nothing is cached or persisted between runs
// 4. **Library-First**: The binary only reads configuration and wires crates
// 5. **Idempotency**: Upserts are create-or-replace; repeated runs converge

pub mod traits;
pub mod reconciler;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{PublicIpSource, RecordLookup, RecordUpdater, SessionProvider};
pub use traits::{RecordChange, UpsertResult};
pub use reconciler::{Reconciler, RunFailure, RunOutcome};
pub use config::{Dynr53Config, LookupStrategy, RunMode, TargetRecord};
pub use error::{Error, Result};
