//! Record reconciler
//!
//! The Reconciler is responsible for:
//! - Reading the value currently advertised for the target record
//! - Reading the caller's current public IP
//! - Comparing the two
//! - Opening a provider session and upserting the record when they differ
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!                 │  Reconciler  │
//!                 └──────────────┘
//!                        │
//!   ┌────────────────┬───┴────────────┬──────────────────┐
//!   │ 1              │ 2              │ 3 (lazy)         │ 4
//!   ▼                ▼                ▼                  ▼
//! ┌──────────────┐ ┌──────────────┐ ┌─────────────────┐ ┌───────────────┐
//! │ RecordLookup │ │PublicIpSource│ │ SessionProvider │→│ RecordUpdater │
//! └──────────────┘ └──────────────┘ └─────────────────┘ └───────────────┘
//! ```
//!
//! ## Decision Procedure
//!
//! 1. Look up the current value. Absent or failed only logs a warning.
//! 2. Fetch the public IP. Absent ends the run with a failure, always.
//! 3. Equal values end the run as a no-op.
//! 4. Otherwise open a session, then upsert. Either failing ends the run
//!    with a failure.
//!
//! Every call is made in sequence; nothing is retried. A run never returns an
//! error and never panics: collaborator panics are caught and reported as
//! [`RunFailure::Unexpected`].

use crate::config::TargetRecord;
use crate::error::{Error, Result};
use crate::traits::{
    PublicIpSource, RecordChange, RecordLookup, SessionProvider, UpsertResult,
};
use futures_util::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::net::Ipv4Addr;
use std::panic::AssertUnwindSafe;
use tracing::{debug, error, info, warn};

/// Outcome of a single reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The record already advertises the current public IP
    NoUpdateNeeded {
        ip: Ipv4Addr,
    },

    /// The record was upserted
    Updated {
        previous_ip: Option<Ipv4Addr>,
        new_ip: Ipv4Addr,
        result: UpsertResult,
    },

    /// The run ended without reaching the desired state
    Failed {
        failure: RunFailure,
    },
}

impl RunOutcome {
    /// Whether the run should exit successfully
    pub fn is_success(&self) -> bool {
        !matches!(self, RunOutcome::Failed { .. })
    }

    /// The failure, if the run failed
    pub fn failure(&self) -> Option<&RunFailure> {
        match self {
            RunOutcome::Failed { failure } => Some(failure),
            _ => None,
        }
    }

    fn failed(failure: RunFailure) -> Self {
        RunOutcome::Failed { failure }
    }
}

/// Why a run failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RunFailure {
    /// The public IP could not be determined
    #[error("cannot determine current public IP")]
    PublicIpUnavailable,

    /// No provider session could be established
    #[error("failed to establish provider session: {0}")]
    Session(String),

    /// The provider rejected the upsert
    #[error("failed to update record: {0}")]
    Update(String),

    /// Anything that escaped the categories above
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Record reconciler
///
/// Owns one boxed implementation of each collaborator plus the target
/// record. Build it once per process and call [`Reconciler::run`].
pub struct Reconciler {
    /// Record kept in sync
    target: TargetRecord,

    /// Reads the currently advertised value
    lookup: Box<dyn RecordLookup>,

    /// Reads the current public IP
    ip_source: Box<dyn PublicIpSource>,

    /// Opens provider sessions on demand
    sessions: Box<dyn SessionProvider>,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Returns
    ///
    /// - `Ok(Reconciler)`: Ready to run
    /// - `Err(Error)`: The target record is invalid
    pub fn new(
        target: TargetRecord,
        lookup: Box<dyn RecordLookup>,
        ip_source: Box<dyn PublicIpSource>,
        sessions: Box<dyn SessionProvider>,
    ) -> Result<Self> {
        target.validate()?;

        Ok(Self {
            target,
            lookup,
            ip_source,
            sessions,
        })
    }

    /// The record this reconciler keeps in sync
    pub fn target(&self) -> &TargetRecord {
        &self.target
    }

    /// Run one reconciliation
    ///
    /// Never fails: every error is logged and reflected in the returned
    /// [`RunOutcome`].
    pub async fn run(&self) -> RunOutcome {
        match AssertUnwindSafe(self.reconcile()).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                error!("Unexpected error in reconciliation: {}", message);
                RunOutcome::failed(RunFailure::Unexpected(message))
            }
        }
    }

    async fn reconcile(&self) -> RunOutcome {
        let record_name = self.target.record_name.as_str();

        let current_value = self.fetch_current_value(record_name).await;

        let Some(actual_ip) = self.fetch_public_ip().await else {
            return RunOutcome::failed(RunFailure::PublicIpUnavailable);
        };

        match current_value {
            Some(current) if current == actual_ip => {
                info!("No IP update needed: {} already points to {}", record_name, actual_ip);
                return RunOutcome::NoUpdateNeeded { ip: actual_ip };
            }
            Some(current) => {
                info!(
                    "Public IP ({}) different from DNS IP ({}) for {}",
                    actual_ip, current, record_name
                );
            }
            None => {
                info!(
                    "No current value for {}, setting it to {}",
                    record_name, actual_ip
                );
            }
        }

        self.apply(current_value, actual_ip).await
    }

    /// Step 1: read the advertised value, downgrading every failure to `None`
    async fn fetch_current_value(&self, record_name: &str) -> Option<Ipv4Addr> {
        debug!(
            "Looking up current value of {} (strategy: {})",
            record_name,
            self.lookup.strategy()
        );

        match self.lookup.fetch_current_value(record_name).await {
            Ok(Some(ip)) => {
                info!("Resolved DNS IP: {}", ip);
                Some(ip)
            }
            Ok(None) => {
                warn!(
                    "No A record found for {}. Continuing with the run.",
                    record_name
                );
                None
            }
            Err(e) => {
                warn!(
                    "Failed to resolve DNS IP for {}: {}. Continuing with the run.",
                    record_name, e
                );
                None
            }
        }
    }

    /// Step 2: read the public IP, downgrading every failure to `None`
    async fn fetch_public_ip(&self) -> Option<Ipv4Addr> {
        match self.ip_source.fetch_public_ip().await {
            Ok(ip) => {
                info!("Current public IP: {}", ip);
                Some(ip)
            }
            Err(e) => {
                error!(
                    "Failed to get current public IP from {}: {}",
                    self.ip_source.source_name(),
                    e
                );
                None
            }
        }
    }

    /// Steps 5a-5c: open a session, upsert, report
    async fn apply(&self, previous_ip: Option<Ipv4Addr>, new_ip: Ipv4Addr) -> RunOutcome {
        let updater = match self.sessions.establish_session().await {
            Ok(updater) => {
                info!("{} session established successfully", self.sessions.provider_name());
                updater
            }
            Err(e) => {
                log_session_error(self.sessions.provider_name(), &e);
                return RunOutcome::failed(RunFailure::Session(e.to_string()));
            }
        };

        let change = RecordChange {
            hosted_zone_id: self.target.zone_id().to_string(),
            record_name: self.target.record_name.clone(),
            ip: new_ip,
            ttl: self.target.ttl,
        };

        match updater.upsert(&change).await {
            Ok(result) => {
                match result {
                    UpsertResult::Submitted => {
                        info!(
                            "{} record updated successfully: {} -> {}",
                            updater.provider_name(),
                            change.record_name,
                            new_ip
                        );
                    }
                    UpsertResult::DryRun => {
                        info!(
                            "[DRY-RUN] {} record would be updated: {} -> {}",
                            updater.provider_name(),
                            change.record_name,
                            new_ip
                        );
                    }
                }

                RunOutcome::Updated {
                    previous_ip,
                    new_ip,
                    result,
                }
            }
            Err(e) => {
                error!(
                    "Failed to update {} record {}: {}",
                    updater.provider_name(),
                    change.record_name,
                    e
                );
                RunOutcome::failed(RunFailure::Update(e.to_string()))
            }
        }
    }
}

fn log_session_error(provider: &str, err: &Error) {
    match err {
        Error::NoCredentials(_) => {
            error!(
                "No {} credentials found. Ensure they are configured: {}",
                provider, err
            );
        }
        Error::IncompleteCredentials(_) => {
            error!(
                "Incomplete {} credentials found. Verify configuration: {}",
                provider, err
            );
        }
        _ if err.is_credential_error() => {
            error!("{} rejected the credentials: {}", provider, err);
        }
        _ => {
            error!("Error establishing {} session: {}", provider, err);
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
