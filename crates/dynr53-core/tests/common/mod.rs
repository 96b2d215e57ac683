//! Test doubles and common utilities for reconciler contract tests
//!
//! Every double counts its calls so tests can assert which collaborators a
//! run touched and which it skipped.

#![allow(dead_code)]

use dynr53_core::config::LookupStrategy;
use dynr53_core::error::{Error, Result};
use dynr53_core::traits::{
    PublicIpSource, RecordChange, RecordLookup, RecordUpdater, SessionProvider, UpsertResult,
};
use dynr53_core::{Reconciler, TargetRecord};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const ZONE_ID: &str = "Z0123456789ABC";
pub const RECORD_NAME: &str = "home.example.com";

/// Parse a dotted-quad literal
pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

/// The target record used by every contract test
pub fn target() -> TargetRecord {
    TargetRecord::new(ZONE_ID, RECORD_NAME).with_ttl(300)
}

/// Shared, ordered record of which collaborator was called
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Wraps a lookup and appends "lookup" to a call log
pub struct LoggedLookup {
    inner: StaticLookup,
    log: CallLog,
}

impl LoggedLookup {
    pub fn new(inner: StaticLookup, log: &CallLog) -> Self {
        Self {
            inner,
            log: Arc::clone(log),
        }
    }
}

#[async_trait::async_trait]
impl RecordLookup for LoggedLookup {
    async fn fetch_current_value(&self, record_name: &str) -> Result<Option<Ipv4Addr>> {
        self.log.lock().unwrap().push("lookup");
        self.inner.fetch_current_value(record_name).await
    }

    fn strategy(&self) -> LookupStrategy {
        self.inner.strategy()
    }
}

/// Wraps an IP source and appends "ip" to a call log
pub struct LoggedIpSource {
    inner: StaticIpSource,
    log: CallLog,
}

impl LoggedIpSource {
    pub fn new(inner: StaticIpSource, log: &CallLog) -> Self {
        Self {
            inner,
            log: Arc::clone(log),
        }
    }
}

#[async_trait::async_trait]
impl PublicIpSource for LoggedIpSource {
    async fn fetch_public_ip(&self) -> Result<Ipv4Addr> {
        self.log.lock().unwrap().push("ip");
        self.inner.fetch_public_ip().await
    }

    fn source_name(&self) -> &str {
        self.inner.source_name()
    }
}

/// What a [`StaticLookup`] answers
#[derive(Debug, Clone)]
pub enum LookupAnswer {
    Found(Ipv4Addr),
    Missing,
    Fails(String),
}

/// A lookup that always gives the same answer
pub struct StaticLookup {
    answer: LookupAnswer,
    call_count: Arc<AtomicUsize>,
}

impl StaticLookup {
    pub fn new(answer: LookupAnswer) -> Self {
        Self {
            answer,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Lookup for a record that currently advertises `value`
    pub fn found(value: &str) -> Self {
        Self::new(LookupAnswer::Found(ip(value)))
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            answer: other.answer.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl RecordLookup for StaticLookup {
    async fn fetch_current_value(&self, _record_name: &str) -> Result<Option<Ipv4Addr>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match &self.answer {
            LookupAnswer::Found(ip) => Ok(Some(*ip)),
            LookupAnswer::Missing => Ok(None),
            LookupAnswer::Fails(message) => Err(Error::lookup(message.clone())),
        }
    }

    fn strategy(&self) -> LookupStrategy {
        LookupStrategy::Resolver
    }
}

/// A public-IP source returning a fixed address, or failing when `None`
pub struct StaticIpSource {
    ip: Option<Ipv4Addr>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIpSource {
    pub fn new(ip: Option<Ipv4Addr>) -> Self {
        Self {
            ip,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn returning(value: &str) -> Self {
        Self::new(Some(ip(value)))
    }

    pub fn unavailable() -> Self {
        Self::new(None)
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            ip: other.ip,
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl PublicIpSource for StaticIpSource {
    async fn fetch_public_ip(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.ip
            .ok_or_else(|| Error::ip_source("connection timed out"))
    }

    fn source_name(&self) -> &str {
        "static"
    }
}

/// An IP source whose implementation panics
pub struct PanickingIpSource;

#[async_trait::async_trait]
impl PublicIpSource for PanickingIpSource {
    async fn fetch_public_ip(&self) -> Result<Ipv4Addr> {
        panic!("ip source blew up");
    }

    fn source_name(&self) -> &str {
        "panicking"
    }
}

/// A provider-side record set keyed by (zone, name)
pub type FakeZone = Arc<Mutex<HashMap<(String, String), (Ipv4Addr, u32)>>>;

/// A mock RecordUpdater that applies upserts to an in-memory zone
pub struct MockUpdater {
    upsert_call_count: Arc<AtomicUsize>,
    changes: Arc<Mutex<Vec<RecordChange>>>,
    zone: FakeZone,
    rejection: Option<String>,
}

impl MockUpdater {
    pub fn new() -> Self {
        Self {
            upsert_call_count: Arc::new(AtomicUsize::new(0)),
            changes: Arc::new(Mutex::new(Vec::new())),
            zone: Arc::new(Mutex::new(HashMap::new())),
            rejection: None,
        }
    }

    /// An updater whose provider rejects every change with `message`
    pub fn rejecting(message: &str) -> Self {
        Self {
            rejection: Some(message.to_string()),
            ..Self::new()
        }
    }

    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    pub fn changes(&self) -> Vec<RecordChange> {
        self.changes.lock().unwrap().clone()
    }

    /// Snapshot of the fake zone
    pub fn zone_state(&self) -> HashMap<(String, String), (Ipv4Addr, u32)> {
        self.zone.lock().unwrap().clone()
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            upsert_call_count: Arc::clone(&other.upsert_call_count),
            changes: Arc::clone(&other.changes),
            zone: Arc::clone(&other.zone),
            rejection: other.rejection.clone(),
        }
    }
}

#[async_trait::async_trait]
impl RecordUpdater for MockUpdater {
    async fn upsert(&self, change: &RecordChange) -> Result<UpsertResult> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        self.changes.lock().unwrap().push(change.clone());

        if let Some(message) = &self.rejection {
            return Err(Error::provider("mock", message.clone()));
        }

        self.zone.lock().unwrap().insert(
            (change.hosted_zone_id.clone(), change.record_name.clone()),
            (change.ip, change.ttl),
        );
        Ok(UpsertResult::Submitted)
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// How a [`MockSessionProvider`] responds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBehavior {
    Succeeds,
    NoCredentials,
    IncompleteCredentials,
    Rejected,
}

/// A mock SessionProvider handing out updaters that share counters
pub struct MockSessionProvider {
    behavior: SessionBehavior,
    session_call_count: Arc<AtomicUsize>,
    updater: MockUpdater,
}

impl MockSessionProvider {
    pub fn new(behavior: SessionBehavior, updater: &MockUpdater) -> Self {
        Self {
            behavior,
            session_call_count: Arc::new(AtomicUsize::new(0)),
            updater: MockUpdater::sharing_counters_with(updater),
        }
    }

    pub fn session_call_count(&self) -> usize {
        self.session_call_count.load(Ordering::SeqCst)
    }

    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            behavior: other.behavior,
            session_call_count: Arc::clone(&other.session_call_count),
            updater: MockUpdater::sharing_counters_with(&other.updater),
        }
    }
}

#[async_trait::async_trait]
impl SessionProvider for MockSessionProvider {
    async fn establish_session(&self) -> Result<Box<dyn RecordUpdater>> {
        self.session_call_count.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            SessionBehavior::Succeeds => {
                Ok(Box::new(MockUpdater::sharing_counters_with(&self.updater)))
            }
            SessionBehavior::NoCredentials => {
                Err(Error::no_credentials("no providers in chain provided credentials"))
            }
            SessionBehavior::IncompleteCredentials => {
                Err(Error::incomplete_credentials("secret access key is missing"))
            }
            SessionBehavior::Rejected => Err(Error::auth("the security token is invalid")),
        }
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Everything a contract test needs to inspect after a run
pub struct Harness {
    pub reconciler: Reconciler,
    pub lookup: StaticLookup,
    pub ip_source: StaticIpSource,
    pub sessions: MockSessionProvider,
    pub updater: MockUpdater,
}

/// Build a reconciler around the given doubles, keeping observers
pub fn harness(
    lookup: StaticLookup,
    ip_source: StaticIpSource,
    session: SessionBehavior,
    updater: MockUpdater,
) -> Harness {
    let sessions = MockSessionProvider::new(session, &updater);

    let reconciler = Reconciler::new(
        target(),
        Box::new(StaticLookup::sharing_counters_with(&lookup)),
        Box::new(StaticIpSource::sharing_counters_with(&ip_source)),
        Box::new(MockSessionProvider::sharing_counters_with(&sessions)),
    )
    .expect("reconciler construction succeeds");

    Harness {
        reconciler,
        lookup,
        ip_source,
        sessions,
        updater,
    }
}
