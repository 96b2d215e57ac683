//! Contract Test: Failure Containment
//!
//! This test verifies that no failure crosses the run boundary.
//!
//! Constraints verified:
//! - A panicking collaborator ends the run with `RunFailure::Unexpected`
//! - The reconciler rejects an invalid target at construction time
//! - The target's zone ID is passed to the updater without its prefix
//!
//! If this test fails, a bad collaborator can crash the process.

mod common;

use common::*;
use dynr53_core::{Reconciler, RunFailure, TargetRecord};

#[tokio::test]
async fn panicking_collaborator_becomes_unexpected_failure() {
    let updater = MockUpdater::new();
    let sessions = MockSessionProvider::new(SessionBehavior::Succeeds, &updater);

    let reconciler = Reconciler::new(
        target(),
        Box::new(StaticLookup::found("1.2.3.4")),
        Box::new(PanickingIpSource),
        Box::new(MockSessionProvider::sharing_counters_with(&sessions)),
    )
    .expect("reconciler construction succeeds");

    let outcome = reconciler.run().await;

    match outcome.failure() {
        Some(RunFailure::Unexpected(message)) => {
            assert!(message.contains("ip source blew up"), "{}", message);
        }
        other => panic!("expected an unexpected failure, got {:?}", other),
    }
    assert_eq!(sessions.session_call_count(), 0);
    assert_eq!(updater.upsert_call_count(), 0);
}

#[tokio::test]
async fn invalid_target_is_rejected_up_front() {
    let updater = MockUpdater::new();

    let result = Reconciler::new(
        TargetRecord::new("", RECORD_NAME),
        Box::new(StaticLookup::found("1.2.3.4")),
        Box::new(StaticIpSource::returning("5.6.7.8")),
        Box::new(MockSessionProvider::new(SessionBehavior::Succeeds, &updater)),
    );

    assert!(result.is_err());
}

#[tokio::test]
async fn prefixed_zone_id_is_normalized_in_change() {
    let updater = MockUpdater::new();

    let reconciler = Reconciler::new(
        TargetRecord::new(format!("/hostedzone/{}", ZONE_ID), RECORD_NAME).with_ttl(60),
        Box::new(StaticLookup::new(LookupAnswer::Missing)),
        Box::new(StaticIpSource::returning("5.6.7.8")),
        Box::new(MockSessionProvider::new(SessionBehavior::Succeeds, &updater)),
    )
    .expect("reconciler construction succeeds");

    assert!(reconciler.run().await.is_success());

    let changes = updater.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].hosted_zone_id, ZONE_ID);
    assert_eq!(changes[0].ttl, 60);
}
