//! UPSERT submission through ChangeResourceRecordSets

use async_trait::async_trait;
use aws_sdk_route53::error::BuildError;
use aws_sdk_route53::types::{
    Change, ChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet, RrType,
};
use dynr53_core::traits::{RecordChange, RecordUpdater, UpsertResult};
use dynr53_core::{Error, Result};

use crate::{PROVIDER_NAME, classify_sdk_error};

/// Route 53 record updater bound to an authenticated client
pub struct Route53Updater {
    client: aws_sdk_route53::Client,

    /// If true, log the change instead of submitting it
    dry_run: bool,
}

impl Route53Updater {
    /// Create an updater over an already-configured client
    pub fn new(client: aws_sdk_route53::Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }
}

// Custom Debug so client configuration (and its credentials cache) stays out of logs
impl std::fmt::Debug for Route53Updater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53Updater")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

fn build_error(err: BuildError) -> Error {
    Error::invalid_input(format!("cannot build Route 53 change: {}", err))
}

/// Build the A record set for a change: one value, the change's TTL
pub fn record_set(change: &RecordChange) -> Result<ResourceRecordSet> {
    let value = ResourceRecord::builder()
        .value(change.ip.to_string())
        .build()
        .map_err(build_error)?;

    ResourceRecordSet::builder()
        .name(&change.record_name)
        .r#type(RrType::A)
        .ttl(i64::from(change.ttl))
        .resource_records(value)
        .build()
        .map_err(build_error)
}

/// Build a change batch holding exactly one UPSERT
pub fn upsert_batch(change: &RecordChange) -> Result<ChangeBatch> {
    let upsert = Change::builder()
        .action(ChangeAction::Upsert)
        .resource_record_set(record_set(change)?)
        .build()
        .map_err(build_error)?;

    ChangeBatch::builder()
        .comment(format!("dynr53: {} -> {}", change.record_name, change.ip))
        .changes(upsert)
        .build()
        .map_err(build_error)
}

#[async_trait]
impl RecordUpdater for Route53Updater {
    async fn upsert(&self, change: &RecordChange) -> Result<UpsertResult> {
        let batch = upsert_batch(change)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would UPSERT {} A {} (TTL {}) in hosted zone {}",
                change.record_name,
                change.ip,
                change.ttl,
                change.hosted_zone_id
            );
            return Ok(UpsertResult::DryRun);
        }

        tracing::debug!(
            "Submitting UPSERT {} A {} to hosted zone {}",
            change.record_name,
            change.ip,
            change.hosted_zone_id
        );

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&change.hosted_zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| classify_sdk_error("ChangeResourceRecordSets", e))?;

        tracing::debug!("ChangeResourceRecordSets response: {:?}", output);

        Ok(UpsertResult::Submitted)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
