//! Authoritative record lookup through ListResourceRecordSets

use async_trait::async_trait;
use aws_sdk_route53::types::{ResourceRecordSet, RrType};
use dynr53_core::config::LookupStrategy;
use dynr53_core::traits::RecordLookup;
use dynr53_core::{Error, Result};
use std::net::Ipv4Addr;

use crate::{AwsSettings, classify_sdk_error, load_sdk_config};

/// Reads the A value stored in the hosted zone itself
///
/// Unlike the resolver lookup this sees changes as soon as Route 53 accepts
/// them, but it needs credentials and `route53:ListResourceRecordSets`.
pub struct Route53RecordLookup {
    client: aws_sdk_route53::Client,
    hosted_zone_id: String,
}

impl Route53RecordLookup {
    /// Build a lookup with its own client
    pub async fn connect(settings: &AwsSettings, hosted_zone_id: impl Into<String>) -> Self {
        let sdk_config = load_sdk_config(settings).await;
        Self::from_client(aws_sdk_route53::Client::new(&sdk_config), hosted_zone_id)
    }

    /// Build a lookup over an existing client
    pub fn from_client(client: aws_sdk_route53::Client, hosted_zone_id: impl Into<String>) -> Self {
        Self {
            client,
            hosted_zone_id: hosted_zone_id.into(),
        }
    }
}

impl std::fmt::Debug for Route53RecordLookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route53RecordLookup")
            .field("hosted_zone_id", &self.hosted_zone_id)
            .finish_non_exhaustive()
    }
}

/// Compare record names, ignoring a trailing dot and ASCII case
///
/// Octal escapes as returned by Route 53 (`\052` for `*`) are decoded first.
pub fn same_record_name(a: &str, b: &str) -> bool {
    let a = unescape_record_name(a);
    let b = unescape_record_name(b);
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}

/// Decode `\NNN` octal escapes in a record name
///
/// A backslash not followed by three octal digits is kept as is.
pub fn unescape_record_name(name: &str) -> String {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\'
            && let Some(digits) = bytes.get(i + 1..i + 4)
            && digits.iter().all(|d| (b'0'..=b'7').contains(d))
        {
            let value = digits
                .iter()
                .fold(0u16, |acc, d| acc * 8 + u16::from(d - b'0'));
            if let Ok(byte) = u8::try_from(value) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Extract the A value for `record_name` from a listing page
///
/// The listing starts at the requested name and type, so the first set is
/// only ours if both match. Alias records carry no values and count as
/// absent.
pub fn first_matching_value(
    sets: &[ResourceRecordSet],
    record_name: &str,
) -> Result<Option<Ipv4Addr>> {
    let Some(set) = sets.first() else {
        return Ok(None);
    };

    if !same_record_name(set.name(), record_name) || set.r#type() != &RrType::A {
        return Ok(None);
    }

    let Some(record) = set.resource_records().first() else {
        tracing::debug!("{} is an alias record; treating as absent", record_name);
        return Ok(None);
    };

    record
        .value()
        .trim()
        .parse::<Ipv4Addr>()
        .map(Some)
        .map_err(|_| {
            Error::lookup(format!(
                "Route 53 returned a non-IPv4 value for {}: {}",
                record_name,
                record.value()
            ))
        })
}

#[async_trait]
impl RecordLookup for Route53RecordLookup {
    async fn fetch_current_value(&self, record_name: &str) -> Result<Option<Ipv4Addr>> {
        tracing::debug!(
            "Listing A record {} in hosted zone {}",
            record_name,
            self.hosted_zone_id
        );

        let response = self
            .client
            .list_resource_record_sets()
            .hosted_zone_id(&self.hosted_zone_id)
            .start_record_name(record_name)
            .start_record_type(RrType::A)
            .max_items(1)
            .send()
            .await
            .map_err(|e| classify_sdk_error("ListResourceRecordSets", e))?;

        first_matching_value(response.resource_record_sets(), record_name)
    }

    fn strategy(&self) -> LookupStrategy {
        LookupStrategy::Route53
    }
}
