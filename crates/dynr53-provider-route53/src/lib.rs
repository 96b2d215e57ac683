// # Route 53 DNS Provider
//
// This crate provides the Amazon Route 53 collaborators for dynr53.
//
// ## Components
//
// - `Route53SessionProvider`: checks that credentials resolve and are
//   complete, then calls STS GetCallerIdentity before handing out an updater
// - `Route53Updater`: submits a single-change UPSERT batch through
//   ChangeResourceRecordSets
// - `Route53RecordLookup`: reads the authoritative A value through
//   ListResourceRecordSets
//
// ## Architectural Constraints
//
// - One API call per operation (plus the identity check when opening a session)
// - No retries: the SDK's retry layer is disabled in `load_sdk_config`
// - Every call carries the configured operation timeout
// - No state beyond a single run
//
// ## Required IAM Permissions
//
// ```json
// {
//   "Version": "2012-10-17",
//   "Statement": [
//     { "Effect": "Allow", "Action": "route53:ChangeResourceRecordSets",
//       "Resource": "arn:aws:route53:::hostedzone/*" },
//     { "Effect": "Allow", "Action": "route53:ListResourceRecordSets",
//       "Resource": "arn:aws:route53:::hostedzone/*" }
//   ]
// }
// ```
//
// `ListResourceRecordSets` is only needed with the `route53` lookup strategy.
// GetCallerIdentity needs no permission.

mod lookup;
mod session;
mod updater;

pub use lookup::{
    Route53RecordLookup, first_matching_value, same_record_name, unescape_record_name,
};
pub use session::{Route53SessionProvider, classify_credentials_error, verify_credentials};
pub use updater::{Route53Updater, record_set, upsert_batch};

use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_route53::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use dynr53_core::{Dynr53Config, Error};
use std::time::Duration;

/// Provider name used in logs and errors
pub const PROVIDER_NAME: &str = "route53";

/// Region used to sign requests when none is configured (Route 53 is global)
pub const DEFAULT_REGION: &str = "us-east-1";

/// Settings for building AWS clients
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwsSettings {
    /// Named profile; `None` uses the default credential chain
    pub profile: Option<String>,

    /// Operation timeout for every AWS call
    pub timeout: Duration,

    /// If true, updaters log the change instead of submitting it
    pub dry_run: bool,
}

impl AwsSettings {
    /// Derive AWS settings from the run configuration
    pub fn from_config(config: &Dynr53Config) -> Self {
        Self {
            profile: config.aws_profile.clone(),
            timeout: config.timeout(),
            dry_run: config.is_dry_run(),
        }
    }
}

/// Load the shared AWS configuration
///
/// Region falls back to [`DEFAULT_REGION`], SDK retries are disabled and the
/// operation timeout is applied. Loading does not contact AWS and does not
/// validate credentials.
pub async fn load_sdk_config(settings: &AwsSettings) -> SdkConfig {
    let region = RegionProviderChain::default_provider().or_else(Region::new(DEFAULT_REGION));

    let timeouts = TimeoutConfig::builder()
        .operation_timeout(settings.timeout)
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .timeout_config(timeouts)
        .retry_config(RetryConfig::disabled());

    if let Some(profile) = &settings.profile {
        tracing::debug!("Using AWS profile: {}", profile);
        loader = loader.profile_name(profile);
    }

    loader.load().await
}

/// Map an SDK error to a dynr53 error, keeping the service's code and message
pub(crate) fn classify_sdk_error<E, R>(operation: &str, err: SdkError<E, R>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if let Some(service_err) = err.as_service_error() {
        return classify_service_code(
            operation,
            service_err.code().unwrap_or("Unknown"),
            service_err.message().unwrap_or("no message"),
        );
    }

    match &err {
        SdkError::TimeoutError(_) => {
            Error::provider(PROVIDER_NAME, format!("{} timed out", operation))
        }
        _ => Error::provider(
            PROVIDER_NAME,
            format!("{} failed: {}", operation, DisplayErrorContext(&err)),
        ),
    }
}

/// Map a service error code to the matching error category
pub(crate) fn classify_service_code(operation: &str, code: &str, message: &str) -> Error {
    let detail = format!("{}: {}: {}", operation, code, message);

    match code {
        "AccessDenied"
        | "AccessDeniedException"
        | "InvalidClientTokenId"
        | "SignatureDoesNotMatch"
        | "ExpiredToken"
        | "UnrecognizedClientException" => Error::auth(detail),
        "Throttling" | "ThrottlingException" | "PriorRequestNotComplete" => {
            Error::rate_limited(detail)
        }
        _ => Error::provider(PROVIDER_NAME, detail),
    }
}
