//! Configuration types for dynr53
//!
//! A [`Dynr53Config`] is built once at process start and passed by value to
//! whatever wires the collaborators together. Nothing in this crate reads the
//! environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default record TTL in seconds
pub const DEFAULT_TTL: u32 = 300;

/// Largest TTL Route 53 accepts
pub const MAX_TTL: u32 = 2_147_483_647;

/// Default public-IP endpoint (plain-text body)
pub const DEFAULT_IP_SOURCE_URL: &str = "https://api.ipify.org";

/// Default per-call timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

/// Main dynr53 configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dynr53Config {
    /// The record kept in sync
    pub target: TargetRecord,

    /// How the currently advertised value is read
    #[serde(default)]
    pub lookup: LookupStrategy,

    /// URL of the public-IP endpoint
    #[serde(default = "default_ip_source_url")]
    pub ip_source_url: String,

    /// Timeout applied to every outbound call, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Live or dry-run
    #[serde(default)]
    pub mode: RunMode,

    /// Named AWS profile; `None` uses the default credential chain
    #[serde(default)]
    pub aws_profile: Option<String>,
}

impl Dynr53Config {
    /// Create a new configuration with defaults for everything but the target
    pub fn new(target: TargetRecord) -> Self {
        Self {
            target,
            lookup: LookupStrategy::default(),
            ip_source_url: default_ip_source_url(),
            timeout_secs: default_timeout_secs(),
            mode: RunMode::default(),
            aws_profile: None,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.target.validate()?;

        let url = self.ip_source_url.as_str();
        if url.is_empty() {
            return Err(crate::Error::config("IP source URL cannot be empty"));
        }
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(crate::Error::config(format!(
                "IP source URL must use HTTP or HTTPS scheme. Got: {}",
                url
            )));
        }

        if !(1..=60).contains(&self.timeout_secs) {
            return Err(crate::Error::config(format!(
                "Timeout must be between 1 and 60 seconds. Got: {}",
                self.timeout_secs
            )));
        }

        if let Some(profile) = &self.aws_profile
            && profile.trim().is_empty()
        {
            return Err(crate::Error::config("AWS profile name cannot be empty"));
        }

        Ok(())
    }

    /// The per-call timeout as a `Duration`
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether writes should be skipped
    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::DryRun
    }
}

/// Identity of the record kept in sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRecord {
    /// Hosted zone ID (a `/hostedzone/` prefix is tolerated)
    pub hosted_zone_id: String,

    /// Fully-qualified record name (a trailing dot is tolerated)
    pub record_name: String,

    /// Time-to-live in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

impl TargetRecord {
    /// Create a new target with the default TTL
    pub fn new(hosted_zone_id: impl Into<String>, record_name: impl Into<String>) -> Self {
        Self {
            hosted_zone_id: hosted_zone_id.into(),
            record_name: record_name.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Set the TTL
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// The hosted zone ID without any `/hostedzone/` prefix
    pub fn zone_id(&self) -> &str {
        let id = self.hosted_zone_id.trim();
        id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id)
    }

    /// Validate the target
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.zone_id().is_empty() {
            return Err(crate::Error::config("Hosted zone ID cannot be empty"));
        }

        validate_domain_name(&self.record_name)?;

        if self.ttl > MAX_TTL {
            return Err(crate::Error::config(format!(
                "TTL must be at most {} seconds. Got: {}",
                MAX_TTL, self.ttl
            )));
        }

        Ok(())
    }
}

/// How the currently advertised value is read
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
    /// Standard resolver lookup (what the internet sees)
    #[default]
    Resolver,
    /// Provider record-set query (authoritative)
    Route53,
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStrategy::Resolver => f.write_str("resolver"),
            LookupStrategy::Route53 => f.write_str("route53"),
        }
    }
}

impl FromStr for LookupStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "resolver" | "dns" => Ok(LookupStrategy::Resolver),
            "route53" => Ok(LookupStrategy::Route53),
            other => Err(crate::Error::config(format!(
                "Unknown lookup strategy '{}'. Supported: resolver, route53",
                other
            ))),
        }
    }
}

/// Whether the upsert is actually submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunMode {
    /// Submit changes
    #[default]
    Live,
    /// Perform every read, log the change, submit nothing
    DryRun,
}

impl FromStr for RunMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "live" => Ok(RunMode::Live),
            "dry-run" | "dryrun" => Ok(RunMode::DryRun),
            other => Err(crate::Error::config(format!(
                "Unknown mode '{}'. Supported: live, dry-run",
                other
            ))),
        }
    }
}

/// Validate that a string is a usable record name
///
/// Basic RFC 1035 checks: total length, label length, label characters.
/// A single trailing dot is accepted, as is a leading `*` wildcard label.
/// Underscores are allowed since Route 53 accepts them.
pub fn validate_domain_name(domain: &str) -> Result<(), crate::Error> {
    let name = domain.strip_suffix('.').unwrap_or(domain);

    if name.is_empty() {
        return Err(crate::Error::config("Record name cannot be empty"));
    }

    if name.len() > 253 {
        return Err(crate::Error::config(format!(
            "Record name too long: {} chars (max 253). Got: {}",
            name.len(),
            domain
        )));
    }

    if !name.contains('.') {
        return Err(crate::Error::config(format!(
            "Record name must be fully qualified. Got: '{}'",
            domain
        )));
    }

    for (index, label) in name.split('.').enumerate() {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Record name has empty label: '{}'",
                domain
            )));
        }

        if index == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Record label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(crate::Error::config(format!(
                "Record label contains invalid characters. Label: '{}'. \
                Valid: alphanumeric, hyphen and underscore only.",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(crate::Error::config(format!(
                "Record label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_ttl() -> u32 {
    DEFAULT_TTL
}

fn default_ip_source_url() -> String {
    DEFAULT_IP_SOURCE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
