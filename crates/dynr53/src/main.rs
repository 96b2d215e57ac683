// # dynr53 - Route 53 Dynamic DNS Agent
//
// This binary is a THIN integration layer:
// - DO NOT add decision logic, DNS logic, or retry logic here
// - The decision procedure lives in dynr53-core
// - Configuration is via environment variables ONLY (a `.env` file in the
//   working directory or a parent is read first; variables already set win)
//
// The binary is responsible for:
// 1. Reading and validating configuration
// 2. Initializing logging and the runtime
// 3. Wiring the IP source, lookup and Route 53 session provider
// 4. Running one reconciliation and mapping its outcome to an exit code
//
// Scheduling is external: run it from cron or a systemd timer.
//
// ## Configuration
//
// ### Target record
// - `HOSTED_ZONE_ID`: Route 53 hosted zone ID (required)
// - `RECORD_NAME`: Fully-qualified record name (required)
// - `TTL`: Record TTL in seconds (default 300)
//
// ### Behavior
// - `DYNR53_LOOKUP`: How to read the current value (resolver, route53)
// - `DYNR53_IP_SOURCE_URL`: Plain-text IP echo service (default https://api.ipify.org)
// - `DYNR53_TIMEOUT_SECS`: Per-call timeout, 1 to 60 (default 5)
// - `DYNR53_MODE`: live or dry-run (default live)
// - `DYNR53_AWS_PROFILE`: Named AWS profile (default credential chain if unset)
//
// ### Output
// - `DYNR53_LOG_LEVEL`: trace, debug, info, warn, error (default info)
// - `DYNR53_OUTPUT`: text or json; json prints the outcome on stdout
//
// AWS credentials and region come from the standard AWS environment
// variables and shared config files.
//
// ## Example
//
// ```bash
// export HOSTED_ZONE_ID=Z0123456789ABC
// export RECORD_NAME=home.example.com
// export TTL=300
//
// dynr53
// ```

use anyhow::Result;
use dynr53_core::{
    Dynr53Config, LookupStrategy, Reconciler, RecordLookup, RunMode, RunOutcome, TargetRecord,
};
use dynr53_ip_http::HttpIpSource;
use dynr53_lookup_dns::DnsRecordLookup;
use dynr53_provider_route53::{AwsSettings, Route53RecordLookup, Route53SessionProvider};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for the possible run endings
///
/// - 0: Record already correct, or updated
/// - 1: Configuration or startup error
/// - 2: The run failed (no public IP, no session, update rejected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dynr53ExitCode {
    /// Record is correct after the run
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Reconciliation ended in failure
    RunFailed = 2,
}

impl From<Dynr53ExitCode> for ExitCode {
    fn from(code: Dynr53ExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&RunOutcome> for Dynr53ExitCode {
    fn from(outcome: &RunOutcome) -> Self {
        if outcome.is_success() {
            Dynr53ExitCode::Success
        } else {
            Dynr53ExitCode::RunFailed
        }
    }
}

/// How the outcome is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    /// Log lines only
    Text,
    /// Log lines on stderr plus one JSON outcome line on stdout
    Json,
}

/// Configuration read from the environment
#[derive(Debug)]
struct EnvConfig {
    run: Dynr53Config,
    log_level: Level,
    output: OutputFormat,
}

impl EnvConfig {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Unset and blank are treated the same
        let get = |key: &str| {
            var(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let hosted_zone_id = get("HOSTED_ZONE_ID").ok_or_else(|| {
            anyhow::anyhow!(
                "HOSTED_ZONE_ID is required. \
                Set it via: export HOSTED_ZONE_ID=Z0123456789ABC"
            )
        })?;

        let record_name = get("RECORD_NAME").ok_or_else(|| {
            anyhow::anyhow!(
                "RECORD_NAME is required. \
                Set it via: export RECORD_NAME=home.example.com"
            )
        })?;

        let mut target = TargetRecord::new(hosted_zone_id, record_name);
        if let Some(ttl) = get("TTL") {
            let ttl = ttl.parse::<u32>().map_err(|_| {
                anyhow::anyhow!("TTL must be a non-negative number of seconds. Got: {}", ttl)
            })?;
            target = target.with_ttl(ttl);
        }

        let mut run = Dynr53Config::new(target);

        if let Some(lookup) = get("DYNR53_LOOKUP") {
            run.lookup = lookup
                .parse::<LookupStrategy>()
                .map_err(|e| anyhow::anyhow!("DYNR53_LOOKUP: {}", e))?;
        }

        if let Some(url) = get("DYNR53_IP_SOURCE_URL") {
            run.ip_source_url = url;
        }

        if let Some(timeout) = get("DYNR53_TIMEOUT_SECS") {
            run.timeout_secs = timeout.parse().map_err(|_| {
                anyhow::anyhow!("DYNR53_TIMEOUT_SECS must be a whole number. Got: {}", timeout)
            })?;
        }

        if let Some(mode) = get("DYNR53_MODE") {
            run.mode = mode
                .parse::<RunMode>()
                .map_err(|e| anyhow::anyhow!("DYNR53_MODE: {}", e))?;
        }

        run.aws_profile = get("DYNR53_AWS_PROFILE");

        run.validate()?;

        let log_level = match get("DYNR53_LOG_LEVEL")
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            other => anyhow::bail!(
                "DYNR53_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                other
            ),
        };

        let output = match get("DYNR53_OUTPUT")
            .unwrap_or_else(|| "text".to_string())
            .to_lowercase()
            .as_str()
        {
            "text" => OutputFormat::Text,
            "json" => OutputFormat::Json,
            other => anyhow::bail!(
                "DYNR53_OUTPUT '{}' is not valid. Valid formats: text, json",
                other
            ),
        };

        Ok(Self {
            run,
            log_level,
            output,
        })
    }
}

/// Load the nearest `.env` file if there is one
fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(anyhow::anyhow!("Failed to read .env file: {}", e)),
    }
}

fn main() -> ExitCode {
    let dotenv_path = match load_dotenv() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Dynr53ExitCode::ConfigError.into();
        }
    };

    let config = match EnvConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return Dynr53ExitCode::ConfigError.into();
        }
    };

    // Logs go to stderr so stdout carries only the JSON outcome
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return Dynr53ExitCode::ConfigError.into();
    }

    if let Some(path) = dotenv_path {
        info!("Loaded environment from {}", path.display());
    }

    let dry_run_prefix = if config.run.is_dry_run() { "[DRY-RUN] " } else { "" };
    info!(
        "{}Syncing {} (zone {}, TTL {}, lookup via {})",
        dry_run_prefix,
        config.run.target.record_name,
        config.run.target.zone_id(),
        config.run.target.ttl,
        config.run.lookup
    );

    // One run makes its calls in sequence; a single thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return Dynr53ExitCode::ConfigError.into();
        }
    };

    let outcome = match rt.block_on(run_once(&config.run)) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("Startup error: {}", e);
            return Dynr53ExitCode::ConfigError.into();
        }
    };

    if config.output == OutputFormat::Json {
        match serde_json::to_string(&outcome) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize outcome: {}", e),
        }
    }

    Dynr53ExitCode::from(&outcome).into()
}

/// Wire the collaborators and run one reconciliation
async fn run_once(config: &Dynr53Config) -> Result<RunOutcome> {
    let settings = AwsSettings::from_config(config);

    let ip_source = HttpIpSource::new(&config.ip_source_url, config.timeout())?;

    let lookup: Box<dyn RecordLookup> = match config.lookup {
        LookupStrategy::Resolver => Box::new(DnsRecordLookup::system(config.timeout())),
        LookupStrategy::Route53 => Box::new(
            Route53RecordLookup::connect(&settings, config.target.zone_id()).await,
        ),
    };

    let sessions = Route53SessionProvider::new(settings);

    let reconciler = Reconciler::new(
        config.target.clone(),
        lookup,
        Box::new(ip_source),
        Box::new(sessions),
    )?;

    Ok(reconciler.run().await)
}
