//! Error types for dynr53
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dynr53 operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dynr53
#[derive(Error, Debug)]
pub enum Error {
    /// Public-IP source errors
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Current-value lookup errors
    #[error("DNS lookup error: {0}")]
    Lookup(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// No credentials could be found in any configured source
    #[error("No credentials found: {0}")]
    NoCredentials(String),

    /// Credentials were found but are missing required parts
    #[error("Incomplete credentials: {0}")]
    IncompleteCredentials(String),

    /// Credentials were rejected or the caller is not permitted
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a lookup error
    pub fn lookup(msg: impl Into<String>) -> Self {
        Self::Lookup(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create a "no credentials" error
    pub fn no_credentials(msg: impl Into<String>) -> Self {
        Self::NoCredentials(msg.into())
    }

    /// Create an "incomplete credentials" error
    pub fn incomplete_credentials(msg: impl Into<String>) -> Self {
        Self::IncompleteCredentials(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error is one of the credential failures
    pub fn is_credential_error(&self) -> bool {
        matches!(
            self,
            Self::NoCredentials(_) | Self::IncompleteCredentials(_) | Self::Authentication(_)
        )
    }
}
