//! Credential validation and session establishment

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use aws_credential_types::provider::error::CredentialsError;
use aws_sdk_route53::error::DisplayErrorContext;
use dynr53_core::traits::{RecordUpdater, SessionProvider};
use dynr53_core::{Error, Result};

use crate::{AwsSettings, PROVIDER_NAME, Route53Updater, classify_sdk_error, load_sdk_config};

/// Opens authenticated Route 53 sessions
///
/// Each call loads the AWS configuration, resolves credentials, verifies
/// the identity with STS and returns a [`Route53Updater`] bound to it.
#[derive(Debug, Clone)]
pub struct Route53SessionProvider {
    settings: AwsSettings,
}

impl Route53SessionProvider {
    /// Create a new session provider
    pub fn new(settings: AwsSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl SessionProvider for Route53SessionProvider {
    async fn establish_session(&self) -> Result<Box<dyn RecordUpdater>> {
        let sdk_config = load_sdk_config(&self.settings).await;

        verify_credentials(&sdk_config).await?;

        let sts = aws_sdk_sts::Client::new(&sdk_config);
        let identity = sts
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| classify_sdk_error("GetCallerIdentity", e))?;

        tracing::info!(
            "AWS caller identity: {} (account {})",
            identity.arn().unwrap_or("unknown"),
            identity.account().unwrap_or("unknown")
        );

        let client = aws_sdk_route53::Client::new(&sdk_config);
        Ok(Box::new(Route53Updater::new(client, self.settings.dry_run)))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Resolve credentials from the configured chain and check they are usable
///
/// # Returns
///
/// - `Ok(())`: Credentials resolved with both key parts present
/// - `Err(Error::NoCredentials)`: No provider in the chain had any
/// - `Err(Error::IncompleteCredentials)`: Found, but partial or malformed
/// - `Err(Error::Authentication)`: Any other provider failure
pub async fn verify_credentials(sdk_config: &SdkConfig) -> Result<()> {
    let provider = sdk_config
        .credentials_provider()
        .ok_or_else(|| Error::no_credentials("no credentials provider is configured"))?;

    let credentials = provider
        .provide_credentials()
        .await
        .map_err(classify_credentials_error)?;

    check_complete(&credentials)
}

/// Map a credential-chain failure to the matching error variant
pub fn classify_credentials_error(err: CredentialsError) -> Error {
    let detail = DisplayErrorContext(&err).to_string();

    match err {
        CredentialsError::CredentialsNotLoaded(_) => Error::no_credentials(detail),
        CredentialsError::InvalidConfiguration(_) => Error::incomplete_credentials(detail),
        _ => Error::auth(detail),
    }
}

fn check_complete(credentials: &Credentials) -> Result<()> {
    if credentials.access_key_id().trim().is_empty() {
        return Err(Error::incomplete_credentials("access key ID is empty"));
    }
    if credentials.secret_access_key().trim().is_empty() {
        return Err(Error::incomplete_credentials("secret access key is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_credential_types::provider::SharedCredentialsProvider;

    fn config_with(credentials: Credentials) -> SdkConfig {
        SdkConfig::builder()
            .credentials_provider(SharedCredentialsProvider::new(credentials))
            .build()
    }

    #[tokio::test]
    async fn test_missing_provider_is_no_credentials() {
        let config = SdkConfig::builder().build();
        let err = verify_credentials(&config).await.unwrap_err();
        assert!(matches!(err, Error::NoCredentials(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_static_credentials_verify() {
        let config = config_with(Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG/bPxRfiCYEXAMPLEKEY",
            None,
            None,
            "test",
        ));
        assert!(verify_credentials(&config).await.is_ok());
    }

    #[tokio::test]
    async fn test_empty_secret_is_incomplete() {
        let config = config_with(Credentials::new("AKIDEXAMPLE", "", None, None, "test"));
        let err = verify_credentials(&config).await.unwrap_err();
        assert!(matches!(err, Error::IncompleteCredentials(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_empty_key_id_is_incomplete() {
        let config = config_with(Credentials::new(" ", "secret", None, None, "test"));
        let err = verify_credentials(&config).await.unwrap_err();
        assert!(matches!(err, Error::IncompleteCredentials(_)), "{err:?}");
    }

    #[test]
    fn test_credentials_errors_are_classified() {
        assert!(matches!(
            classify_credentials_error(CredentialsError::not_loaded("no profile")),
            Error::NoCredentials(_)
        ));
        assert!(matches!(
            classify_credentials_error(CredentialsError::invalid_configuration(
                "profile is missing aws_secret_access_key"
            )),
            Error::IncompleteCredentials(_)
        ));
        assert!(matches!(
            classify_credentials_error(CredentialsError::provider_error("IMDS unreachable")),
            Error::Authentication(_)
        ));
    }

    #[test]
    fn test_provider_name() {
        let provider = Route53SessionProvider::new(AwsSettings {
            profile: None,
            timeout: std::time::Duration::from_secs(5),
            dry_run: false,
        });
        assert_eq!(provider.provider_name(), "route53");
    }
}
