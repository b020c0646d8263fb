use async_trait::async_trait;
use aws_sdk_ssm::Client as SsmClient;
use tracing::{debug, error};

use crate::errors::BotError;

/// Keyed secret lookup used by the function adapter at invocation start.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the secret is missing or the store is unreachable.
    async fn get_secret(&self, name: &str) -> Result<String, BotError>;
}

/// AWS SSM Parameter Store, reading `SecureString` parameters with decryption.
pub struct SsmSecretStore {
    client: SsmClient,
}

impl SsmSecretStore {
    #[must_use]
    pub fn new(client: SsmClient) -> Self {
        Self { client }
    }

    /// Builds a client from the Lambda's ambient AWS configuration.
    pub async fn from_env() -> Self {
        let shared = aws_config::from_env().load().await;
        Self::new(SsmClient::new(&shared))
    }
}

#[async_trait]
impl SecretStore for SsmSecretStore {
    async fn get_secret(&self, name: &str) -> Result<String, BotError> {
        debug!(parameter = %name, "Reading SSM parameter");

        let resp = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| {
                error!(parameter = %name, "ssm get_parameter failed: {}", e);
                BotError::AwsError(format!("Failed to get SSM parameter {name}: {e}"))
            })?;

        resp.parameter
            .as_ref()
            .and_then(|p| p.value())
            .map(ToString::to_string)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| BotError::AwsError(format!("SSM parameter {name} has no value")))
    }
}
