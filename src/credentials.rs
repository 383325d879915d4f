use log::{error, info};
use std::fmt;

use crate::workspace::{TemporaryCredentials, WorkspaceApi, WorkspaceError};

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

/// Temporary AWS credential triple, handed unmodified to the EC2 client.
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("No AWS credentials found in response")]
    NoAwsCredentials,
    #[error("AWS credentials in response are missing {0}")]
    Incomplete(&'static str),
    #[error("Error getting AWS credentials: {0}")]
    Broker(#[from] WorkspaceError),
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

pub fn extract_aws_credentials(
    temp_credentials: TemporaryCredentials,
) -> Result<AwsCredentials, CredentialError> {
    let aws = temp_credentials
        .aws_temp_credentials
        .ok_or(CredentialError::NoAwsCredentials)?;

    Ok(AwsCredentials {
        access_key_id: aws
            .access_key_id
            .ok_or(CredentialError::Incomplete("access_key_id"))?,
        secret_access_key: aws
            .secret_access_key
            .ok_or(CredentialError::Incomplete("secret_access_key"))?,
        session_token: aws
            .session_token
            .ok_or(CredentialError::Incomplete("session_token"))?,
    })
}

/// Asks the Unity Catalog broker for temporary AWS credentials.
pub async fn get_aws_credentials(
    api: &dyn WorkspaceApi,
    service_credential_name: &str,
) -> Result<AwsCredentials, CredentialError> {
    info!(
        "Getting AWS credentials via UC for: {}",
        service_credential_name
    );

    let result = match api
        .generate_temporary_service_credential(service_credential_name)
        .await
    {
        Ok(temp_credentials) => {
            if let Some(expires_at) = temp_credentials
                .expiration_time
                .and_then(chrono::DateTime::<chrono::Utc>::from_timestamp_millis)
            {
                info!("Temporary credentials expire at {}", expires_at.to_rfc3339());
            }
            extract_aws_credentials(temp_credentials)
        }
        Err(err) => Err(CredentialError::Broker(err)),
    };

    match &result {
        Ok(_) => info!("Successfully obtained AWS credentials"),
        Err(err) => error!("{}", err),
    }

    result
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::{AwsTempCredentials, DownloadResponse};
    use async_trait::async_trait;

    struct FakeBroker {
        response: Option<TemporaryCredentials>,
    }

    #[async_trait]
    impl WorkspaceApi for FakeBroker {
        async fn generate_temporary_service_credential(
            &self,
            credential_name: &str,
        ) -> Result<TemporaryCredentials, WorkspaceError> {
            self.response.clone().ok_or_else(|| WorkspaceError::Api {
                status: 404,
                error_code: Some("CREDENTIAL_DOES_NOT_EXIST".to_string()),
                message: format!("Credential '{}' does not exist.", credential_name),
            })
        }

        async fn download_file(&self, _path: &str) -> Result<DownloadResponse, WorkspaceError> {
            unreachable!("not used by credential tests")
        }
    }

    fn full_aws() -> AwsTempCredentials {
        AwsTempCredentials {
            access_key_id: Some("ASIAEXAMPLE".to_string()),
            secret_access_key: Some("secret".to_string()),
            session_token: Some("session".to_string()),
            access_point: None,
        }
    }

    #[test]
    fn test_extract_populated_triple() {
        let creds = extract_aws_credentials(TemporaryCredentials {
            aws_temp_credentials: Some(full_aws()),
            expiration_time: None,
        })
        .expect("Failed to extract credentials");

        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
        assert_eq!(creds.secret_access_key, "secret");
        assert_eq!(creds.session_token, "session");
    }

    #[test]
    fn test_extract_without_aws_section() {
        let err = extract_aws_credentials(TemporaryCredentials::default()).unwrap_err();

        assert!(matches!(err, CredentialError::NoAwsCredentials));
        assert_eq!(err.to_string(), "No AWS credentials found in response");
    }

    #[test]
    fn test_extract_incomplete_triple() {
        let err = extract_aws_credentials(TemporaryCredentials {
            aws_temp_credentials: Some(AwsTempCredentials {
                session_token: None,
                ..full_aws()
            }),
            expiration_time: None,
        })
        .unwrap_err();

        assert!(matches!(err, CredentialError::Incomplete("session_token")));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = AwsCredentials {
            access_key_id: "ASIAEXAMPLE".to_string(),
            secret_access_key: "top-secret".to_string(),
            session_token: "token".to_string(),
        };

        let debug = format!("{:?}", creds);
        assert!(debug.contains("ASIAEXAMPLE"));
        assert!(!debug.contains("top-secret"));
    }

    #[tokio::test]
    async fn test_get_aws_credentials() {
        let broker = FakeBroker {
            response: Some(TemporaryCredentials {
                aws_temp_credentials: Some(full_aws()),
                expiration_time: Some(1_700_000_000_000),
            }),
        };

        let creds = get_aws_credentials(&broker, "aws-creds")
            .await
            .expect("Failed to get credentials");
        assert_eq!(creds.access_key_id, "ASIAEXAMPLE");
    }

    #[tokio::test]
    async fn test_get_aws_credentials_broker_error() {
        let broker = FakeBroker { response: None };

        let err = get_aws_credentials(&broker, "missing").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error getting AWS credentials: Credential 'missing' does not exist. (HTTP 404)"
        );
    }
}
