use async_trait::async_trait;
use log::{error, info};
use rusoto_core::request::TlsError;
use rusoto_core::{HttpClient, RusotoError};
use rusoto_credential::StaticProvider;
use rusoto_ec2::{DescribeInstancesError, DescribeInstancesRequest, Ec2, Ec2Client, Reservation};
use rusoto_signature::Region;
use serde::Serialize;
use std::str::FromStr;

use crate::credentials::AwsCredentials;

// -----------------------------------------------------------------------------
// Models
// -----------------------------------------------------------------------------

pub const DEFAULT_REGION: &str = "us-east-1";
pub const SUPPORTED_REGIONS: [&str; 4] = ["us-east-1", "us-west-2", "eu-west-1", "ap-southeast-1"];
pub const UNNAMED_INSTANCE: &str = "N/A";

const NAME_TAG: &str = "Name";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub name: String,
    pub instance_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Ec2Error {
    #[error("Error getting EC2 instances: invalid region {0}")]
    InvalidRegion(String),
    #[error("Error getting EC2 instances: {0}")]
    Tls(#[from] TlsError),
    #[error("Error getting EC2 instances: {0}")]
    Describe(#[from] RusotoError<DescribeInstancesError>),
}

#[async_trait]
pub trait InstanceLister: Send + Sync {
    async fn list_instances(
        &self,
        credentials: &AwsCredentials,
        region: &str,
    ) -> Result<Vec<InstanceSummary>, Ec2Error>;
}

/// Lists instances through the real EC2 API.
pub struct Ec2InstanceLister;

#[async_trait]
impl InstanceLister for Ec2InstanceLister {
    async fn list_instances(
        &self,
        credentials: &AwsCredentials,
        region: &str,
    ) -> Result<Vec<InstanceSummary>, Ec2Error> {
        get_ec2_instances(credentials, region).await
    }
}

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

pub fn parse_region(region: &str) -> Result<Region, Ec2Error> {
    Region::from_str(region).map_err(|_| Ec2Error::InvalidRegion(region.to_string()))
}

pub async fn get_ec2_instances(
    credentials: &AwsCredentials,
    region: &str,
) -> Result<Vec<InstanceSummary>, Ec2Error> {
    let result = describe_all(credentials, region).await;
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

async fn describe_all(
    credentials: &AwsCredentials,
    region: &str,
) -> Result<Vec<InstanceSummary>, Ec2Error> {
    let region = parse_region(region)?;
    let provider = StaticProvider::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        Some(credentials.session_token.clone()),
        None,
    );
    let ec2_client = Ec2Client::new_with(HttpClient::new()?, provider, region.clone());
    info!("Created AWS session for region: {}", region.name());

    let mut reservations = Vec::new();
    let mut next_token = None;
    loop {
        let describe_instances_req = DescribeInstancesRequest {
            next_token: next_token.take(),
            ..Default::default()
        };

        let result = ec2_client.describe_instances(describe_instances_req).await?;
        reservations.extend(result.reservations.unwrap_or_default());

        match result.next_token {
            Some(token) if !token.is_empty() => next_token = Some(token),
            _ => break,
        }
    }
    info!("Retrieved EC2 instances from region: {}", region.name());

    let instances = extract_instances(&reservations);
    info!("Found {} EC2 instances", instances.len());

    Ok(instances)
}

/// One summary per instance, in response order.
pub fn extract_instances(reservations: &[Reservation]) -> Vec<InstanceSummary> {
    reservations
        .iter()
        .flat_map(|reservation| reservation.instances.iter().flatten())
        .map(|instance| {
            let name = instance
                .tags
                .iter()
                .flatten()
                .find(|tag| tag.key.as_deref() == Some(NAME_TAG))
                .and_then(|tag| tag.value.clone())
                .unwrap_or_else(|| UNNAMED_INSTANCE.to_string());

            InstanceSummary {
                name,
                instance_id: instance.instance_id.clone().unwrap_or_default(),
            }
        })
        .collect()
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
