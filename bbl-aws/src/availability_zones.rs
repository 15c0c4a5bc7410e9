//! Availability zone discovery over EC2

use async_trait::async_trait;
use aws_sdk_ec2::types::Filter;
use bbl_core::CoreError;
use bbl_core::managers::AvailabilityZoneRetriever;

pub struct Ec2AvailabilityZoneRetriever {
    client: aws_sdk_ec2::Client,
}

impl Ec2AvailabilityZoneRetriever {
    pub fn new(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AvailabilityZoneRetriever for Ec2AvailabilityZoneRetriever {
    async fn retrieve(&self, region: &str) -> Result<Vec<String>, CoreError> {
        let response = self
            .client
            .describe_availability_zones()
            .filters(
                Filter::builder()
                    .name("region-name")
                    .values(region)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                CoreError::AvailabilityZones(format!(
                    "failed to retrieve availability zones: {:?}",
                    e
                ))
            })?;

        Ok(response
            .availability_zones()
            .iter()
            .filter_map(|zone| zone.zone_name().map(str::to_string))
            .collect())
    }
}
