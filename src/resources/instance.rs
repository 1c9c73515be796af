//! Compute instance resource.
//!
//! The instance references the resolved image and the security group by
//! address; the engine substitutes the provider ids once those resources are
//! ready. Identification is by Name tag, so re-applying adopts a live
//! instance instead of launching a second one.

use std::collections::HashMap;
use std::time::Duration;

use aws_sdk_ec2::types::{
    Filter, IamInstanceProfileSpecification, InstanceStateName, InstanceType, ResourceType, Tag,
    TagSpecification,
};
use aws_sdk_ec2::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resources::{ResourceAddr, ResourceKind};

/// Specification of a compute instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    /// Instance name (used as the Name tag).
    pub name: String,
    /// Machine size, e.g. `t2.micro`.
    pub instance_type: String,
    /// Address of the image lookup supplying the machine image.
    pub image: ResourceAddr,
    /// Address of the security group attached to the instance.
    pub security_group: ResourceAddr,
    /// Name of the pre-provisioned key pair for administrative access.
    pub key_name: String,
    /// Permission profile attached to the instance.
    pub instance_profile: Option<String>,
}

impl InstanceSpec {
    /// The address of this instance.
    pub fn addr(&self) -> ResourceAddr {
        ResourceAddr::new(ResourceKind::Instance, &self.name)
    }

    /// Finds a live (non-terminated) instance carrying this spec's Name tag.
    pub async fn find(&self, client: &Client) -> Result<Option<InstanceInfo>> {
        let resp = client
            .describe_instances()
            .filters(Filter::builder().name("tag:Name").values(&self.name).build())
            .filters(
                Filter::builder()
                    .name("instance-state-name")
                    .values("pending")
                    .values("running")
                    .values("stopping")
                    .values("stopped")
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::provider("DescribeInstances", e.to_string()))?;

        for reservation in resp.reservations() {
            if let Some(instance) = reservation.instances().first() {
                return Ok(Some(InstanceInfo::from_api(instance)));
            }
        }
        Ok(None)
    }

    /// Launches the instance with the given resolved references.
    pub async fn create(
        &self,
        client: &Client,
        image_id: &str,
        security_group_id: &str,
    ) -> Result<InstanceInfo> {
        let instance_type = self.instance_type.parse::<InstanceType>().map_err(|_| {
            Error::StackValidation(format!("invalid instance type '{}'", self.instance_type))
        })?;

        let mut req = client
            .run_instances()
            .image_id(image_id)
            .instance_type(instance_type)
            .key_name(&self.key_name)
            .security_group_ids(security_group_id)
            .min_count(1)
            .max_count(1)
            .tag_specifications(
                TagSpecification::builder()
                    .resource_type(ResourceType::Instance)
                    .tags(Tag::builder().key("Name").value(&self.name).build())
                    .build(),
            );

        if let Some(ref profile) = self.instance_profile {
            req = req.iam_instance_profile(
                IamInstanceProfileSpecification::builder()
                    .name(profile)
                    .build(),
            );
        }

        let resp = req
            .send()
            .await
            .map_err(|e| Error::provider("RunInstances", e.to_string()))?;

        let instance = resp.instances().first().ok_or_else(|| {
            Error::provider("RunInstances", "response contained no instances".to_string())
        })?;

        let info = InstanceInfo::from_api(instance);
        tracing::info!(
            instance_id = %info.instance_id,
            image_id = %image_id,
            instance_type = %self.instance_type,
            "Launched instance '{}'",
            self.name
        );
        Ok(info)
    }

    /// Starts a stopped instance.
    pub async fn start(&self, client: &Client, instance_id: &str) -> Result<()> {
        client
            .start_instances()
            .instance_ids(instance_id)
            .send()
            .await
            .map_err(|e| Error::provider("StartInstances", e.to_string()))?;

        tracing::info!(
            instance_id = %instance_id,
            "Started instance '{}'",
            self.name
        );
        Ok(())
    }

    /// Polls until the instance is running, then returns its final info. The
    /// public DNS name is only populated once the instance is running, so
    /// callers that need the output must wait.
    pub async fn wait_until_running(
        &self,
        client: &Client,
        instance_id: &str,
        timeout: Duration,
    ) -> Result<InstanceInfo> {
        let start = std::time::Instant::now();
        let poll_interval = Duration::from_secs(5);

        loop {
            if start.elapsed() >= timeout {
                return Err(Error::WaitTimeout {
                    address: self.addr().to_string(),
                    timeout_secs: timeout.as_secs(),
                });
            }

            let resp = client
                .describe_instances()
                .instance_ids(instance_id)
                .send()
                .await
                .map_err(|e| Error::provider("DescribeInstances", e.to_string()))?;

            for reservation in resp.reservations() {
                for instance in reservation.instances() {
                    let running = instance
                        .state()
                        .and_then(|s| s.name())
                        .is_some_and(|name| *name == InstanceStateName::Running);
                    if running {
                        return Ok(InstanceInfo::from_api(instance));
                    }
                }
            }

            tracing::debug!(
                instance_id = %instance_id,
                elapsed_secs = start.elapsed().as_secs(),
                "Instance not yet running"
            );
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// An instance as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceInfo {
    /// Provider instance id.
    pub instance_id: String,
    /// Current lifecycle state.
    pub state: String,
    /// Machine size.
    pub instance_type: String,
    /// Public IPv4 address, once assigned.
    pub public_ip: Option<String>,
    /// Publicly resolvable DNS name, once assigned.
    pub public_dns: Option<String>,
    /// Private IPv4 address.
    pub private_ip: Option<String>,
    /// Attached security group ids.
    pub security_groups: Vec<String>,
    /// Key pair name.
    pub key_name: Option<String>,
    /// Tags on the instance.
    pub tags: HashMap<String, String>,
}

impl InstanceInfo {
    /// Whether the instance needs a start before it can become running.
    /// Pending instances are already on their way and only need the wait.
    pub fn needs_start(&self) -> bool {
        self.state == "stopped"
    }

    fn from_api(instance: &aws_sdk_ec2::types::Instance) -> Self {
        let mut tags = HashMap::new();
        for tag in instance.tags() {
            if let (Some(key), Some(value)) = (tag.key(), tag.value()) {
                tags.insert(key.to_string(), value.to_string());
            }
        }

        let security_groups = instance
            .security_groups()
            .iter()
            .filter_map(|sg| sg.group_id().map(|s| s.to_string()))
            .collect();

        // The API reports an empty string rather than nothing before the
        // public DNS name is assigned.
        let public_dns = instance
            .public_dns_name()
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Self {
            instance_id: instance.instance_id().unwrap_or_default().to_string(),
            state: instance
                .state()
                .and_then(|s| s.name())
                .map(|n| n.as_str().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            instance_type: instance
                .instance_type()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default(),
            public_ip: instance.public_ip_address().map(|s| s.to_string()),
            public_dns,
            private_ip: instance.private_ip_address().map(|s| s.to_string()),
            security_groups,
            key_name: instance.key_name().map(|s| s.to_string()),
            tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(state: &str) -> InstanceInfo {
        InstanceInfo {
            instance_id: "i-0123456789abcdef0".to_string(),
            state: state.to_string(),
            instance_type: "t2.micro".to_string(),
            public_ip: None,
            public_dns: None,
            private_ip: None,
            security_groups: Vec::new(),
            key_name: Some("deployer".to_string()),
            tags: HashMap::new(),
        }
    }

    #[test]
    fn stopped_instance_needs_a_start() {
        assert!(info("stopped").needs_start());
    }

    #[test]
    fn running_and_pending_instances_do_not() {
        assert!(!info("running").needs_start());
        assert!(!info("pending").needs_start());
    }
}
