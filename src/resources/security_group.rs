//! Security group resource.
//!
//! The stack's group carries exactly one ingress rule (the administrative
//! port, from the caller-supplied address range) and one unrestricted egress
//! rule. Ensure semantics are idempotent: an existing group with the same
//! name is adopted rather than recreated.

use std::collections::HashMap;

use aws_sdk_ec2::types::{Filter, IpPermission, IpRange, ResourceType, Tag, TagSpecification};
use aws_sdk_ec2::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inputs::CidrBlock;
use crate::resources::{ResourceAddr, ResourceKind};

/// A single allow rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// IP protocol: `tcp`, `udp`, `icmp`, or `-1` for all.
    pub protocol: String,
    /// Start of the port range.
    pub from_port: i32,
    /// End of the port range.
    pub to_port: i32,
    /// Source (ingress) or destination (egress) address range.
    pub cidr: CidrBlock,
    /// Rule description shown in the provider console.
    pub description: Option<String>,
}

impl RuleSpec {
    /// Allow TCP on a single port from the given range.
    pub fn tcp_port(port: i32, cidr: CidrBlock) -> Self {
        Self {
            protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr,
            description: None,
        }
    }

    /// Allow all protocols, all ports, to anywhere.
    pub fn allow_all() -> Self {
        Self {
            protocol: "-1".to_string(),
            from_port: 0,
            to_port: 0,
            cidr: "0.0.0.0/0".parse().unwrap_or_else(|_| unreachable!()),
            description: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn to_ip_permission(&self) -> IpPermission {
        let mut ip_range = IpRange::builder().cidr_ip(self.cidr.to_string());
        if let Some(ref desc) = self.description {
            ip_range = ip_range.description(desc);
        }

        let mut builder = IpPermission::builder()
            .ip_protocol(&self.protocol)
            .ip_ranges(ip_range.build());
        // The provider rejects port ranges on the all-protocols rule.
        if self.protocol != "-1" {
            builder = builder.from_port(self.from_port).to_port(self.to_port);
        }
        builder.build()
    }
}

/// Specification of a security group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupSpec {
    /// Group name, unique within the stack and the provider account.
    pub name: String,
    /// Group description.
    pub description: String,
    /// Inbound allow rules.
    pub ingress: Vec<RuleSpec>,
    /// Outbound allow rules.
    pub egress: Vec<RuleSpec>,
}

impl SecurityGroupSpec {
    /// The address of this group.
    pub fn addr(&self) -> ResourceAddr {
        ResourceAddr::new(ResourceKind::SecurityGroup, &self.name)
    }

    /// Finds an existing group with this spec's name.
    pub async fn find(&self, client: &Client) -> Result<Option<SecurityGroupInfo>> {
        let resp = client
            .describe_security_groups()
            .filters(
                Filter::builder()
                    .name("group-name")
                    .values(&self.name)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::provider("DescribeSecurityGroups", e.to_string()))?;

        for sg in resp.security_groups() {
            let mut tags = HashMap::new();
            for tag in sg.tags() {
                if let (Some(key), Some(value)) = (tag.key(), tag.value()) {
                    tags.insert(key.to_string(), value.to_string());
                }
            }
            return Ok(Some(SecurityGroupInfo {
                group_id: sg.group_id().unwrap_or_default().to_string(),
                group_name: sg.group_name().unwrap_or_default().to_string(),
                description: sg.description().unwrap_or_default().to_string(),
                vpc_id: sg.vpc_id().map(|s| s.to_string()),
                tags,
            }));
        }

        Ok(None)
    }

    /// Ensures the group exists with its rules, returning its info and
    /// whether anything was created.
    pub async fn ensure(&self, client: &Client) -> Result<(SecurityGroupInfo, bool)> {
        if let Some(existing) = self.find(client).await? {
            tracing::debug!(
                group_id = %existing.group_id,
                "Security group '{}' already exists",
                self.name
            );
            return Ok((existing, false));
        }

        let resp = client
            .create_security_group()
            .group_name(&self.name)
            .description(&self.description)
            .tag_specifications(
                TagSpecification::builder()
                    .resource_type(ResourceType::SecurityGroup)
                    .tags(Tag::builder().key("Name").value(&self.name).build())
                    .build(),
            )
            .send()
            .await
            .map_err(|e| Error::provider("CreateSecurityGroup", e.to_string()))?;

        let group_id = resp.group_id().unwrap_or_default().to_string();

        if !self.ingress.is_empty() {
            let permissions: Vec<IpPermission> =
                self.ingress.iter().map(RuleSpec::to_ip_permission).collect();
            client
                .authorize_security_group_ingress()
                .group_id(&group_id)
                .set_ip_permissions(Some(permissions))
                .send()
                .await
                .map_err(|e| Error::provider("AuthorizeSecurityGroupIngress", e.to_string()))?;
        }

        // A new group already allows all egress; only touch the provider when
        // the declared rules narrow it to something else.
        if !self.egress.is_empty() && self.egress != [RuleSpec::allow_all()] {
            let permissions: Vec<IpPermission> =
                self.egress.iter().map(RuleSpec::to_ip_permission).collect();
            client
                .authorize_security_group_egress()
                .group_id(&group_id)
                .set_ip_permissions(Some(permissions))
                .send()
                .await
                .map_err(|e| Error::provider("AuthorizeSecurityGroupEgress", e.to_string()))?;
        }

        tracing::info!(group_id = %group_id, "Created security group '{}'", self.name);

        let mut tags = HashMap::new();
        tags.insert("Name".to_string(), self.name.clone());
        Ok((
            SecurityGroupInfo {
                group_id,
                group_name: self.name.clone(),
                description: self.description.clone(),
                vpc_id: None,
                tags,
            },
            true,
        ))
    }
}

/// A security group as reported by the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityGroupInfo {
    /// Provider group id.
    pub group_id: String,
    /// Group name.
    pub group_name: String,
    /// Group description.
    pub description: String,
    /// VPC the group belongs to, if any.
    pub vpc_id: Option<String>,
    /// Tags on the group.
    pub tags: HashMap<String, String>,
}
