//! Resource model for the desired-state description.
//!
//! A stack is a set of typed resource specifications plus derived outputs.
//! Three resource kinds exist: a machine-image lookup, a security group, and
//! a compute instance. Each spec knows its address and the addresses it
//! references, which is all the dependency graph needs.

pub mod ami;
pub mod instance;
pub mod security_group;

use std::fmt;
use std::str::FromStr;

use aws_config::BehaviorVersion;
use aws_sdk_ec2::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub use ami::{AmiLookup, ImageInfo};
pub use instance::{InstanceInfo, InstanceSpec};
pub use security_group::{RuleSpec, SecurityGroupInfo, SecurityGroupSpec};

/// The kind of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Machine-image lookup (data source, resolved at apply time).
    Ami,
    /// Network access-control group.
    SecurityGroup,
    /// Compute instance.
    Instance,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Ami => write!(f, "ami"),
            ResourceKind::SecurityGroup => write!(f, "security_group"),
            ResourceKind::Instance => write!(f, "instance"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ami" => Ok(ResourceKind::Ami),
            "security_group" => Ok(ResourceKind::SecurityGroup),
            "instance" => Ok(ResourceKind::Instance),
            other => Err(Error::Internal(format!("unknown resource kind '{other}'"))),
        }
    }
}

/// A resource address in `kind.name` form, e.g. `security_group.web_ssh`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceAddr {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Resource name, unique within its kind.
    pub name: String,
}

impl ResourceAddr {
    /// Creates a new address.
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind, self.name)
    }
}

impl FromStr for ResourceAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, name) = s
            .split_once('.')
            .ok_or_else(|| Error::Internal(format!("invalid resource address '{s}'")))?;
        Ok(Self::new(kind.parse()?, name))
    }
}

impl Serialize for ResourceAddr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceAddr {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A typed resource specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceSpec {
    /// Machine-image lookup.
    Ami(AmiLookup),
    /// Security group with ingress/egress rules.
    SecurityGroup(SecurityGroupSpec),
    /// Compute instance.
    Instance(InstanceSpec),
}

impl ResourceSpec {
    /// The address of this resource.
    pub fn addr(&self) -> ResourceAddr {
        match self {
            ResourceSpec::Ami(spec) => ResourceAddr::new(ResourceKind::Ami, &spec.name),
            ResourceSpec::SecurityGroup(spec) => {
                ResourceAddr::new(ResourceKind::SecurityGroup, &spec.name)
            }
            ResourceSpec::Instance(spec) => ResourceAddr::new(ResourceKind::Instance, &spec.name),
        }
    }

    /// Addresses of resources this one references.
    pub fn depends_on(&self) -> Vec<ResourceAddr> {
        match self {
            ResourceSpec::Ami(_) | ResourceSpec::SecurityGroup(_) => Vec::new(),
            ResourceSpec::Instance(spec) => {
                vec![spec.image.clone(), spec.security_group.clone()]
            }
        }
    }
}

/// Builds an EC2 client for the given region, deferring credential and
/// endpoint resolution to the standard provider chain.
pub async fn create_client(region: &str) -> Client {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(aws_sdk_ec2::config::Region::new(region.to_string()))
        .load()
        .await;
    Client::new(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addr_round_trips_through_display() {
        let addr = ResourceAddr::new(ResourceKind::SecurityGroup, "web_ssh");
        assert_eq!(addr.to_string(), "security_group.web_ssh");
        let parsed: ResourceAddr = "security_group.web_ssh".parse().unwrap();
        assert_eq!(parsed, addr);
    }

    #[test]
    fn addr_rejects_unknown_kind() {
        assert!("volume.data".parse::<ResourceAddr>().is_err());
        assert!("no-dot".parse::<ResourceAddr>().is_err());
    }
}
