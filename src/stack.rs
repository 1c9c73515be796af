//! The built-in stack definition.
//!
//! Rustform carries exactly one stack: a single web service host. It declares
//! a machine-image lookup, a security group restricting inbound
//! administrative access to a caller-supplied address range, and a compute
//! instance referencing both, plus one derived output (the instance's public
//! DNS name). Everything except the two required inputs is a fixed constant.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::inputs::Inputs;
use crate::resources::{
    AmiLookup, InstanceSpec, ResourceAddr, ResourceSpec, RuleSpec, SecurityGroupSpec,
};

/// Default provider region.
pub const DEFAULT_REGION: &str = "us-east-1";
/// Machine size of the instance.
pub const INSTANCE_TYPE: &str = "t2.micro";
/// Inbound administrative port.
pub const SSH_PORT: i32 = 22;
/// Trusted image owner for the lookup.
pub const AMI_OWNER: &str = "amazon";
/// Name pattern selecting current base images from the trusted owner.
pub const AMI_NAME_PATTERN: &str = "al2023-ami-*-x86_64";
/// Permission profile attached to the instance.
pub const INSTANCE_PROFILE: &str = "LabInstanceProfile";

/// Name of the single derived output.
pub const OUTPUT_PUBLIC_DNS: &str = "public_dns";

/// An attribute of a resource that an output can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputAttribute {
    /// The instance's publicly resolvable DNS name.
    PublicDns,
}

/// A derived output value, defined in terms of one resource attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    /// Output name.
    pub name: String,
    /// Resource the output reads from.
    pub resource: ResourceAddr,
    /// Attribute of that resource.
    pub attribute: OutputAttribute,
}

/// The desired-state description produced from the stack and its inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredState {
    /// Declared resources.
    pub resources: Vec<ResourceSpec>,
    /// Derived outputs.
    pub outputs: Vec<OutputSpec>,
}

impl DesiredState {
    /// Looks up a resource spec by address.
    pub fn get(&self, addr: &ResourceAddr) -> Option<&ResourceSpec> {
        self.resources.iter().find(|spec| spec.addr() == *addr)
    }

    /// Validates internal consistency: unique addresses, no dangling
    /// references from resources or outputs.
    pub fn validate(&self) -> Result<()> {
        for (i, spec) in self.resources.iter().enumerate() {
            let addr = spec.addr();
            if self.resources[..i].iter().any(|other| other.addr() == addr) {
                return Err(Error::StackValidation(format!(
                    "duplicate resource address '{addr}'"
                )));
            }
        }
        for spec in &self.resources {
            for dep in spec.depends_on() {
                if self.get(&dep).is_none() {
                    return Err(Error::DanglingReference {
                        from: spec.addr().to_string(),
                        to: dep.to_string(),
                    });
                }
            }
        }
        for output in &self.outputs {
            if self.get(&output.resource).is_none() {
                return Err(Error::DanglingReference {
                    from: format!("output.{}", output.name),
                    to: output.resource.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Builds the dependency graph over the declared resources.
    pub fn dependency_graph(&self) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for spec in &self.resources {
            graph.add_resource(spec.addr());
        }
        for spec in &self.resources {
            for dep in spec.depends_on() {
                graph.add_reference(dep, spec.addr());
            }
        }
        graph
    }
}

/// The built-in web service host stack.
#[derive(Debug, Clone)]
pub struct Stack {
    /// Stack name.
    pub name: String,
    desired: DesiredState,
}

impl Stack {
    /// Builds the stack from validated inputs.
    pub fn web_service(inputs: &Inputs) -> Self {
        let ami = AmiLookup {
            name: "web".to_string(),
            owner: AMI_OWNER.to_string(),
            name_pattern: AMI_NAME_PATTERN.to_string(),
            most_recent: true,
        };

        let security_group = SecurityGroupSpec {
            name: "web_ssh".to_string(),
            description: "Allow SSH from the administrative address range".to_string(),
            ingress: vec![
                RuleSpec::tcp_port(SSH_PORT, inputs.ssh_cidr)
                    .with_description("SSH from administrative range"),
            ],
            egress: vec![RuleSpec::allow_all()],
        };

        let instance = InstanceSpec {
            name: "web".to_string(),
            instance_type: INSTANCE_TYPE.to_string(),
            image: ami.addr(),
            security_group: security_group.addr(),
            key_name: inputs.key_name.clone(),
            instance_profile: Some(INSTANCE_PROFILE.to_string()),
        };

        let outputs = vec![OutputSpec {
            name: OUTPUT_PUBLIC_DNS.to_string(),
            resource: instance.addr(),
            attribute: OutputAttribute::PublicDns,
        }];

        Self {
            name: "web-service".to_string(),
            desired: DesiredState {
                resources: vec![
                    ResourceSpec::Ami(ami),
                    ResourceSpec::SecurityGroup(security_group),
                    ResourceSpec::Instance(instance),
                ],
                outputs,
            },
        }
    }

    /// The desired-state description.
    pub fn desired_state(&self) -> &DesiredState {
        &self.desired
    }

    /// Validates the stack's internal references and dependency ordering.
    pub fn validate(&self) -> Result<()> {
        self.desired.validate()?;
        // Surfaces cycles even though the built-in stack cannot have any.
        self.desired.dependency_graph().execution_order()?;
        Ok(())
    }
}
