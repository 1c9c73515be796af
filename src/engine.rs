//! The converge engine.
//!
//! Walks a plan in dependency order and issues the minimal set of provider
//! calls to make the recorded state match the desired state. The state file
//! is saved after every created resource, so a provider failure partway
//! through leaves an accurate record of what already exists; the next apply
//! picks up where this one stopped.

use std::path::PathBuf;
use std::time::Duration;

use aws_sdk_ec2::Client;
use indexmap::IndexMap;

use crate::error::{Error, Result};
use crate::plan::{Action, Plan};
use crate::resources::{self, ResourceAddr, ResourceSpec};
use crate::stack::{DesiredState, OutputAttribute};
use crate::state::{RecordedResource, StateFile};

/// Attribute key under which the instance's DNS name is recorded.
const ATTR_PUBLIC_DNS: &str = "public_dns";

/// Options controlling an apply run.
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Provider region.
    pub region: String,
    /// Path of the state file to update.
    pub state_path: PathBuf,
    /// Wait for the instance to reach the running state.
    pub wait: bool,
    /// Timeout for wait operations in seconds.
    pub wait_timeout: u64,
}

/// Summary of a completed apply.
#[derive(Debug, Clone)]
pub struct ApplyReport {
    /// Addresses created, in order.
    pub created: Vec<ResourceAddr>,
    /// Number of resources that were already converged.
    pub unchanged: usize,
    /// Output values computed from the final state.
    pub outputs: IndexMap<String, String>,
}

/// Converges a plan against the provider.
pub struct Provisioner {
    client: Client,
    options: ApplyOptions,
}

impl Provisioner {
    /// Builds a provisioner with a provider client for the configured region.
    pub async fn connect(options: ApplyOptions) -> Self {
        let client = resources::create_client(&options.region).await;
        Self { client, options }
    }

    /// Applies the plan, updating and persisting the state as it goes.
    pub async fn apply(
        &self,
        desired: &DesiredState,
        plan: &Plan,
        state: &mut StateFile,
    ) -> Result<ApplyReport> {
        let mut created = Vec::new();

        for action in &plan.actions {
            let addr = match action {
                Action::Noop { addr } => {
                    tracing::debug!("Resource '{addr}' already converged");
                    continue;
                }
                Action::Create { addr } => addr,
            };

            let spec = desired.get(addr).ok_or_else(|| {
                Error::Internal(format!("plan refers to undeclared resource '{addr}'"))
            })?;

            let recorded = match spec {
                ResourceSpec::Ami(lookup) => {
                    let image = lookup.resolve(&self.client).await?;
                    RecordedResource::new(addr.kind, &image.image_id)
                        .with_attribute("name", image.name)
                        .with_attribute("creation_date", image.creation_date)
                }
                ResourceSpec::SecurityGroup(sg) => {
                    let (info, _created_now) = sg.ensure(&self.client).await?;
                    RecordedResource::new(addr.kind, info.group_id)
                }
                ResourceSpec::Instance(instance) => {
                    let image_id = state.get(&instance.image).map(|r| r.id.clone()).ok_or_else(
                        || Error::MissingAttribute {
                            address: instance.image.to_string(),
                            attribute: "id".to_string(),
                        },
                    )?;
                    let group_id = state
                        .get(&instance.security_group)
                        .map(|r| r.id.clone())
                        .ok_or_else(|| Error::MissingAttribute {
                            address: instance.security_group.to_string(),
                            attribute: "id".to_string(),
                        })?;

                    let mut info = match instance.find(&self.client).await? {
                        Some(existing) => {
                            tracing::info!(
                                instance_id = %existing.instance_id,
                                state = %existing.state,
                                "Adopting existing instance '{}'",
                                instance.name
                            );
                            if existing.needs_start() {
                                instance.start(&self.client, &existing.instance_id).await?;
                            }
                            existing
                        }
                        None => instance.create(&self.client, &image_id, &group_id).await?,
                    };

                    if self.options.wait {
                        info = instance
                            .wait_until_running(
                                &self.client,
                                &info.instance_id,
                                Duration::from_secs(self.options.wait_timeout),
                            )
                            .await?;
                    }

                    let mut recorded = RecordedResource::new(addr.kind, &info.instance_id)
                        .with_attribute("state", info.state.clone());
                    if let Some(dns) = info.public_dns.clone() {
                        recorded = recorded.with_attribute(ATTR_PUBLIC_DNS, dns);
                    }
                    if let Some(ip) = info.public_ip.clone() {
                        recorded = recorded.with_attribute("public_ip", ip);
                    }
                    recorded
                }
            };

            state.record(addr, recorded);
            state.save(&self.options.state_path)?;
            created.push(addr.clone());
        }

        let outputs = compute_outputs(desired, state)?;
        if !outputs.is_empty() {
            for (name, value) in &outputs {
                state.set_output(name, value);
            }
            state.save(&self.options.state_path)?;
        }

        Ok(ApplyReport {
            created,
            unchanged: plan.unchanged(),
            outputs,
        })
    }
}

/// Derives output values from recorded resource attributes.
pub fn compute_outputs(
    desired: &DesiredState,
    state: &StateFile,
) -> Result<IndexMap<String, String>> {
    let mut outputs = IndexMap::new();
    for spec in &desired.outputs {
        let value = match spec.attribute {
            OutputAttribute::PublicDns => {
                match state.require_attribute(&spec.resource, ATTR_PUBLIC_DNS) {
                    Ok(value) => value.to_string(),
                    // The DNS name is only assigned once the instance is
                    // running; without it the output stays unset.
                    Err(_) => {
                        tracing::warn!(
                            "Output '{}' unavailable: '{}' has no {ATTR_PUBLIC_DNS} yet",
                            spec.name,
                            spec.resource
                        );
                        continue;
                    }
                }
            }
        };
        outputs.insert(spec.name.clone(), value);
    }
    Ok(outputs)
}
