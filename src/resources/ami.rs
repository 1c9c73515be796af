//! Machine-image lookup.
//!
//! The lookup is a data source rather than a managed resource: nothing is
//! created on the provider side. At apply time the available images from the
//! trusted owner are filtered by name pattern and the most recent one (by
//! creation date) is selected. The instance then references the resolved
//! image id.

use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resources::{ResourceAddr, ResourceKind};

/// Specification of a machine-image lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmiLookup {
    /// Lookup name, unique within the stack.
    pub name: String,
    /// Image owner account alias or id, e.g. `amazon`.
    pub owner: String,
    /// Glob-style name pattern passed to the provider's image filter.
    pub name_pattern: String,
    /// Select the most recent match instead of failing on ambiguity.
    pub most_recent: bool,
}

impl AmiLookup {
    /// The address of this lookup.
    pub fn addr(&self) -> ResourceAddr {
        ResourceAddr::new(ResourceKind::Ami, &self.name)
    }

    /// Resolves the lookup against the provider, returning the selected image.
    pub async fn resolve(&self, client: &Client) -> Result<ImageInfo> {
        let resp = client
            .describe_images()
            .owners(&self.owner)
            .filters(
                Filter::builder()
                    .name("name")
                    .values(&self.name_pattern)
                    .build(),
            )
            .filters(Filter::builder().name("state").values("available").build())
            .send()
            .await
            .map_err(|e| Error::provider("DescribeImages", e.to_string()))?;

        let mut candidates: Vec<ImageInfo> = resp
            .images()
            .iter()
            .filter_map(|image| {
                Some(ImageInfo {
                    image_id: image.image_id()?.to_string(),
                    name: image.name().unwrap_or_default().to_string(),
                    creation_date: image.creation_date().unwrap_or_default().to_string(),
                })
            })
            .collect();

        if candidates.is_empty() {
            return Err(Error::NoImageFound {
                address: self.addr().to_string(),
                owner: self.owner.clone(),
                pattern: self.name_pattern.clone(),
            });
        }

        // ISO-8601 creation dates sort lexicographically.
        candidates.sort_by(|a, b| a.creation_date.cmp(&b.creation_date));
        let selected = if self.most_recent {
            candidates.pop()
        } else {
            candidates.into_iter().next()
        };
        let selected = selected.ok_or_else(|| Error::NoImageFound {
            address: self.addr().to_string(),
            owner: self.owner.clone(),
            pattern: self.name_pattern.clone(),
        })?;

        tracing::info!(
            image_id = %selected.image_id,
            name = %selected.name,
            "Resolved image lookup '{}'",
            self.addr()
        );

        Ok(selected)
    }
}

/// A resolved machine image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// Provider image id.
    pub image_id: String,
    /// Image name.
    pub name: String,
    /// Creation timestamp as reported by the provider.
    pub creation_date: String,
}
