//! Recorded state persistence.
//!
//! The state file is the engine's memory of what has already been created:
//! one JSON document holding the recorded resources keyed by address, the
//! computed outputs, and a serial that increments on every save. Saving is
//! atomic (write to a temporary sibling, then rename) so a crash mid-write
//! never leaves a truncated state behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::resources::{ResourceAddr, ResourceKind};

/// State file format version.
const STATE_VERSION: u32 = 1;

/// A resource as recorded after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedResource {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Provider-assigned id (image id, group id, instance id).
    pub id: String,
    /// Additional attributes the engine or outputs need later.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
}

impl RecordedResource {
    /// Creates a record with no extra attributes.
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            attributes: IndexMap::new(),
        }
    }

    /// Attaches an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// The persisted state document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    /// Format version.
    pub version: u32,
    /// Increments on every save.
    pub serial: u64,
    /// Last save time.
    pub updated_at: Option<DateTime<Utc>>,
    /// Recorded resources keyed by address, in creation order.
    #[serde(default)]
    pub resources: IndexMap<String, RecordedResource>,
    /// Computed output values.
    #[serde(default)]
    pub outputs: IndexMap<String, String>,
}

impl Default for StateFile {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            serial: 0,
            updated_at: None,
            resources: IndexMap::new(),
            outputs: IndexMap::new(),
        }
    }
}

impl StateFile {
    /// Loads the state from disk, returning an empty state if the file does
    /// not exist yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No state file yet, starting empty");
            return Ok(Self::default());
        }
        let contents =
            fs::read_to_string(path).map_err(|e| Error::state_load(path, e.to_string()))?;
        let state: Self =
            serde_json::from_str(&contents).map_err(|e| Error::state_load(path, e.to_string()))?;
        if state.version > STATE_VERSION {
            return Err(Error::state_load(
                path,
                format!(
                    "state version {} is newer than supported version {STATE_VERSION}",
                    state.version
                ),
            ));
        }
        Ok(state)
    }

    /// Saves the state atomically, bumping the serial.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.serial += 1;
        self.updated_at = Some(Utc::now());

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::state_save(path, e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| Error::state_save(path, e.to_string()))?;
            }
        }

        let tmp = tmp_path(path);
        fs::write(&tmp, contents).map_err(|e| Error::state_save(path, e.to_string()))?;
        fs::rename(&tmp, path).map_err(|e| Error::state_save(path, e.to_string()))?;

        tracing::debug!(path = %path.display(), serial = self.serial, "State saved");
        Ok(())
    }

    /// Whether a resource is recorded at the given address.
    pub fn contains(&self, addr: &ResourceAddr) -> bool {
        self.resources.contains_key(&addr.to_string())
    }

    /// The recorded resource at the given address, if any.
    pub fn get(&self, addr: &ResourceAddr) -> Option<&RecordedResource> {
        self.resources.get(&addr.to_string())
    }

    /// Records a resource under its address.
    pub fn record(&mut self, addr: &ResourceAddr, resource: RecordedResource) {
        self.resources.insert(addr.to_string(), resource);
    }

    /// Sets an output value.
    pub fn set_output(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.outputs.insert(name.into(), value.into());
    }

    /// Fetches a required attribute from a recorded resource.
    pub fn require_attribute(&self, addr: &ResourceAddr, attribute: &str) -> Result<&str> {
        let recorded = self
            .get(addr)
            .ok_or_else(|| Error::MissingAttribute {
                address: addr.to_string(),
                attribute: attribute.to_string(),
            })?;
        recorded
            .attributes
            .get(attribute)
            .map(String::as_str)
            .ok_or_else(|| Error::MissingAttribute {
                address: addr.to_string(),
                attribute: attribute.to_string(),
            })
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}
