//! Required input variables for the built-in stack.
//!
//! The stack takes exactly two caller-supplied values: the administrative
//! address range (`ssh_cidr`) and the name of a pre-provisioned key pair
//! (`key_name`). Neither has a default; absence is a validation error raised
//! before any provider interaction.
//!
//! Values are collected from repeatable `-v key=value` CLI flags, with
//! `RUSTFORM_VAR_<NAME>` environment variables as a fallback.

use std::collections::HashMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Name of the address-range input variable.
pub const VAR_SSH_CIDR: &str = "ssh_cidr";
/// Name of the key-pair input variable.
pub const VAR_KEY_NAME: &str = "key_name";

/// An IPv4 address range in network-prefix (CIDR) notation.
///
/// Parsing rejects prefixes longer than 32 bits and addresses with host bits
/// set, so `10.0.0.0/8` is accepted while `10.0.0.1/8` is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    network: Ipv4Addr,
    prefix_len: u8,
}

impl CidrBlock {
    /// Creates a block, validating the prefix length and host bits.
    pub fn new(network: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(Error::invalid_input(
                VAR_SSH_CIDR,
                format!("prefix length /{prefix_len} is out of range (0-32)"),
            ));
        }
        let mask = if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_len))
        };
        if u32::from(network) & !mask != 0 {
            return Err(Error::invalid_input(
                VAR_SSH_CIDR,
                format!("'{network}/{prefix_len}' has host bits set"),
            ));
        }
        Ok(Self {
            network,
            prefix_len,
        })
    }

    /// The network address of the block.
    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    /// The prefix length of the block.
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix_len)
    }
}

impl FromStr for CidrBlock {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (addr, len) = s.split_once('/').ok_or_else(|| {
            Error::invalid_input(
                VAR_SSH_CIDR,
                format!("'{s}' is not in CIDR notation (expected a.b.c.d/len)"),
            )
        })?;
        let network: Ipv4Addr = addr.parse().map_err(|_| {
            Error::invalid_input(VAR_SSH_CIDR, format!("'{addr}' is not an IPv4 address"))
        })?;
        let prefix_len: u8 = len.parse().map_err(|_| {
            Error::invalid_input(VAR_SSH_CIDR, format!("'{len}' is not a prefix length"))
        })?;
        Self::new(network, prefix_len)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CidrBlock {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The resolved, validated input set for the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inputs {
    /// Address range allowed to reach the instance on the SSH port.
    pub ssh_cidr: CidrBlock,
    /// Name of a pre-provisioned key pair for administrative access.
    pub key_name: String,
}

impl Inputs {
    /// Resolves inputs from `key=value` assignment strings, falling back to
    /// `RUSTFORM_VAR_<NAME>` environment variables for anything not given.
    pub fn resolve(assignments: &[String]) -> Result<Self> {
        let mut vars = HashMap::new();
        for assignment in assignments {
            let (key, value) = assignment
                .split_once('=')
                .ok_or_else(|| Error::InvalidVarAssignment(assignment.clone()))?;
            vars.insert(key.trim().to_string(), value.to_string());
        }
        Self::from_vars(&vars)
    }

    /// Resolves inputs from an already-parsed variable map plus environment.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let ssh_cidr = lookup(vars, VAR_SSH_CIDR)?;
        let key_name = lookup(vars, VAR_KEY_NAME)?;

        let ssh_cidr: CidrBlock = ssh_cidr.trim().parse()?;
        let key_name = key_name.trim().to_string();
        if key_name.is_empty() {
            return Err(Error::invalid_input(VAR_KEY_NAME, "must not be empty"));
        }

        Ok(Self { ssh_cidr, key_name })
    }
}

/// Looks up an input variable by name, CLI value first, environment second.
fn lookup(vars: &HashMap<String, String>, name: &str) -> Result<String> {
    if let Some(value) = vars.get(name) {
        return Ok(value.clone());
    }
    let env_key = format!("RUSTFORM_VAR_{}", name.to_uppercase());
    std::env::var(&env_key).map_err(|_| Error::MissingInput(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn parses_valid_cidr() {
        let cidr: CidrBlock = "203.0.113.0/24".parse().unwrap();
        assert_eq!(cidr.network(), Ipv4Addr::new(203, 0, 113, 0));
        assert_eq!(cidr.prefix_len(), 24);
        assert_eq!(cidr.to_string(), "203.0.113.0/24");
    }

    #[test]
    fn accepts_single_host_and_whole_space() {
        assert!("198.51.100.7/32".parse::<CidrBlock>().is_ok());
        assert!("0.0.0.0/0".parse::<CidrBlock>().is_ok());
    }

    #[test]
    fn rejects_missing_prefix() {
        let err = "203.0.113.0".parse::<CidrBlock>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn rejects_out_of_range_prefix() {
        assert!("10.0.0.0/33".parse::<CidrBlock>().is_err());
    }

    #[test]
    fn rejects_host_bits_set() {
        let err = "10.0.0.1/8".parse::<CidrBlock>().unwrap_err();
        assert!(err.to_string().contains("host bits"));
    }

    #[test]
    fn cidr_serde_round_trip() {
        let cidr: CidrBlock = "192.0.2.0/28".parse().unwrap();
        let json = serde_json::to_string(&cidr).unwrap();
        assert_eq!(json, "\"192.0.2.0/28\"");
        let back: CidrBlock = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cidr);
    }

    #[test]
    fn resolves_from_assignments() {
        let inputs = Inputs::resolve(&[
            "ssh_cidr=203.0.113.0/24".to_string(),
            "key_name=deployer".to_string(),
        ])
        .unwrap();
        assert_eq!(inputs.key_name, "deployer");
        assert_eq!(inputs.ssh_cidr.to_string(), "203.0.113.0/24");
    }

    #[test]
    fn missing_cidr_is_an_error() {
        let err = Inputs::from_vars(&vars(&[("key_name", "deployer")])).unwrap_err();
        assert!(matches!(err, Error::MissingInput(name) if name == VAR_SSH_CIDR));
    }

    #[test]
    fn missing_key_name_is_an_error() {
        let err = Inputs::from_vars(&vars(&[("ssh_cidr", "10.0.0.0/8")])).unwrap_err();
        assert!(matches!(err, Error::MissingInput(name) if name == VAR_KEY_NAME));
    }

    #[test]
    fn empty_key_name_is_rejected() {
        let err = Inputs::from_vars(&vars(&[
            ("ssh_cidr", "10.0.0.0/8"),
            ("key_name", "   "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { name, .. } if name == VAR_KEY_NAME));
    }

    #[test]
    fn malformed_assignment_is_rejected() {
        let err = Inputs::resolve(&["ssh_cidr".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidVarAssignment(_)));
    }
}
