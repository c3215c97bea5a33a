//! Backend metadata
//!
//! Devices (real chips and simulators) as reported by the `Backends`
//! endpoints, plus the table of historical device aliases.

use crate::constants::backend::STATUS_ON;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::hash_map::{self, HashMap};

/// Historical device and simulator names mapped to their canonical names
pub const LEGACY_BACKEND_NAMES: &[(&str, &str)] = &[
    ("ibmqx5qv2", "real"),
    ("ibmqx2", "real"),
    ("qx5qv2", "real"),
    ("qx5q", "real"),
    ("real", "real"),
    ("ibmqx3", "ibmqx3"),
    ("simulator", "sim_trivial_2"),
    ("sim_trivial_2", "sim_trivial_2"),
    ("ibmqx_qasm_simulator", "sim_trivial_2"),
];

/// Look up a lower-cased legacy alias
pub fn legacy_backend(name: &str) -> Option<&'static str> {
    LEGACY_BACKEND_NAMES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, canonical)| *canonical)
}

/// Device connectivity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CouplingMap {
    /// Marker such as `"all-to-all"`
    Named(String),
    /// Directed qubit pairs
    Edges(Vec<Vec<u32>>),
}

impl CouplingMap {
    /// Check if every qubit can interact with every other
    pub fn is_all_to_all(&self) -> bool {
        matches!(self, Self::Named(name) if name == "all-to-all")
    }
}

/// Decode a missing or `null` field as the type's default
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A backend available to run experiments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backend {
    /// Device name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Server-side identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Serial number of the device
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,

    /// Topology identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology_id: Option<String>,

    /// Coupling topology
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupling_map: Option<CouplingMap>,

    /// Status string (`"on"` when accepting work)
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,

    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether this backend is a simulator
    #[serde(default, deserialize_with = "null_as_default")]
    pub simulator: bool,

    /// Number of qubits
    #[serde(default, deserialize_with = "null_as_default")]
    pub n_qubits: u32,

    /// Date the device came online
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_date: Option<String>,

    /// Device documentation URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Chip name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chip_name: Option<String>,

    /// Comma separated basis gates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basis_gates: Option<String>,
}

impl Backend {
    /// Create a backend with a name and status
    pub fn new(name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: status.into(),
            ..Default::default()
        }
    }

    /// Check if the device currently accepts work
    pub fn is_online(&self) -> bool {
        self.status == STATUS_ON
    }
}

/// Backends keyed by device name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Backends(HashMap<String, Backend>);

impl Backends {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a backend by its exact name
    pub fn get(&self, name: &str) -> Option<&Backend> {
        self.0.get(name)
    }

    /// Check for a backend by its exact name
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Insert or replace a backend
    pub fn insert(&mut self, backend: Backend) -> Option<Backend> {
        self.0.insert(backend.name.clone(), backend)
    }

    /// Merge a freshly fetched batch
    ///
    /// Only online, named backends are inserted; they replace any entry
    /// with the same name. Entries missing from the batch, or reported
    /// offline in it, are kept. Returns the number of backends inserted.
    pub fn absorb(&mut self, fetched: impl IntoIterator<Item = Backend>) -> usize {
        let mut inserted = 0;
        for backend in fetched
            .into_iter()
            .filter(|backend| backend.is_online() && !backend.name.is_empty())
        {
            self.insert(backend);
            inserted += 1;
        }
        inserted
    }

    /// All simulator backends, in no particular order
    pub fn sims(&self) -> Vec<&Backend> {
        self.0.values().filter(|b| b.simulator).collect()
    }

    /// Device names, in no particular order
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    /// Iterate over backends
    pub fn iter(&self) -> hash_map::Values<'_, String, Backend> {
        self.0.values()
    }

    /// Number of backends
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Backend> for Backends {
    fn from_iter<I: IntoIterator<Item = Backend>>(iter: I) -> Self {
        Self(iter.into_iter().map(|b| (b.name.clone(), b)).collect())
    }
}

impl<'a> IntoIterator for &'a Backends {
    type Item = &'a Backend;
    type IntoIter = hash_map::Values<'a, String, Backend>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
