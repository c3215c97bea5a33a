//! Backend status, calibration and parameter shapes

use serde::{Deserialize, Serialize};

/// Queue status of a backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    /// Canonical backend name
    #[serde(default)]
    pub backend: String,

    /// Whether the device is accepting jobs
    #[serde(rename = "state", default)]
    pub available: bool,

    /// Whether the device is currently busy
    #[serde(default)]
    pub busy: bool,

    /// Jobs waiting in the queue
    #[serde(rename = "lengthQueue", default)]
    pub pending_jobs: u64,
}

/// A dated calibration value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationValue {
    /// Measurement date
    #[serde(default)]
    pub date: Option<String>,

    /// Value
    #[serde(default)]
    pub value: f64,
}

/// Error rate of a multi-qubit gate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiQubitGate {
    /// Gate name
    #[serde(default)]
    pub name: String,

    /// Gate type (e.g. `"CX"`)
    #[serde(rename = "type", default)]
    pub gate_type: String,

    /// Qubits the gate acts on
    #[serde(default)]
    pub qubits: Vec<u32>,

    /// Gate error
    #[serde(default)]
    pub gate_error: CalibrationValue,
}

/// Per-qubit calibration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QubitCalibration {
    /// Qubit name
    #[serde(default)]
    pub name: String,

    /// Readout error
    #[serde(default)]
    pub readout_error: CalibrationValue,

    /// Single-qubit gate error
    #[serde(default)]
    pub gate_error: CalibrationValue,
}

/// Calibration of a real device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calibration {
    /// Canonical backend name
    #[serde(default)]
    pub backend: String,

    /// Last time the calibration was refreshed
    #[serde(default)]
    pub last_update_date: Option<String>,

    /// Multi-qubit gate errors
    #[serde(default)]
    pub multi_qubit_gates: Vec<MultiQubitGate>,

    /// Per-qubit errors
    #[serde(default)]
    pub qubits: Vec<QubitCalibration>,
}

impl Calibration {
    /// Empty calibration tagged with a backend name (used for simulators)
    pub fn empty(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            ..Default::default()
        }
    }
}

/// A dated measurement with a unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamMeasure {
    /// Measurement date
    #[serde(default)]
    pub date: Option<String>,

    /// Value
    #[serde(default)]
    pub value: f64,

    /// Unit (e.g. `"µs"`, `"GHz"`)
    #[serde(default)]
    pub unit: Option<String>,
}

/// Dilution refrigerator parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FridgeParameters {
    /// Last cooldown
    #[serde(default)]
    pub cooldown_date: Option<String>,

    /// Fridge temperature
    #[serde(rename = "Temperature", default)]
    pub temperature: ParamMeasure,
}

/// Per-qubit device parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QubitParameters {
    /// Qubit name
    #[serde(default)]
    pub name: String,

    /// Gate time
    #[serde(default)]
    pub gate_time: ParamMeasure,

    /// Qubit frequency
    #[serde(default)]
    pub frequency: ParamMeasure,

    /// T1 relaxation time
    #[serde(rename = "T1", default)]
    pub t1: ParamMeasure,

    /// T2 dephasing time
    #[serde(rename = "T2", default)]
    pub t2: ParamMeasure,

    /// Buffer time
    #[serde(default)]
    pub buffer: ParamMeasure,
}

/// Calibration parameters of a real device
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendParameters {
    /// Canonical backend name
    #[serde(default)]
    pub backend: String,

    /// Fridge parameters
    #[serde(default)]
    pub fridge_parameters: Option<FridgeParameters>,

    /// Per-qubit parameters
    #[serde(default)]
    pub qubits: Vec<QubitParameters>,
}

impl BackendParameters {
    /// Empty parameters tagged with a backend name (used for simulators)
    pub fn empty(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            ..Default::default()
        }
    }
}
