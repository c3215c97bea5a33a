//! # QX Core
//!
//! Data shapes shared by the QX client: backend metadata, status and
//! calibration records, account records, the job model, and execution
//! limits.
//!
//! Nothing in this crate touches the network.
//!
//! ## Quick Start
//!
//! ```rust
//! use qx_core::prelude::*;
//!
//! let job = Job::new(vec!["qreg q[1];".to_string()], 20_000, 3);
//! assert_eq!(job.shots, MAX_SHOTS);
//!
//! assert_eq!(legacy_backend("simulator"), Some("sim_trivial_2"));
//! assert_eq!(strip_version_header("IBMQASM 2.0;\nqreg q[1];"), "\nqreg q[1];");
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Defaults and limits
pub mod constants;

/// Backend metadata and legacy aliases
pub mod backend;

/// Status, calibration and parameter shapes
pub mod calibration;

/// Credits and saved codes
pub mod account;

/// Job model
pub mod job;

/// QASM rewriting
pub mod qasm;

// ============================================================================
// Re-exports
// ============================================================================

pub use account::{Code, Codes, Credits, Execution, ExecutionStatus, UserInfo};
pub use backend::{legacy_backend, Backend, Backends, CouplingMap, LEGACY_BACKEND_NAMES};
pub use calibration::{
    BackendParameters, BackendStatus, Calibration, CalibrationValue, FridgeParameters,
    MultiQubitGate, ParamMeasure, QubitCalibration, QubitParameters,
};
pub use job::{clamp_shots, Job};
pub use qasm::strip_version_header;

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::backend::{legacy_backend, Backend, Backends};
    pub use crate::calibration::{BackendParameters, BackendStatus, Calibration};
    pub use crate::constants::execution::{DEFAULT_BACKEND, DEFAULT_SHOTS, MAX_SEED, MAX_SHOTS};
    pub use crate::job::{clamp_shots, Job};
    pub use crate::qasm::strip_version_header;
}
