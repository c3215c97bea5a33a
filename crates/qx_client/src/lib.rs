//! # QX Client
//!
//! Async client for the IBM Quantum Experience REST API.
//!
//! A [`Session`] logs in once and retries every request, re-authenticating
//! on `401`. A [`Client`] shares a session and adds backend discovery and
//! resolution, status and calibration lookups, and experiment and job
//! submission.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use qx_client::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn demo() -> QxResult<()> {
//! let session = Session::dial(DialOptions::new().with_api_token("my-api-token")).await?;
//! let client = Client::new(Arc::new(session), ExecOptions::new().with_shots(1024));
//!
//! client.available_backends(&ExecOptions::new()).await?;
//!
//! let cancel = CancellationToken::new();
//! client
//!     .run_experiment(&cancel, "OPENQASM 2.0;\nqreg q[1];", &ExecOptions::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Variables
//!
//! ```bash
//! export QX_API_TOKEN="your-api-token"
//! export QX_API_URL="https://quantumexperience.ng.bluemix.net/api"  # Optional
//! export QX_RETRIES=5                                                # Optional
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Error taxonomy
pub mod error;

/// Connection and execution options
pub mod options;

/// Authenticated session
pub mod session;

/// Retry engine
mod request;

/// Client and shared registries
pub mod client;

/// Backend name resolution
pub mod registry;

/// Backend status, calibration and parameters
mod backend;

/// Experiment and job submission
mod job;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::Client;
pub use error::{QxError, QxResult, ServerError};
pub use options::{DialOptions, ExecConfig, ExecOptions, HpcOptions, Network};
pub use registry::{resolve_backend, ResolveKind};
pub use session::{Params, Session};
pub use tokio_util::sync::CancellationToken;

pub use qx_core;

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::client::Client;
    pub use crate::error::{QxError, QxResult};
    pub use crate::options::{DialOptions, ExecOptions, HpcOptions};
    pub use crate::session::Session;
    pub use qx_core::prelude::*;
    pub use tokio_util::sync::CancellationToken;
}
