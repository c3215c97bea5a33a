//! Job model
//!
//! A job bundles one or more QASM circuits that run with shared execution
//! parameters. The identifier stays empty until the server accepts the job.

use crate::constants::execution::{MAX_SHOTS, MAX_TIMEOUT};
use std::time::Duration;

/// One or more QASM 2.0 experiments submitted together
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Job {
    /// Server-assigned identifier, set once on submission
    id: Option<String>,

    /// Job name
    pub name: Option<String>,

    /// How long the caller is willing to wait for results
    ///
    /// Not sent to the server; kept on the tracked job for result polling.
    pub timeout: Option<Duration>,

    /// Shots per circuit
    pub shots: u32,

    /// Credit ceiling for this job (0 means use the client default)
    pub max_credits: u32,

    /// QASM sources
    pub qasms: Vec<String>,
}

/// Limit `shots` to [`MAX_SHOTS`], warning when they were over
pub fn clamp_shots(shots: u32) -> u32 {
    if shots > MAX_SHOTS {
        log::warn!(
            "shots were more than the maximum, {}, so they were set to be the maximum shots, {}",
            shots,
            MAX_SHOTS
        );
        MAX_SHOTS
    } else {
        shots
    }
}

impl Job {
    /// Create a job, clamping shots to [`MAX_SHOTS`]
    pub fn new(qasms: Vec<String>, shots: u32, max_credits: u32) -> Self {
        Self {
            id: None,
            name: None,
            timeout: None,
            shots: clamp_shots(shots),
            max_credits,
            qasms,
        }
    }

    /// Set the job name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the result timeout, capped at [`MAX_TIMEOUT`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout.min(MAX_TIMEOUT));
        self
    }

    /// Server-assigned identifier
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Check if the server accepted this job
    pub fn is_submitted(&self) -> bool {
        self.id.is_some()
    }

    /// Record the identifier the server assigned
    pub fn assign_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }
}
