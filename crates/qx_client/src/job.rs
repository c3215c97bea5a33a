//! Experiment and job submission

use crate::client::Client;
use crate::error::{QxError, QxResult, ServerError};
use crate::options::{ExecOptions, HpcOptions};
use crate::registry::ResolveKind;
use qx_core::constants::execution::{CODE_TYPE_QASM2, MAX_TIMEOUT};
use qx_core::{clamp_shots, strip_version_header, Job};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExperimentRequest<'a> {
    name: &'a str,
    qasm: String,
    code_type: &'static str,
}

#[derive(Debug, Serialize)]
struct QasmEntry {
    qasm: String,
}

#[derive(Debug, Serialize)]
struct BackendRef {
    name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobRequest {
    name: String,
    qasms: Vec<QasmEntry>,
    code_type: &'static str,
    shots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_credits: Option<u32>,
    backend: BackendRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hpc: Option<HpcOptions>,
}

/// Reply to a submission
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecutionResponse {
    #[serde(default)]
    error: Option<ServerError>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    device_run_type: Option<String>,
}

impl ExecutionResponse {
    fn into_result(self) -> QxResult<Self> {
        match self.error {
            Some(error) => Err(QxError::Server(error)),
            None => Ok(self),
        }
    }
}

/// Run `operation` unless `cancel` fires first
async fn cancellable<T>(
    cancel: &CancellationToken,
    operation: impl Future<Output = QxResult<T>>,
) -> QxResult<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(QxError::Cancelled),
        result = operation => result,
    }
}

// ============================================================================
// Submission
// ============================================================================

impl Client {
    /// Submit a single QASM experiment
    ///
    /// Call-time `overrides` apply to this call only. The seed and backend
    /// are validated before anything is sent. Any server error object in
    /// the reply is returned as [`QxError::Server`].
    pub async fn run_experiment(
        &self,
        cancel: &CancellationToken,
        qasm: &str,
        overrides: &ExecOptions,
    ) -> QxResult<()> {
        let config = self.effective(overrides).resolve();
        config.validate()?;
        let device = self.check_backend(&config.backend, ResolveKind::Experiment)?;

        let mut params = vec![("shots", config.shots.to_string())];
        if let Some(seed) = config.seed {
            params.push(("seed", seed.to_string()));
        }
        params.push(("deviceRunType", device));

        let body = ExperimentRequest {
            name: &config.name,
            qasm: strip_version_header(qasm),
            code_type: CODE_TYPE_QASM2,
        };

        let response: ExecutionResponse = cancellable(
            cancel,
            self.session.post("codes/execute", &params, &body),
        )
        .await?;
        let response = response.into_result()?;

        log::debug!(
            "Experiment \"{}\" accepted (execution {:?}, run type {:?})",
            config.name,
            response.id,
            response.device_run_type
        );
        Ok(())
    }

    /// Submit a multi-circuit job and start tracking it
    ///
    /// Shots, name, credits and timeout set on `job` win over the options.
    /// Shots are capped at `MAX_SHOTS`. The backend must be in the
    /// registry; legacy aliases are not accepted. Returns the job with its
    /// server-assigned id.
    pub async fn run_job(
        &self,
        cancel: &CancellationToken,
        mut job: Job,
        overrides: &ExecOptions,
    ) -> QxResult<Job> {
        let config = self.effective(overrides).resolve();
        config.validate()?;
        let device = self.check_backend(&config.backend, ResolveKind::Job)?;

        let body = JobRequest {
            name: job.name.clone().unwrap_or_else(|| config.name.clone()),
            qasms: job
                .qasms
                .iter()
                .map(|qasm| QasmEntry {
                    qasm: strip_version_header(qasm),
                })
                .collect(),
            code_type: CODE_TYPE_QASM2,
            shots: clamp_shots(if job.shots > 0 { job.shots } else { config.shots }),
            max_credits: Some(job.max_credits)
                .filter(|credits| *credits > 0)
                .or(config.max_credits),
            backend: BackendRef { name: device },
            seed: config.seed,
            hpc: config.hpc,
        };

        let response: ExecutionResponse =
            cancellable(cancel, self.session.post("Jobs", &[], &body)).await?;
        let id = response
            .into_result()?
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| QxError::Api("job submission returned no id".into()))?;

        if job.name.is_none() {
            job.name = Some(body.name);
        }
        job.shots = body.shots;
        job.timeout = job
            .timeout
            .or(config.timeout)
            .map(|timeout| timeout.min(MAX_TIMEOUT));
        job.assign_id(id.clone());
        self.state().jobs.insert(id.clone(), job.clone());

        log::debug!("Job {} submitted with {} circuits", id, job.qasms.len());
        Ok(job)
    }
}
