//! High-level QX client
//!
//! A [`Client`] wraps a shared [`Session`] and tracks two registries: the
//! backends seen online and the jobs submitted through it. Both live behind
//! one mutex; client defaults live behind their own lock and only change
//! through [`Client::merge_defaults`].

use crate::error::{QxError, QxResult};
use crate::options::ExecOptions;
use crate::session::Session;
use qx_core::{Backends, Code, Codes, Credits, Job, UserInfo};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

/// Registries shared by every operation on a client
#[derive(Debug, Default)]
pub(crate) struct ClientState {
    pub(crate) backends: Backends,
    pub(crate) jobs: HashMap<String, Job>,
}

/// QX API client
#[derive(Debug)]
pub struct Client {
    pub(crate) session: Arc<Session>,
    defaults: RwLock<ExecOptions>,
    state: Mutex<ClientState>,
}

/// `version` replies with either a number or a string
#[derive(Deserialize)]
#[serde(untagged)]
enum VersionPayload {
    Number(f64),
    Text(String),
}

impl Client {
    /// Create a client over `session` with client-level defaults
    pub fn new(session: Arc<Session>, defaults: ExecOptions) -> Self {
        Self {
            session,
            defaults: RwLock::new(defaults),
            state: Mutex::new(ClientState::default()),
        }
    }

    /// Underlying session
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Snapshot of the client-level defaults
    pub fn defaults(&self) -> ExecOptions {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make `overrides` the new client-level defaults for later calls
    pub fn merge_defaults(&self, overrides: &ExecOptions) {
        let mut defaults = self
            .defaults
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *defaults = defaults.merge(overrides);
    }

    /// Client defaults with call-time `overrides` applied
    pub(crate) fn effective(&self, overrides: &ExecOptions) -> ExecOptions {
        self.defaults
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(overrides)
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, ClientState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Snapshot of the backend registry
    pub fn backends(&self) -> Backends {
        self.state().backends.clone()
    }

    /// Snapshot of a tracked job
    pub fn job(&self, id: &str) -> Option<Job> {
        self.state().jobs.get(id).cloned()
    }

    /// Snapshot of every tracked job
    pub fn jobs(&self) -> Vec<Job> {
        self.state().jobs.values().cloned().collect()
    }

    // ========================================================================
    // Account APIs
    // ========================================================================

    /// API version
    pub async fn version(&self) -> QxResult<f64> {
        match self.session.get::<VersionPayload>("version", &[]).await? {
            VersionPayload::Number(version) => Ok(version),
            VersionPayload::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| QxError::Api(format!("unexpected version payload: {text}"))),
        }
    }

    /// Credits of the logged-in user
    pub async fn credits(&self) -> QxResult<Credits> {
        let user_id = self.session.user_id().await;
        let info: UserInfo = self
            .session
            .get(&format!("users/{user_id}"), &[])
            .await?;
        Ok(info.credit)
    }

    /// Latest saved codes, with their executions
    pub async fn last_codes(&self) -> QxResult<Codes> {
        let user_id = self.session.user_id().await;
        self.session
            .get(
                &format!("users/{user_id}/codes/latest"),
                &[("includeExecutions", "true".to_string())],
            )
            .await
    }

    /// A saved code by id
    pub async fn code(&self, id: &str) -> QxResult<Code> {
        self.session.get(&format!("Codes/{id}"), &[]).await
    }
}
