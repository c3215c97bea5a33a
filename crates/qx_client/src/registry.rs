//! Backend registry and name resolution

use crate::client::Client;
use crate::error::{QxError, QxResult};
use crate::options::ExecOptions;
use qx_core::{legacy_backend, Backend, Backends};

/// Operation a backend name is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveKind {
    /// Single experiment; legacy aliases are accepted
    Experiment,
    /// Multi-circuit job
    Job,
    /// Queue status
    Status,
    /// Calibration or parameters
    Calibration,
}

/// Resolve a user-supplied backend name to its canonical form
///
/// Experiments first try the legacy alias table (lowercased). Every kind
/// then looks the name up in `registry` using its original case and, on a
/// hit, returns the lowercased name.
pub fn resolve_backend(registry: &Backends, name: &str, kind: ResolveKind) -> Option<String> {
    let lowered = name.to_lowercase();

    if kind == ResolveKind::Experiment {
        if let Some(canonical) = legacy_backend(&lowered) {
            return Some(canonical.to_string());
        }
    }

    registry.contains(name).then_some(lowered)
}

impl Client {
    /// Resolve `name` against the registry, failing with [`QxError::BadBackend`]
    pub fn check_backend(&self, name: &str, kind: ResolveKind) -> QxResult<String> {
        let state = self.state();
        resolve_backend(&state.backends, name, kind).ok_or_else(|| QxError::BadBackend {
            backend: name.to_string(),
        })
    }

    /// Fetch the backends visible to the caller and merge the online ones
    ///
    /// Scoped to a project when `overrides` (or the client defaults) carry
    /// a hub, group and project. Returns the whole accumulated registry.
    pub async fn available_backends(&self, overrides: &ExecOptions) -> QxResult<Backends> {
        let path = match self.effective(overrides).network() {
            Some(network) => format!(
                "Network/{}/Groups/{}/Projects/{}/backends",
                network.hub, network.group, network.project
            ),
            None => "Backends".to_string(),
        };

        let fetched: Vec<Backend> = self.session.get(&path, &[]).await?;

        let mut state = self.state();
        let inserted = state.backends.absorb(fetched);
        log::debug!(
            "Registered {} online backends ({} known)",
            inserted,
            state.backends.len()
        );
        Ok(state.backends.clone())
    }
}
