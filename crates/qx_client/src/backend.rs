//! Backend status, calibration and parameters

use crate::client::Client;
use crate::error::QxResult;
use crate::options::ExecOptions;
use crate::registry::ResolveKind;
use qx_core::constants::backend::SIMULATOR_DEVICE;
use qx_core::{BackendParameters, BackendStatus, Calibration};

impl Client {
    /// Queue status of a backend
    pub async fn backend_status(&self, backend: &str) -> QxResult<BackendStatus> {
        let device = self.check_backend(backend, ResolveKind::Status)?;

        let mut status: BackendStatus = self
            .session
            .get(
                &format!("Backends/{device}/queue/status"),
                &[("withToken", "false".to_string())],
            )
            .await?;
        status.backend = device;
        Ok(status)
    }

    /// Latest calibration of a backend
    ///
    /// A hub in `overrides` (or the defaults) selects the hub's device
    /// endpoint. Simulators have no calibration and get an empty value.
    pub async fn backend_calibration(
        &self,
        backend: &str,
        overrides: &ExecOptions,
    ) -> QxResult<Calibration> {
        let device = self.check_backend(backend, ResolveKind::Calibration)?;
        if device == SIMULATOR_DEVICE {
            return Ok(Calibration::empty(device));
        }

        let path = format!("{}/calibration", self.device_path(&device, overrides));
        let mut calibration: Calibration = self.session.get(&path, &[]).await?;
        calibration.backend = device;
        Ok(calibration)
    }

    /// Latest parameters of a backend
    ///
    /// Same endpoint selection as [`Client::backend_calibration`].
    pub async fn backend_parameters(
        &self,
        backend: &str,
        overrides: &ExecOptions,
    ) -> QxResult<BackendParameters> {
        let device = self.check_backend(backend, ResolveKind::Calibration)?;
        if device == SIMULATOR_DEVICE {
            return Ok(BackendParameters::empty(device));
        }

        let path = format!("{}/parameters", self.device_path(&device, overrides));
        let mut parameters: BackendParameters = self.session.get(&path, &[]).await?;
        parameters.backend = device;
        Ok(parameters)
    }

    fn device_path(&self, device: &str, overrides: &ExecOptions) -> String {
        match self.effective(overrides).hub {
            Some(hub) => format!("Networks/{hub}/devices/{device}"),
            None => format!("Backends/{device}"),
        }
    }
}
