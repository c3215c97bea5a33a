//! Connection and execution options
//!
//! [`DialOptions`] configure a [`Session`](crate::Session) once, at dial
//! time. [`ExecOptions`] configure individual calls. Precedence for
//! execution values is: call-time overrides, then client defaults, then
//! the documented defaults in [`qx_core::constants`].

use crate::error::{QxError, QxResult};
use qx_core::constants::connection::{
    DEFAULT_CLIENT_APPLICATION, DEFAULT_RETRIES, DEFAULT_RETRY_BACKOFF, DEFAULT_TIMEOUT,
    DEFAULT_URL,
};
use qx_core::clamp_shots;
use qx_core::constants::execution::{
    DEFAULT_BACKEND, DEFAULT_NAME_PREFIX, DEFAULT_SHOTS, MAX_SEED, MAX_TIMEOUT,
};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

// ============================================================================
// Dial Options
// ============================================================================

/// Connection-level options
#[derive(Clone, PartialEq)]
pub struct DialOptions {
    pub(crate) api_token: Option<String>,
    pub(crate) email: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) access_token: Option<String>,
    pub(crate) user_id: Option<String>,
    pub(crate) url: String,
    pub(crate) proxies: HashMap<String, String>,
    pub(crate) proxy_auth: Option<(String, String)>,
    pub(crate) retries: usize,
    pub(crate) retry_backoff: Duration,
    pub(crate) timeout: Duration,
    pub(crate) client_application: Option<String>,
}

impl Default for DialOptions {
    fn default() -> Self {
        Self {
            api_token: None,
            email: None,
            password: None,
            access_token: None,
            user_id: None,
            url: DEFAULT_URL.to_string(),
            proxies: HashMap::new(),
            proxy_auth: None,
            retries: DEFAULT_RETRIES,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            timeout: DEFAULT_TIMEOUT,
            client_application: None,
        }
    }
}

impl fmt::Debug for DialOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |v: &Option<String>| v.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("DialOptions")
            .field("api_token", &redacted(&self.api_token))
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .field("access_token", &redacted(&self.access_token))
            .field("user_id", &self.user_id)
            .field("url", &self.url)
            .field("proxies", &self.proxies)
            .field("retries", &self.retries)
            .field("retry_backoff", &self.retry_backoff)
            .field("timeout", &self.timeout)
            .field("client_application", &self.client_application)
            .finish()
    }
}

impl DialOptions {
    /// Create options with every default applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from `QX_*` environment variables
    ///
    /// Recognized: `QX_API_TOKEN`, `QX_EMAIL`/`QX_PASSWORD`,
    /// `QX_ACCESS_TOKEN`/`QX_USER_ID`, `QX_API_URL`, `QX_RETRIES`,
    /// `QX_TIMEOUT_SECS`, `QX_CLIENT_APPLICATION`.
    pub fn from_env() -> QxResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> QxResult<Self> {
        let mut options = Self::default();

        if let Some(token) = lookup("QX_API_TOKEN") {
            options = options.with_api_token(token);
        }
        if let (Some(email), Some(password)) = (lookup("QX_EMAIL"), lookup("QX_PASSWORD")) {
            options = options.with_login_info(email, password);
        }
        if let (Some(token), Some(user_id)) = (lookup("QX_ACCESS_TOKEN"), lookup("QX_USER_ID")) {
            options = options.with_access_info(token, user_id);
        }
        if !options.has_credentials() {
            return Err(QxError::Credentials(
                "no credentials found; set QX_API_TOKEN, QX_EMAIL/QX_PASSWORD or QX_ACCESS_TOKEN/QX_USER_ID"
                    .into(),
            ));
        }

        if let Some(url) = lookup("QX_API_URL") {
            options = options.with_api_url(url);
        }
        if let Some(retries) = lookup("QX_RETRIES") {
            let retries = retries
                .parse()
                .map_err(|_| QxError::Config(format!("invalid QX_RETRIES: {retries}")))?;
            options = options.with_retries(retries);
        }
        if let Some(secs) = lookup("QX_TIMEOUT_SECS") {
            let secs = secs
                .parse()
                .map_err(|_| QxError::Config(format!("invalid QX_TIMEOUT_SECS: {secs}")))?;
            options = options.with_timeout(Duration::from_secs(secs));
        }
        if let Some(application) = lookup("QX_CLIENT_APPLICATION") {
            options = options.with_client_application(application);
        }

        Ok(options)
    }

    /// Obtain the access token by exchanging an API token
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Obtain the access token by logging in with email and password
    pub fn with_login_info(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self.password = Some(password.into());
        self
    }

    /// Use an already obtained access token and user id (skips login)
    pub fn with_access_info(mut self, token: impl Into<String>, user_id: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self.user_id = Some(user_id.into());
        self
    }

    /// Use a different API endpoint
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Route requests through proxies
    ///
    /// `urls` maps a scheme (`http`, `https` or `all`) to a proxy URL.
    /// `auth` is an optional username/password pair for the proxies.
    pub fn with_proxies(
        mut self,
        urls: HashMap<String, String>,
        auth: Option<(String, String)>,
    ) -> Self {
        self.proxies = urls;
        self.proxy_auth = auth;
        self
    }

    /// Number of attempts per request (0 keeps the default)
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = if retries == 0 { DEFAULT_RETRIES } else { retries };
        self
    }

    /// Base delay between counted retries
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Timeout of each request (zero keeps the default)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            timeout
        };
        self
    }

    /// Suffix identifying the calling application
    pub fn with_client_application(mut self, application: impl Into<String>) -> Self {
        self.client_application = Some(application.into());
        self
    }

    /// Check if at least one credential source is present
    pub fn has_credentials(&self) -> bool {
        self.api_token.is_some() || self.email.is_some() || self.access_token.is_some()
    }

    /// API endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Attempts per request
    pub fn retries(&self) -> usize {
        self.retries
    }

    /// Timeout of each request
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Base delay between retries
    pub fn retry_backoff(&self) -> Duration {
        self.retry_backoff
    }

    /// Value of the client application header
    pub fn client_application_header(&self) -> String {
        match &self.client_application {
            Some(suffix) => format!("{DEFAULT_CLIENT_APPLICATION}:{suffix}"),
            None => DEFAULT_CLIENT_APPLICATION.to_string(),
        }
    }

    /// Body of the login exchange, preferring the API token
    pub(crate) fn login_request(&self) -> Option<LoginRequest> {
        if let Some(token) = &self.api_token {
            return Some(LoginRequest {
                api_token: Some(token.clone()),
                ..Default::default()
            });
        }
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some(LoginRequest {
                email: Some(email.clone()),
                password: Some(password.clone()),
                ..Default::default()
            }),
            _ => None,
        }
    }
}

/// Login exchange body
#[derive(Default, Serialize)]
pub(crate) struct LoginRequest {
    #[serde(rename = "apiToken", skip_serializing_if = "Option::is_none")]
    pub(crate) api_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) password: Option<String>,
}

// ============================================================================
// Execution Options
// ============================================================================

/// High-performance simulator settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HpcOptions {
    /// Reuse state across shots
    pub multi_shot_optimization: bool,

    /// OpenMP threads on the simulator
    pub omp_num_threads: u32,
}

/// Hub/group/project scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Network {
    /// Hub
    pub hub: String,
    /// Group
    pub group: String,
    /// Project
    pub project: String,
}

/// Call-level options; every field left `None` falls back
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOptions {
    /// Backend name (legacy alias or device name)
    pub backend: Option<String>,

    /// Shots per circuit, capped at `MAX_SHOTS` on resolution
    pub shots: Option<u32>,

    /// Experiment or job name
    pub name: Option<String>,

    /// Caller-side bound on waiting for results, never sent to the server
    pub timeout: Option<Duration>,

    /// Simulator seed
    pub seed: Option<u64>,

    /// Credit ceiling
    pub max_credits: Option<u32>,

    /// Simulator HPC settings
    pub hpc: Option<HpcOptions>,

    /// Hub
    pub hub: Option<String>,

    /// Group
    pub group: Option<String>,

    /// Project
    pub project: Option<String>,
}

impl ExecOptions {
    /// Create empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the backend
    pub fn with_backend(mut self, backend: impl Into<String>) -> Self {
        self.backend = Some(backend.into());
        self
    }

    /// Set the shots
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.shots = Some(shots);
        self
    }

    /// Set the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the result timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the credit ceiling
    pub fn with_max_credits(mut self, max_credits: u32) -> Self {
        self.max_credits = Some(max_credits);
        self
    }

    /// Set the HPC settings
    pub fn with_hpc(mut self, hpc: HpcOptions) -> Self {
        self.hpc = Some(hpc);
        self
    }

    /// Set only the hub (used for calibration and parameter lookups)
    pub fn with_hub(mut self, hub: impl Into<String>) -> Self {
        self.hub = Some(hub.into());
        self
    }

    /// Scope requests to a hub/group/project
    pub fn with_network(
        mut self,
        hub: impl Into<String>,
        group: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        self.hub = Some(hub.into());
        self.group = Some(group.into());
        self.project = Some(project.into());
        self
    }

    /// Combine with overrides; fields set in `overrides` win
    pub fn merge(&self, overrides: &ExecOptions) -> ExecOptions {
        fn pick<T: Clone>(over: &Option<T>, base: &Option<T>) -> Option<T> {
            over.clone().or_else(|| base.clone())
        }

        ExecOptions {
            backend: pick(&overrides.backend, &self.backend),
            shots: pick(&overrides.shots, &self.shots),
            name: pick(&overrides.name, &self.name),
            timeout: pick(&overrides.timeout, &self.timeout),
            seed: pick(&overrides.seed, &self.seed),
            max_credits: pick(&overrides.max_credits, &self.max_credits),
            hpc: pick(&overrides.hpc, &self.hpc),
            hub: pick(&overrides.hub, &self.hub),
            group: pick(&overrides.group, &self.group),
            project: pick(&overrides.project, &self.project),
        }
    }

    /// Hub/group/project scope, only when all three are set
    pub fn network(&self) -> Option<Network> {
        match (&self.hub, &self.group, &self.project) {
            (Some(hub), Some(group), Some(project)) => Some(Network {
                hub: hub.clone(),
                group: group.clone(),
                project: project.clone(),
            }),
            _ => None,
        }
    }

    /// Apply the documented defaults
    pub fn resolve(&self) -> ExecConfig {
        ExecConfig {
            backend: self
                .backend
                .clone()
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
            shots: clamp_shots(self.shots.filter(|s| *s > 0).unwrap_or(DEFAULT_SHOTS)),
            name: self
                .name
                .clone()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(default_name),
            timeout: self.timeout.map(|t| t.min(MAX_TIMEOUT)),
            seed: self.seed,
            max_credits: self.max_credits,
            hpc: self.hpc,
        }
    }
}

/// Name derived from the current local time
fn default_name() -> String {
    format!(
        "{DEFAULT_NAME_PREFIX}{}",
        chrono::Local::now().format("%Y%m%d%H%M%S")
    )
}

/// Fully resolved execution settings for one call
#[derive(Debug, Clone, PartialEq)]
pub struct ExecConfig {
    /// Backend name as requested (not yet resolved)
    pub backend: String,
    /// Shots per circuit, at most `MAX_SHOTS`
    pub shots: u32,
    /// Experiment or job name
    pub name: String,
    /// Caller-side bound on waiting for results, at most `MAX_TIMEOUT`
    ///
    /// Never sent to the server. `run_job` copies it onto the tracked job
    /// when the job carries no timeout of its own.
    pub timeout: Option<Duration>,
    /// Simulator seed
    pub seed: Option<u64>,
    /// Credit ceiling
    pub max_credits: Option<u32>,
    /// Simulator HPC settings
    pub hpc: Option<HpcOptions>,
}

impl ExecConfig {
    /// Reject seeds longer than 10 digits
    pub fn validate(&self) -> QxResult<()> {
        match self.seed {
            Some(seed) if seed > MAX_SEED => Err(QxError::Api(format!(
                "invalid seed ({seed}), seeds can have a maximum length of 10 digits"
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dial_defaults() {
        let options = DialOptions::new();
        assert_eq!(options.url(), DEFAULT_URL);
        assert_eq!(options.retries(), 5);
        assert_eq!(options.timeout(), Duration::from_secs(30));
        assert!(!options.has_credentials());
    }

    #[test]
    fn test_zero_values_keep_defaults() {
        let options = DialOptions::new()
            .with_retries(0)
            .with_timeout(Duration::ZERO);
        assert_eq!(options.retries(), DEFAULT_RETRIES);
        assert_eq!(options.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_later_options_override() {
        let options = DialOptions::new()
            .with_api_url("https://a.example/api")
            .with_retries(2)
            .with_api_url("https://b.example/api");
        assert_eq!(options.url(), "https://b.example/api");
        assert_eq!(options.retries(), 2);
    }

    #[test]
    fn test_login_request_prefers_token() {
        let options = DialOptions::new()
            .with_login_info("me@example.com", "secret")
            .with_api_token("token");
        let request = options.login_request().unwrap();
        assert_eq!(request.api_token.as_deref(), Some("token"));
        assert!(request.email.is_none());

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body, serde_json::json!({"apiToken": "token"}));
    }

    #[test]
    fn test_login_request_needs_password() {
        let mut options = DialOptions::new();
        options.email = Some("me@example.com".into());
        assert!(options.has_credentials());
        assert!(options.login_request().is_none());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let options = DialOptions::new()
            .with_api_token("super-secret-token")
            .with_login_info("me@example.com", "hunter2");
        let debug = format!("{options:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("me@example.com"));
    }

    #[test]
    fn test_client_application_header() {
        assert_eq!(
            DialOptions::new().client_application_header(),
            DEFAULT_CLIENT_APPLICATION
        );
        assert_eq!(
            DialOptions::new()
                .with_client_application("notebook")
                .client_application_header(),
            format!("{DEFAULT_CLIENT_APPLICATION}:notebook")
        );
    }

    #[test]
    fn test_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("QX_API_TOKEN", "token"),
            ("QX_API_URL", "https://qx.example/api"),
            ("QX_RETRIES", "3"),
            ("QX_TIMEOUT_SECS", "10"),
        ]
        .into_iter()
        .collect();

        let options = DialOptions::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(options.api_token.as_deref(), Some("token"));
        assert_eq!(options.url(), "https://qx.example/api");
        assert_eq!(options.retries(), 3);
        assert_eq!(options.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_from_lookup_errors() {
        let missing = DialOptions::from_lookup(|_| None);
        assert!(matches!(missing, Err(QxError::Credentials(_))));

        let bad_retries = DialOptions::from_lookup(|k| match k {
            "QX_API_TOKEN" => Some("token".into()),
            "QX_RETRIES" => Some("many".into()),
            _ => None,
        });
        assert!(matches!(bad_retries, Err(QxError::Config(_))));
    }

    #[test]
    fn test_exec_defaults() {
        let config = ExecOptions::new().resolve();
        assert_eq!(config.backend, "simulator");
        assert_eq!(config.shots, 1);
        assert!(config.name.starts_with(DEFAULT_NAME_PREFIX));
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_precedence() {
        let defaults = ExecOptions::new()
            .with_backend("ibmqx4")
            .with_shots(100)
            .with_name("defaults");
        let overrides = ExecOptions::new().with_shots(1024).with_seed(7);

        let merged = defaults.merge(&overrides);
        assert_eq!(merged.backend.as_deref(), Some("ibmqx4"));
        assert_eq!(merged.shots, Some(1024));
        assert_eq!(merged.seed, Some(7));
        assert_eq!(merged.name.as_deref(), Some("defaults"));
    }

    #[test]
    fn test_network_requires_all_parts() {
        assert!(ExecOptions::new().with_hub("ibm-q").network().is_none());

        let network = ExecOptions::new()
            .with_network("ibm-q", "open", "main")
            .network()
            .unwrap();
        assert_eq!(network.group, "open");
    }

    #[test]
    fn test_seed_validation() {
        let ok = ExecOptions::new().with_seed(MAX_SEED).resolve();
        assert!(ok.validate().is_ok());

        let too_long = ExecOptions::new().with_seed(MAX_SEED + 1).resolve();
        assert!(matches!(too_long.validate(), Err(QxError::Api(_))));
    }

    #[test]
    fn test_resolve_clamps_shots_and_timeout() {
        let config = ExecOptions::new()
            .with_shots(100_000)
            .with_timeout(Duration::from_secs(3600))
            .resolve();
        assert_eq!(config.shots, 8192);
        assert_eq!(config.timeout, Some(MAX_TIMEOUT));

        let short = ExecOptions::new()
            .with_timeout(Duration::from_secs(10))
            .resolve();
        assert_eq!(short.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_hpc_serialize() {
        let hpc = HpcOptions {
            multi_shot_optimization: true,
            omp_num_threads: 4,
        };
        assert_eq!(
            serde_json::to_value(hpc).unwrap(),
            serde_json::json!({"multi_shot_optimization": true, "omp_num_threads": 4})
        );
    }
}
