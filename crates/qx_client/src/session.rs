//! QX API session
//!
//! A [`Session`] owns the transport and the authentication state. It is
//! created once with [`Session::dial`] and then shared (behind an `Arc`)
//! by every [`Client`](crate::Client) built on top of it.

use crate::error::{QxError, QxResult};
use crate::options::DialOptions;
use qx_core::constants::connection::CLIENT_APPLICATION_HEADER;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use tokio::sync::{Mutex, RwLock};
use url::Url;

/// Query parameters appended after the access token
pub type Params<'a> = [(&'a str, String)];

/// Token and user id currently in use
#[derive(Clone, Default)]
struct AuthState {
    access_token: String,
    user_id: String,
}

/// Login exchange response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    id: String,
    #[serde(default)]
    user_id: String,
    #[serde(default)]
    ttl: f64,
}

/// Authenticated connection to the QX API
pub struct Session {
    pub(crate) http: reqwest::Client,
    pub(crate) options: DialOptions,
    pub(crate) base_url: Url,
    auth: RwLock<AuthState>,
    login_lock: Mutex<()>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("options", &self.options)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

impl Session {
    /// Connect to the API, logging in unless access info was supplied
    ///
    /// Fails with [`QxError::Credentials`] when no credential source is
    /// configured or the server rejects the login.
    pub async fn dial(options: DialOptions) -> QxResult<Self> {
        if !options.has_credentials() {
            return Err(QxError::Credentials(
                "missing credentials to obtain access token; provide an API token, email/password or access info"
                    .into(),
            ));
        }

        let base_url = parse_base_url(options.url())?;
        let http = build_http(&options)?;

        let auth = match (&options.access_token, &options.user_id) {
            (Some(token), Some(user_id)) if !token.is_empty() => AuthState {
                access_token: token.clone(),
                user_id: user_id.clone(),
            },
            _ => AuthState::default(),
        };
        let needs_login = auth.access_token.is_empty();

        let session = Self {
            http,
            options,
            base_url,
            auth: RwLock::new(auth),
            login_lock: Mutex::new(()),
        };

        if needs_login {
            session.obtain_token().await?;
        }

        Ok(session)
    }

    /// Options the session was dialed with
    pub fn options(&self) -> &DialOptions {
        &self.options
    }

    /// Base URL every path is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current access token
    pub async fn access_token(&self) -> String {
        self.auth.read().await.access_token.clone()
    }

    /// Current user id
    pub async fn user_id(&self) -> String {
        self.auth.read().await.user_id.clone()
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Exchange the configured credentials for a new access token
    async fn obtain_token(&self) -> QxResult<()> {
        let request = self.options.login_request().ok_or_else(|| {
            QxError::Credentials(
                "invalid credentials, please provide either an API token or user email and password"
                    .into(),
            )
        })?;

        let path = if request.api_token.is_some() {
            "users/loginWithToken"
        } else {
            "users/login"
        };

        let body = self.login_exchange(path, &request).await?;
        let login: LoginResponse = serde_json::from_str(&body)?;
        if login.id.is_empty() {
            return Err(QxError::Credentials(
                "login response did not carry an access token".into(),
            ));
        }

        log::info!(
            "Logged in to {} as user {} (ttl {}s)",
            self.base_url,
            login.user_id,
            login.ttl
        );

        *self.auth.write().await = AuthState {
            access_token: login.id,
            user_id: login.user_id,
        };
        Ok(())
    }

    /// Log in again after `stale` was rejected
    ///
    /// Concurrent callers share one login: whoever arrives after the token
    /// has already changed returns without contacting the server.
    pub(crate) async fn reauthenticate(&self, stale: &str) -> QxResult<()> {
        let _guard = self.login_lock.lock().await;
        if self.auth.read().await.access_token != stale {
            return Ok(());
        }

        log::debug!("Access token rejected, logging in again");
        self.obtain_token().await
    }

    // ========================================================================
    // Typed requests
    // ========================================================================

    /// GET `path` and decode the JSON response
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &Params<'_>) -> QxResult<T> {
        let body = self.execute(Method::GET, path, params, None).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// POST a JSON body to `path` and decode the JSON response
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &Params<'_>,
        body: &B,
    ) -> QxResult<T> {
        let payload = serde_json::to_vec(body)?;
        let body = self.execute(Method::POST, path, params, Some(payload)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// PUT a JSON body to `path` and decode the JSON response
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        params: &Params<'_>,
        body: &B,
    ) -> QxResult<T> {
        let payload = serde_json::to_vec(body)?;
        let body = self.execute(Method::PUT, path, params, Some(payload)).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Parse the endpoint, making sure relative paths join beneath it
fn parse_base_url(raw: &str) -> QxResult<Url> {
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

/// Build the HTTP client with timeout, proxies and default headers
fn build_http(options: &DialOptions) -> QxResult<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(CLIENT_APPLICATION_HEADER),
        HeaderValue::from_str(&options.client_application_header()).map_err(|_| {
            QxError::Config("client application contains invalid header characters".into())
        })?,
    );

    let mut builder = reqwest::Client::builder()
        .default_headers(headers)
        .timeout(options.timeout());

    for (scheme, url) in &options.proxies {
        let proxy = match scheme.as_str() {
            "http" => reqwest::Proxy::http(url.as_str()),
            "https" => reqwest::Proxy::https(url.as_str()),
            "all" => reqwest::Proxy::all(url.as_str()),
            other => {
                return Err(QxError::InvalidProxy(format!(
                    "unsupported proxy scheme \"{other}\""
                )))
            }
        }
        .map_err(|e| QxError::InvalidProxy(format!("{scheme} proxy {url}: {e}")))?;

        let proxy = match &options.proxy_auth {
            Some((username, password)) => proxy.basic_auth(username, password),
            None => proxy,
        };
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}
