//! Request and retry engine
//!
//! Every API call goes through [`Session::execute`]:
//!
//! - up to `retries` attempts, stopping at the first `200 OK`
//! - a `401` triggers one re-authentication per call without consuming
//!   an attempt; a second `401` counts like any other failure
//! - a register-size rejection fails immediately with
//!   [`QxError::RegisterSize`]
//! - transport errors are returned as-is, never retried
//!
//! Counted retries sleep `attempt * retry_backoff` before the next try.

use crate::error::{ErrorEnvelope, QxError, QxResult};
use crate::options::LoginRequest;
use crate::session::{Params, Session};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode};

static REGISTER_SIZE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"register exceed the number of qubits, it can't be greater than (\d+)")
        .expect("register size pattern is valid")
});

const EXHAUSTED: &str = "failed to get proper response from backend";

impl Session {
    /// Run a request with retries and re-authentication, returning the body
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &Params<'_>,
        body: Option<Vec<u8>>,
    ) -> QxResult<String> {
        let retries = self.options.retries();
        let mut attempts = 0;
        let mut reauthenticated = false;

        while attempts < retries {
            let token = self.access_token().await;
            let response = self
                .send(&method, path, params, body.clone(), Some(&token))
                .await?;
            let status = response.status();

            if status == StatusCode::OK {
                return Ok(response.text().await?);
            }

            if status == StatusCode::UNAUTHORIZED && !reauthenticated {
                reauthenticated = true;
                self.reauthenticate(&token).await?;
                continue;
            }

            log::warn!("Got a {} response to {} {}", status.as_u16(), method, path);
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    log::warn!("Could not read the error body of {} {}: {}", method, path, e);
                    String::new()
                }
            };
            if let Some(max_qubits) = register_size_limit(&text) {
                return Err(QxError::RegisterSize { max_qubits });
            }

            attempts += 1;
            if attempts < retries {
                self.backoff(attempts).await;
            }
        }

        Err(QxError::Api(EXHAUSTED.into()))
    }

    /// Login exchange: no access token, no re-authentication
    pub(crate) async fn login_exchange(&self, path: &str, request: &LoginRequest) -> QxResult<String> {
        let payload = serde_json::to_vec(request)?;
        let retries = self.options.retries();
        let mut attempts = 0;

        while attempts < retries {
            let response = self
                .send(&Method::POST, path, &[], Some(payload.clone()), None)
                .await?;
            let status = response.status();

            match status {
                StatusCode::OK => return Ok(response.text().await?),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    return Err(QxError::Credentials(format!(
                        "login rejected with status {}",
                        status.as_u16()
                    )));
                }
                _ => log::warn!("Got a {} response to login", status.as_u16()),
            }

            attempts += 1;
            if attempts < retries {
                self.backoff(attempts).await;
            }
        }

        Err(QxError::Api(EXHAUSTED.into()))
    }

    /// Issue one request
    async fn send(
        &self,
        method: &Method,
        path: &str,
        params: &Params<'_>,
        body: Option<Vec<u8>>,
        token: Option<&str>,
    ) -> QxResult<Response> {
        let url = self.base_url.join(path)?;
        log::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), url);
        if let Some(token) = token {
            request = request.query(&[("access_token", token)]);
        }
        if !params.is_empty() {
            request = request.query(params);
        }
        if *method == Method::POST || *method == Method::PUT {
            request = request.header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }

    async fn backoff(&self, attempt: usize) {
        let delay = self.options.retry_backoff() * attempt as u32;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Largest register allowed, if the body is a register-size rejection
///
/// The structured `{"error": {"message": ...}}` shape is checked first;
/// matching the raw text covers servers that reply with plain messages.
pub(crate) fn register_size_limit(body: &str) -> Option<u64> {
    let structured = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| capture_limit(&error.message));

    structured.or_else(|| capture_limit(body))
}

fn capture_limit(text: &str) -> Option<u64> {
    REGISTER_SIZE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
