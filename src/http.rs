//! HTTP client adapter
//!
//! Wraps the wire transport with bearer-token injection and normalizes
//! every backend reply to a `{success, data, error}` shape:
//!
//! - Well-formed non-2xx responses become [`ApiOutcome::Failure`] values,
//!   never `Err`.
//! - `Err` is reserved for transport failures and non-JSON bodies — local
//!   faults, not recoverable API errors.
//! - A 401 on an authenticated request triggers exactly one token refresh
//!   and one retry; if the refresh fails the original 401 failure is
//!   returned untouched. Refreshes are serialized so a second 401 arriving
//!   mid-refresh reuses the rotated token instead of refreshing again.
//!
//! The wire itself sits behind the [`Transport`] trait: production uses
//! the reqwest-backed [`HttpTransport`], tests script responses to pin
//! down the refresh/retry sequencing.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::session::SessionContext;
use crate::{log_debug, log_error, log_info, log_warn};

/// Fallback when the server's error body is missing or malformed.
pub const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

/// Normalized result of one API call.
#[derive(Debug, Clone)]
pub enum ApiOutcome {
    Success(Value),
    Failure(ApiFailure),
}

/// A business-rule rejection or HTTP-level failure the UI displays verbatim.
#[derive(Debug, Clone)]
pub struct ApiFailure {
    /// Server-provided error text, or [`GENERIC_ERROR`].
    pub message: String,
    /// Business status code, e.g. `ALREADY_USED`.
    pub status_code: Option<String>,
    /// Server-computed count appended to the displayed message.
    pub attempts_remaining: Option<u32>,
    pub http_status: u16,
    /// Full response body for endpoint-specific fields.
    pub raw: Value,
}

impl ApiFailure {
    /// Message with the attempts-remaining augmentation applied.
    pub fn display_message(&self) -> String {
        crate::format::append_attempts(&self.message, self.attempts_remaining)
    }
}

/// Map an HTTP status and parsed JSON body to an outcome.
///
/// Success requires a 2xx status and the absence of `"success": false` in
/// the body. The error message comes from the body's `error` field; a
/// malformed error body falls back to [`GENERIC_ERROR`] instead of
/// panicking.
pub(crate) fn normalize_response(http_status: u16, body: Value) -> ApiOutcome {
    let declared_failure = body.get("success").and_then(Value::as_bool) == Some(false);

    if (200..300).contains(&http_status) && !declared_failure {
        return ApiOutcome::Success(body);
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_ERROR.to_string());
    let status_code = body
        .get("status_code")
        .and_then(Value::as_str)
        .map(str::to_string);
    let attempts_remaining = body
        .get("attempts_remaining")
        .and_then(Value::as_u64)
        .map(|n| n as u32);

    ApiOutcome::Failure(ApiFailure {
        message,
        status_code,
        attempts_remaining,
        http_status,
        raw: body,
    })
}

/// One wire exchange before normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Value,
}

/// The wire seam under the adapter.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<RawResponse, AppError>;
}

/// reqwest-backed transport: one shared client with timeouts, reused
/// across requests.
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.api.connect_timeout_secs))
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
        bearer: Option<&str>,
    ) -> Result<RawResponse, AppError> {
        let mut req = self.http.request(method, url);
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                log_error!("HTTP", "Non-JSON response body", e.to_string());
                AppError::MalformedResponse(format!("HTTP {}: {}", status, e))
            })?
        };

        Ok(RawResponse { status, body })
    }
}

pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    base_url: String,
    session: SessionContext,
    /// Serializes refresh attempts: one refresh at a time, waiters reuse
    /// the rotated token.
    refresh_gate: Mutex<()>,
}

impl ApiClient<HttpTransport> {
    pub fn new(config: &AppConfig, session: SessionContext) -> Result<Self, AppError> {
        Ok(Self::with_transport(
            HttpTransport::new(config)?,
            &config.api.base_url,
            session,
        ))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Adapter over an explicit transport.
    pub fn with_transport(transport: T, base_url: &str, session: SessionContext) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            refresh_gate: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// One normalized API call, with the single 401-refresh-retry applied
    /// when `include_auth` is set.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        include_auth: bool,
    ) -> Result<ApiOutcome, AppError> {
        let token = if include_auth {
            self.session.access_token()
        } else {
            None
        };

        let outcome = self
            .send(method.clone(), path, body, token.as_deref())
            .await?;

        let failure = match outcome {
            ApiOutcome::Success(data) => return Ok(ApiOutcome::Success(data)),
            ApiOutcome::Failure(f) => f,
        };

        if failure.http_status != 401 || !include_auth {
            return Ok(ApiOutcome::Failure(failure));
        }

        let fresh = match self.refreshed_access_token(token.as_deref()).await {
            Some(t) => t,
            None => {
                log_warn!("HTTP", "Token refresh failed, returning original 401");
                return Ok(ApiOutcome::Failure(failure));
            }
        };

        log_debug!("HTTP", "Retrying request with refreshed token");
        // A second 401 here is returned as-is: no further refresh.
        self.send(method, path, body, Some(fresh.as_str())).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<ApiOutcome, AppError> {
        let raw = self
            .transport
            .send(method, &self.url(path), body, token)
            .await?;
        Ok(normalize_response(raw.status, raw.body))
    }

    /// Obtain a usable access token after a 401, refreshing at most once.
    ///
    /// `stale` is the token the failed request used. If the stored token
    /// already differs, another task completed a refresh while we waited on
    /// the gate and we reuse its result.
    async fn refreshed_access_token(&self, stale: Option<&str>) -> Option<String> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.session.access_token();
        if current.is_some() && current.as_deref() != stale {
            return current;
        }

        let refresh = self.session.refresh_token()?;
        let body = serde_json::json!({ "refresh": refresh });

        let outcome = self
            .send(Method::POST, "auth/refresh/", Some(&body), None)
            .await
            .ok()?;

        match outcome {
            ApiOutcome::Success(data) => {
                let access = data.get("access")?.as_str()?.to_string();
                self.session.store_access_token(&access);
                log_info!("HTTP", "Access token refreshed");
                Some(access)
            }
            ApiOutcome::Failure(_) => {
                log_warn!("HTTP", "Refresh endpoint rejected the refresh token");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::PrefStore;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn two_hundred_with_success_true_is_success() {
        let outcome = normalize_response(200, json!({"success": true, "redemption_id": "r1"}));
        match outcome {
            ApiOutcome::Success(data) => assert_eq!(data["redemption_id"], "r1"),
            ApiOutcome::Failure(_) => panic!("expected success"),
        }
    }

    #[test]
    fn two_hundred_without_success_field_is_success() {
        // e.g. GET offer metadata, token refresh
        let outcome = normalize_response(200, json!({"access": "tok"}));
        assert!(matches!(outcome, ApiOutcome::Success(_)));
    }

    #[test]
    fn declared_failure_on_two_hundred_is_failure() {
        let outcome = normalize_response(
            200,
            json!({"success": false, "error": "Invalid OTP", "attempts_remaining": 2}),
        );
        match outcome {
            ApiOutcome::Failure(f) => {
                assert_eq!(f.message, "Invalid OTP");
                assert_eq!(f.attempts_remaining, Some(2));
                assert_eq!(f.http_status, 200);
            }
            ApiOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn non_2xx_is_failure_not_error() {
        let outcome = normalize_response(
            409,
            json!({"success": false, "error": "Code already used", "status_code": "ALREADY_USED"}),
        );
        match outcome {
            ApiOutcome::Failure(f) => {
                assert_eq!(f.status_code.as_deref(), Some("ALREADY_USED"));
                assert_eq!(f.http_status, 409);
            }
            ApiOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn malformed_error_body_falls_back_to_generic_message() {
        let outcome = normalize_response(500, json!({"unexpected": ["shape"]}));
        match outcome {
            ApiOutcome::Failure(f) => assert_eq!(f.message, GENERIC_ERROR),
            ApiOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn display_message_appends_attempts() {
        let outcome = normalize_response(
            400,
            json!({"success": false, "error": "Invalid OTP", "attempts_remaining": 2}),
        );
        let ApiOutcome::Failure(f) = outcome else {
            panic!("expected failure")
        };
        let message = f.display_message();
        assert!(message.contains("Invalid OTP"));
        assert!(message.contains("2 attempts remaining"));
    }

    #[test]
    fn failure_keeps_raw_body_for_endpoint_fields() {
        let outcome = normalize_response(
            409,
            json!({
                "success": false,
                "error": "Code already used",
                "status_code": "ALREADY_USED",
                "redeemed_at": "2026-08-01T12:30:00Z"
            }),
        );
        let ApiOutcome::Failure(f) = outcome else {
            panic!("expected failure")
        };
        assert_eq!(f.raw["redeemed_at"], "2026-08-01T12:30:00Z");
    }

    /// Scripted wire: authenticated calls with the stale token get 401,
    /// calls with the fresh token succeed, refresh rotates the token.
    struct ScriptedTransport {
        refresh_ok: bool,
        reject_fresh_token: bool,
        refresh_calls: AtomicUsize,
        protected_calls: AtomicUsize,
        /// Holds initial stale-token calls until all expected ones arrive,
        /// forcing the 401s to overlap.
        stale_gate: Option<tokio::sync::Barrier>,
    }

    impl Default for ScriptedTransport {
        fn default() -> Self {
            Self {
                refresh_ok: true,
                reject_fresh_token: false,
                refresh_calls: AtomicUsize::new(0),
                protected_calls: AtomicUsize::new(0),
                stale_gate: None,
            }
        }
    }

    #[async_trait::async_trait]
    impl Transport for ScriptedTransport {
        async fn send(
            &self,
            _method: Method,
            url: &str,
            _body: Option<&Value>,
            bearer: Option<&str>,
        ) -> Result<RawResponse, AppError> {
            if url.ends_with("/auth/refresh/") {
                self.refresh_calls.fetch_add(1, Ordering::SeqCst);
                return if self.refresh_ok {
                    Ok(RawResponse {
                        status: 200,
                        body: json!({"access": "fresh"}),
                    })
                } else {
                    Ok(RawResponse {
                        status: 401,
                        body: json!({"success": false, "error": "Refresh token expired"}),
                    })
                };
            }

            self.protected_calls.fetch_add(1, Ordering::SeqCst);
            if bearer == Some("fresh") && !self.reject_fresh_token {
                return Ok(RawResponse {
                    status: 200,
                    body: json!({"success": true}),
                });
            }
            if let Some(barrier) = &self.stale_gate {
                barrier.wait().await;
            }
            Ok(RawResponse {
                status: 401,
                body: json!({"success": false, "error": "Token expired"}),
            })
        }
    }

    fn client_with(
        transport: ScriptedTransport,
    ) -> (tempfile::TempDir, ApiClient<ScriptedTransport>) {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Arc::new(PrefStore::open(dir.path().join("prefs.dat")));
        let session = SessionContext::new(prefs);
        session.login("stale", "refresh-1").unwrap();
        let client = ApiClient::with_transport(transport, "https://api.test", session);
        (dir, client)
    }

    #[tokio::test]
    async fn one_401_triggers_one_refresh_and_one_retry() {
        let (_dir, client) = client_with(ScriptedTransport::default());

        let outcome = client
            .request(Method::GET, "/subadmin/offers/", None, true)
            .await
            .unwrap();

        assert!(matches!(outcome, ApiOutcome::Success(_)));
        assert_eq!(client.transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.transport.protected_calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.session.access_token().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn second_401_is_returned_without_another_refresh() {
        let transport = ScriptedTransport {
            reject_fresh_token: true,
            ..Default::default()
        };
        let (_dir, client) = client_with(transport);

        let outcome = client
            .request(Method::GET, "/subadmin/offers/", None, true)
            .await
            .unwrap();

        let ApiOutcome::Failure(f) = outcome else {
            panic!("expected failure")
        };
        assert_eq!(f.http_status, 401);
        assert_eq!(client.transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.transport.protected_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_refresh_returns_original_401_untouched() {
        let transport = ScriptedTransport {
            refresh_ok: false,
            ..Default::default()
        };
        let (_dir, client) = client_with(transport);

        let outcome = client
            .request(Method::GET, "/subadmin/offers/", None, true)
            .await
            .unwrap();

        let ApiOutcome::Failure(f) = outcome else {
            panic!("expected failure")
        };
        assert_eq!(f.http_status, 401);
        assert_eq!(f.message, "Token expired");
        assert_eq!(client.transport.refresh_calls.load(Ordering::SeqCst), 1);
        // No retry of the original request after a failed refresh.
        assert_eq!(client.transport.protected_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unauthenticated_requests_never_refresh() {
        let (_dir, client) = client_with(ScriptedTransport::default());

        let outcome = client
            .request(Method::GET, "/subadmin/public/offer/X/", None, false)
            .await
            .unwrap();

        assert!(matches!(outcome, ApiOutcome::Failure(_)));
        assert_eq!(client.transport.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn concurrent_401s_share_a_single_refresh() {
        let transport = ScriptedTransport {
            stale_gate: Some(tokio::sync::Barrier::new(2)),
            ..Default::default()
        };
        let (_dir, client) = client_with(transport);

        let (a, b) = tokio::join!(
            client.request(Method::GET, "/subadmin/offers/", None, true),
            client.request(Method::GET, "/subadmin/surveys/", None, true),
        );

        assert!(matches!(a.unwrap(), ApiOutcome::Success(_)));
        assert!(matches!(b.unwrap(), ApiOutcome::Success(_)));
        // Both requests hit the stale 401, but only one refresh ran; the
        // waiter reused the rotated token.
        assert_eq!(client.transport.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(client.transport.protected_calls.load(Ordering::SeqCst), 4);
    }
}
