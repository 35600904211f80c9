//! The transport seam: actions hand a [`Request`] to a [`Transport`] and get
//! back a classified outcome.
//!
//! [`HttpTransport`] is the production implementation. It owns the full
//! retry/backoff policy, including 429 handling; actions never retry on
//! their own.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, ErrorCode, Result, ValidationFailure};
use crate::request::Request;
use crate::route::Method;

/// Header carrying the audit-log reason for auditable operations.
pub const AUDIT_REASON_HEADER: &str = "X-Audit-Log-Reason";

/// A successful transport response: HTTP status plus parsed JSON body.
///
/// `body` is `None` for empty responses (e.g. a 204 from a DELETE).
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code
    pub status: u16,

    /// Parsed JSON body, if the response had one
    pub body: Option<Value>,
}

/// Executes request descriptors against the remote API.
///
/// Implementations classify every outcome: `Ok` only for a 2xx response,
/// `Err` with the appropriate [`Error`] variant otherwise. The descriptor is
/// borrowed read-only for the duration of the dispatch.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute one request and return the classified outcome.
    async fn execute(&self, request: &Request) -> Result<Response>;
}

/// Production transport over reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
    token: String,
    max_attempts: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
}

impl HttpTransport {
    /// Create a transport from configuration.
    ///
    /// A `Bot ` prefix on the configured token is accepted; the
    /// authorization header always carries exactly one.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("cordial/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        let token = config
            .token
            .strip_prefix("Bot ")
            .unwrap_or(&config.token)
            .to_string();

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token,
            max_attempts: config.retry.max_attempts,
            initial_delay_ms: config.retry.initial_delay_ms,
            max_delay_ms: config.retry.max_delay_ms,
        })
    }

    fn build(&self, request: &Request) -> Result<reqwest::RequestBuilder> {
        let route = request.route();
        let url = format!("{}{}", self.base_url, route.path());

        let mut req = self
            .client
            .request(reqwest_method(route.method()), &url)
            .header(AUTHORIZATION, format!("Bot {}", self.token));

        if !route.query().is_empty() {
            req = req.query(route.query());
        }

        if let Some(reason) = request.reason() {
            let value = HeaderValue::from_str(reason).map_err(|_| {
                Error::Validation(ValidationFailure::Malformed(
                    "audit reason contains characters not representable in a header".into(),
                ))
            })?;
            req = req.header(AUDIT_REASON_HEADER, value);
        }

        if let Some(body) = request.body() {
            req = req.json(body);
        }

        Ok(req)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<Response> {
        let route = request.route();
        let mut delay = Duration::from_millis(self.initial_delay_ms);
        let mut attempts = 0;

        loop {
            attempts += 1;
            debug!(
                attempt = attempts,
                method = %route.method(),
                path = route.path(),
                "dispatching request"
            );

            let result = self.build(request)?.send().await;

            match result {
                Ok(response) => match classify(response).await {
                    Ok(ok) => return Ok(ok),
                    Err(e) if e.is_retryable() && attempts < self.max_attempts => {
                        if let Some(retry_after) = e.retry_after() {
                            delay = retry_after;
                        }
                        warn!(
                            attempt = attempts,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "retrying request"
                        );
                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay * 2, Duration::from_millis(self.max_delay_ms));
                    }
                    Err(e) => return Err(e),
                },
                Err(e) if e.is_timeout() || e.is_connect() => {
                    if attempts < self.max_attempts {
                        warn!(
                            attempt = attempts,
                            delay_ms = delay.as_millis(),
                            error = %e,
                            "retrying after connection error"
                        );
                        tokio::time::sleep(delay).await;
                        delay = std::cmp::min(delay * 2, Duration::from_millis(self.max_delay_ms));
                    } else {
                        return Err(Error::Http(e));
                    }
                }
                Err(e) => return Err(Error::Http(e)),
            }
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

async fn classify(response: reqwest::Response) -> Result<Response> {
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(30.0);

        return Err(Error::RateLimited { retry_after });
    }

    let bytes = response.bytes().await?;

    if status.is_success() {
        let body = if bytes.is_empty() {
            None
        } else {
            Some(serde_json::from_slice(&bytes).map_err(Error::decode)?)
        };
        return Ok(Response {
            status: status.as_u16(),
            body,
        });
    }

    #[derive(Deserialize)]
    struct ApiError {
        code: Option<i32>,
        message: Option<String>,
    }

    let error: ApiError = serde_json::from_slice(&bytes).unwrap_or(ApiError {
        code: None,
        message: Some(String::from_utf8_lossy(&bytes).into_owned()),
    });

    Err(Error::Response {
        status: status.as_u16(),
        code: ErrorCode::from_code(error.code.unwrap_or_else(|| i32::from(status.as_u16()))),
        message: error.message.unwrap_or_else(|| "Unknown error".into()),
    })
}
