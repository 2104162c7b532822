//! HTTP plumbing for the two-step upload: registering the commit to obtain a
//! pre-signed URL, then PUTting the stats payload to it.
//!
//! Requests go through the [`Transport`] trait so the retry and error
//! classification logic can be exercised without a network.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{BundleError, Result};
use crate::model::ServiceParams;
use crate::options::GitService;
use crate::slug::encode_slug;

/// Base delay between attempts; attempt `i` waits `i * DEFAULT_RETRY_DELAY`.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);

const USER_AGENT: &str = concat!("bundler-plugin-core/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<&'a [u8]>,
}

impl<'a> HttpRequest<'a> {
    pub fn new(method: Method, url: &'a str) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: &'a [u8]) -> Self {
        self.body = Some(body);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any HTTP status was received (DNS, connect, TLS, I/O).
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

pub trait Transport {
    fn send(&self, request: &HttpRequest<'_>) -> std::result::Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().user_agent(USER_AGENT).build(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest<'_>) -> std::result::Result<HttpResponse, TransportError> {
        let mut req = self.agent.request(request.method.as_str(), request.url);
        for (name, value) in &request.headers {
            req = req.set(name, value);
        }

        // A slice body is handed to ureq as a reader, which writes it to the
        // socket incrementally.
        let result = match request.body {
            Some(body) => req.send(body),
            None => req.call(),
        };

        match result {
            Ok(resp) => {
                let status = resp.status();
                let body = resp
                    .into_string()
                    .map_err(|e| TransportError(format!("failed to read response body: {e}")))?;
                Ok(HttpResponse { status, body })
            }
            Err(ureq::Error::Status(status, resp)) => {
                let body = resp.into_string().unwrap_or_default();
                Ok(HttpResponse { status, body })
            }
            Err(e) => Err(TransportError(e.to_string())),
        }
    }
}

/// How many times to retry and how long to back off between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_count: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retry_count: u32) -> Self {
        Self {
            retry_count,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// Send `request` up to `retry_count + 1` times.
///
/// Any non-2xx status counts as retryable. On the final attempt a non-2xx
/// response is returned as-is and a transport failure is returned as the
/// error.
pub fn fetch_with_retry(
    transport: &dyn Transport,
    request: &HttpRequest<'_>,
    policy: RetryPolicy,
) -> std::result::Result<HttpResponse, TransportError> {
    let mut attempt: u32 = 0;
    loop {
        if attempt > 0 {
            std::thread::sleep(policy.delay * attempt);
        }
        let is_last = attempt >= policy.retry_count;

        match transport.send(request) {
            Ok(resp) if resp.ok() || is_last => return Ok(resp),
            Ok(resp) => {
                tracing::debug!(
                    url = request.url,
                    attempt,
                    status = resp.status,
                    "request failed, retrying"
                );
            }
            Err(e) if is_last => return Err(e),
            Err(e) => {
                tracing::debug!(url = request.url, attempt, error = %e, "request errored, retrying");
            }
        }
        attempt += 1;
    }
}

/// Body of the commit registration request. Empty fields go out as `null`
/// and the slug is sentinel-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreSignedUrlBody {
    pub branch: Option<String>,
    pub build: Option<String>,
    #[serde(rename = "buildURL")]
    pub build_url: Option<String>,
    pub commit: Option<String>,
    pub job: Option<String>,
    pub pr: Option<String>,
    pub service: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "compareSha")]
    pub compare_sha: Option<String>,
    pub project: Option<String>,
    pub server_uri: Option<String>,
    pub git_service: Option<String>,
}

impl PreSignedUrlBody {
    pub fn new(params: ServiceParams, git_service: Option<GitService>) -> Self {
        let p = params.without_empty();
        Self {
            branch: p.branch,
            build: p.build,
            build_url: p.build_url,
            commit: p.commit,
            job: p.job,
            pr: p.pr,
            service: p.service,
            slug: p.slug.as_deref().map(encode_slug),
            compare_sha: p.compare_sha,
            project: p.project,
            server_uri: p.server_uri,
            git_service: git_service.map(|g| g.as_str().to_string()),
        }
    }
}

#[derive(Deserialize)]
struct PreSignedUrlResponse {
    url: String,
}

/// Register `commit` with the API and return the pre-signed upload URL.
///
/// `token` is sent as `Authorization: token <token>`; `None` makes a
/// tokenless request.
pub fn get_pre_signed_url(
    transport: &dyn Transport,
    api_url: &str,
    commit: &str,
    token: Option<&str>,
    body: &PreSignedUrlBody,
    policy: RetryPolicy,
) -> Result<String> {
    let url = format!(
        "{}/upload/service/commits/{}/bundle_analysis",
        api_url.trim_end_matches('/'),
        commit
    );
    let payload = serde_json::to_vec(body)?;

    let mut request = HttpRequest::new(Method::Post, &url)
        .header("Content-Type", "application/json")
        .body(&payload);
    if let Some(token) = token {
        request = request.header("Authorization", format!("token {token}"));
    }

    let resp = fetch_with_retry(transport, &request, policy)
        .map_err(|e| BundleError::failed_fetch_from("Failed to fetch pre-signed URL", e))?;

    if !resp.ok() {
        return Err(BundleError::failed_fetch(format!(
            "Failed to get pre-signed URL, bad response: \"{}\"",
            resp.status
        )));
    }

    let parsed: PreSignedUrlResponse = serde_json::from_str(&resp.body).map_err(|e| {
        BundleError::failed_fetch_from("Invalid response from pre-signed URL request", e)
    })?;
    Ok(parsed.url)
}

/// PUT the serialized report to `pre_signed_url`.
///
/// 429 means the account hit its upload limit and is reported as
/// [`BundleError::UploadLimitReached`] so callers do not retry it.
pub fn upload_stats(
    transport: &dyn Transport,
    message: &str,
    pre_signed_url: &str,
    policy: RetryPolicy,
) -> Result<()> {
    let request = HttpRequest::new(Method::Put, pre_signed_url)
        .header("Content-Type", "application/json")
        .header("Content-Length", message.len().to_string())
        .body(message.as_bytes());

    let resp = fetch_with_retry(transport, &request, policy)
        .map_err(|e| BundleError::failed_fetch_from("Failed to upload stats", e))?;

    if resp.status == 429 {
        return Err(BundleError::UploadLimitReached(format!(
            "Upload limit reached, status: {}",
            resp.status
        )));
    }
    if !resp.ok() {
        return Err(BundleError::FailedUpload(format!(
            "Failed to upload stats, bad response: \"{}\"",
            resp.status
        )));
    }
    Ok(())
}
