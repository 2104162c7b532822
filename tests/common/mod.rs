#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use bundler_plugin_core::envs::Envs;
use bundler_plugin_core::error::{BundleError, Result};
use bundler_plugin_core::git::GitRunner;
use bundler_plugin_core::http::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use bundler_plugin_core::options::{normalize_options, NormalizedOptions, RawOptions};

pub const HEAD_SHA: &str = "0123456789abcdef0123456789abcdef01234567";

/// A request as seen by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: Option<String>,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(self.body.as_deref().unwrap()).unwrap()
    }
}

/// Replies from a script, in order, and records every request. Once the
/// script runs out each request fails at the transport level.
#[derive(Default)]
pub struct FakeTransport {
    replies: RefCell<VecDeque<std::result::Result<HttpResponse, TransportError>>>,
    pub requests: RefCell<Vec<Recorded>>,
}

impl FakeTransport {
    pub fn new(replies: Vec<std::result::Result<HttpResponse, TransportError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn send(
        &self,
        request: &HttpRequest<'_>,
    ) -> std::result::Result<HttpResponse, TransportError> {
        self.requests.borrow_mut().push(Recorded {
            method: request.method,
            url: request.url.to_string(),
            headers: request.headers.clone(),
            body: request
                .body
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        });
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no scripted reply".to_string())))
    }
}

pub fn reply(status: u16, body: &str) -> std::result::Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

/// Answers git invocations from a table keyed by the joined arguments.
#[derive(Default)]
pub struct FakeGit {
    outputs: HashMap<String, String>,
}

impl FakeGit {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            outputs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// A working copy on `main` at [`HEAD_SHA`] cloned from the
    /// bundler plugins repository.
    pub fn checkout() -> Self {
        Self::with(&[
            ("rev-parse --abbrev-ref HEAD", "main"),
            ("rev-parse HEAD", HEAD_SHA),
            (
                "config --get remote.origin.url",
                "git@github.com:codecov/codecov-javascript-bundler-plugins.git",
            ),
        ])
    }
}

impl GitRunner for FakeGit {
    fn run(&self, args: &[&str]) -> Result<String> {
        let key = args.join(" ");
        self.outputs
            .get(&key)
            .cloned()
            .ok_or_else(|| BundleError::Git(format!("git {key} unavailable")))
    }
}

pub fn envs(pairs: &[(&str, &str)]) -> Envs {
    pairs.iter().copied().collect()
}

pub fn options(bundle_name: &str) -> NormalizedOptions {
    normalize_options(RawOptions {
        bundle_name: Some(bundle_name.to_string()),
        upload_token: Some("repo-token".to_string()),
        retry_count: Some(0),
        ..Default::default()
    })
    .unwrap()
}
