//! GitHub Actions.
//!
//! On `pull_request` events GitHub checks out a synthetic merge commit, so
//! the SHA in `GITHUB_SHA` is not the commit the user pushed. When HEAD has
//! exactly two parents the second is the PR head (reported as the commit)
//! and the first is the base (reported as `compareSha`).

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use super::{pick, Provider, ProviderInputs};
use crate::console;
use crate::envs::Envs;
use crate::error::Result;
use crate::git;
use crate::http::{HttpRequest, Method};
use crate::model::ServiceParams;

static PR_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"refs/pull/([0-9]+)/merge").unwrap());

static BRANCH_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"refs/heads/(.*)").unwrap());

const DEFAULT_SERVER_URL: &str = "https://github.com";
const DEFAULT_API_URL: &str = "https://api.github.com";

pub struct GitHubActions;

#[derive(Deserialize)]
struct JobsResponse {
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct Job {
    name: String,
    html_url: String,
}

impl GitHubActions {
    fn branch(inputs: &ProviderInputs<'_>) -> Option<String> {
        if let Some(head_ref) = inputs.env("GITHUB_HEAD_REF") {
            return Some(head_ref);
        }
        let github_ref = inputs.env("GITHUB_REF")?;
        BRANCH_REF_RE
            .captures(&github_ref)
            .map(|c| c[1].to_string())
    }

    fn pr(inputs: &ProviderInputs<'_>) -> Option<String> {
        inputs.env("GITHUB_HEAD_REF")?;
        let github_ref = inputs.env("GITHUB_REF")?;
        PR_REF_RE.captures(&github_ref).map(|c| c[1].to_string())
    }

    /// `(commit, compare_sha)`.
    fn commit(inputs: &ProviderInputs<'_>, pr: Option<&str>) -> (Option<String>, Option<String>) {
        let commit = inputs.env("GITHUB_SHA");
        if pr.is_none() {
            return (commit, None);
        }
        match git::merge_commit_parents(inputs.git) {
            Some((base, head)) => {
                console::debug(
                    &format!("Using merge commit parent {head} (base {base})"),
                    inputs.debug,
                );
                (Some(head), Some(base))
            }
            None => {
                console::debug(
                    "Could not detect merge commit parents, using GITHUB_SHA",
                    inputs.debug,
                );
                (commit, None)
            }
        }
    }

    /// Link to the job's log page via the Actions API, falling back to the
    /// run page when the lookup fails for any reason.
    fn build_url(inputs: &ProviderInputs<'_>, slug: Option<&str>) -> Option<String> {
        let slug = slug?;
        let run_id = inputs.env("GITHUB_RUN_ID")?;
        let server = inputs
            .env("GITHUB_SERVER_URL")
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let fallback = format!("{server}/{slug}/actions/runs/{run_id}");

        let Some(job_name) = inputs.env("GITHUB_JOB") else {
            return Some(fallback);
        };
        let api = inputs
            .env("GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let url = format!("{api}/repos/{slug}/actions/runs/{run_id}/jobs");
        let request = HttpRequest::new(Method::Get, &url)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");

        let job_url = match inputs.http.send(&request) {
            Ok(resp) if resp.ok() => serde_json::from_str::<JobsResponse>(&resp.body)
                .ok()
                .and_then(|r| r.jobs.into_iter().find(|j| j.name == job_name))
                .map(|j| j.html_url),
            Ok(resp) => {
                console::debug(
                    &format!("Failed to fetch job URL, status: {}", resp.status),
                    inputs.debug,
                );
                None
            }
            Err(e) => {
                console::debug(&format!("Failed to fetch job URL: {e}"), inputs.debug);
                None
            }
        };
        Some(job_url.unwrap_or(fallback))
    }
}

impl Provider for GitHubActions {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("GITHUB_ACTIONS")
    }

    fn service_name(&self) -> &'static str {
        "GitHub Actions"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        let slug = inputs.arg_or_env(&args.slug, &["GITHUB_REPOSITORY"]);
        let pr = pick(&args.pr, Self::pr(inputs));

        // An explicit SHA skips merge-commit detection (and its git call).
        let (commit, compare_sha) = match &args.sha {
            Some(sha) if !sha.is_empty() => (Some(sha.clone()), None),
            _ => Self::commit(inputs, pr.as_deref()),
        };

        Ok(ServiceParams {
            branch: pick(&args.branch, Self::branch(inputs)),
            build: inputs.arg_or_env(&args.build, &["GITHUB_RUN_ID"]),
            build_url: Self::build_url(inputs, slug.as_deref()),
            commit,
            job: inputs.env("GITHUB_WORKFLOW"),
            pr,
            service: Some("github-actions".to_string()),
            slug,
            compare_sha: pick(&args.compare_sha, compare_sha),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "GITHUB_ACTIONS",
            "GITHUB_API_URL",
            "GITHUB_HEAD_REF",
            "GITHUB_JOB",
            "GITHUB_REF",
            "GITHUB_REPOSITORY",
            "GITHUB_RUN_ID",
            "GITHUB_SERVER_URL",
            "GITHUB_SHA",
            "GITHUB_WORKFLOW",
        ]
    }
}
