//! CI provider detection.
//!
//! Each provider inspects the environment to decide whether the build runs
//! on it, then resolves branch/commit/PR/slug metadata. Every field follows
//! the same precedence: user override, then environment, then nothing.
//!
//! [`PROVIDERS`] is ordered: specific providers come before ones keyed on
//! generic variables, and [`local::Local`] (plain git) is always last.

pub mod appveyor;
pub mod azure_pipelines;
pub mod bitbucket;
pub mod bitrise;
pub mod buildkite;
pub mod circleci;
pub mod cirrus;
pub mod cloudflare_pages;
pub mod codebuild;
pub mod drone;
pub mod github_actions;
pub mod gitlab_ci;
pub mod heroku;
pub mod jenkins;
pub mod local;
pub mod netlify;
pub mod render;
pub mod teamcity;
pub mod travis;
pub mod vercel;
pub mod wercker;
pub mod woodpecker;

use crate::console;
use crate::envs::Envs;
use crate::error::{BundleError, Result};
use crate::git::GitRunner;
use crate::http::Transport;
use crate::model::ServiceParams;
use crate::options::UploadOverrides;

/// Everything a provider may consult while resolving service params.
pub struct ProviderInputs<'a> {
    pub envs: &'a Envs,
    pub args: &'a UploadOverrides,
    pub git: &'a dyn GitRunner,
    pub http: &'a dyn Transport,
    pub debug: bool,
}

impl ProviderInputs<'_> {
    pub fn env(&self, key: &str) -> Option<String> {
        self.envs.string(key)
    }

    /// `arg` if the user supplied a non-empty override, otherwise the first
    /// set variable among `keys`.
    pub fn arg_or_env(&self, arg: &Option<String>, keys: &[&str]) -> Option<String> {
        pick(arg, self.envs.first(keys))
    }
}

/// Override wins over the resolved fallback.
pub fn pick(arg: &Option<String>, fallback: Option<String>) -> Option<String> {
    arg.clone().filter(|a| !a.is_empty()).or(fallback)
}

/// `owner/repo` when both halves are known.
pub(crate) fn join_slug(owner: Option<String>, repo: Option<String>) -> Option<String> {
    Some(format!("{}/{}", owner?, repo?))
}

pub(crate) fn strip_refs_heads(git_ref: &str) -> String {
    git_ref
        .strip_prefix("refs/heads/")
        .unwrap_or(git_ref)
        .to_string()
}

pub trait Provider {
    /// Pure check over the environment; never runs processes or I/O.
    fn detect(&self, envs: &Envs) -> bool;

    /// Label used in log output.
    fn service_name(&self) -> &'static str;

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams>;

    /// Variables this provider reads.
    fn env_var_names(&self) -> &'static [&'static str];
}

pub const PROVIDERS: &[&dyn Provider] = &[
    &appveyor::AppVeyor,
    &azure_pipelines::AzurePipelines,
    &bitbucket::Bitbucket,
    &bitrise::Bitrise,
    &buildkite::Buildkite,
    &circleci::CircleCi,
    &cirrus::Cirrus,
    &cloudflare_pages::CloudflarePages,
    &codebuild::CodeBuild,
    &drone::Drone,
    &github_actions::GitHubActions,
    &gitlab_ci::GitLabCi,
    &heroku::Heroku,
    &jenkins::Jenkins,
    &netlify::Netlify,
    &render::Render,
    &teamcity::TeamCity,
    &travis::Travis,
    &vercel::Vercel,
    &woodpecker::Woodpecker,
    &wercker::Wercker,
    &local::Local,
];

/// The first provider in priority order whose detection matches.
pub fn find_provider(envs: &Envs) -> Option<&'static dyn Provider> {
    PROVIDERS.iter().copied().find(|p| p.detect(envs))
}

/// Resolve service params from the first matching provider.
pub fn detect_provider(inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
    let provider = find_provider(inputs.envs).ok_or(BundleError::ProviderNotDetected)?;
    console::debug(
        &format!("Detected CI provider: {}", provider.service_name()),
        inputs.debug,
    );
    tracing::debug!(provider = provider.service_name(), "provider detected");
    provider.service_params(inputs)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use crate::error::{BundleError, Result};
    use crate::git::GitRunner;
    use crate::http::{HttpRequest, HttpResponse, Transport, TransportError};

    /// Answers git invocations from a table keyed by the joined arguments;
    /// anything else fails as if git were missing.
    #[derive(Default)]
    pub struct FakeGit {
        pub outputs: HashMap<String, String>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeGit {
        pub fn with(pairs: &[(&str, &str)]) -> Self {
            Self {
                outputs: pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl GitRunner for FakeGit {
        fn run(&self, args: &[&str]) -> Result<String> {
            let key = args.join(" ");
            self.calls.borrow_mut().push(key.clone());
            self.outputs
                .get(&key)
                .cloned()
                .ok_or_else(|| BundleError::Git(format!("git {key} unavailable")))
        }
    }

    /// Every request fails at the transport level.
    pub struct Offline;

    impl Transport for Offline {
        fn send(
            &self,
            _request: &HttpRequest<'_>,
        ) -> std::result::Result<HttpResponse, TransportError> {
            Err(TransportError("offline".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envs(pairs: &[(&str, &str)]) -> Envs {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_local_is_last() {
        let last = PROVIDERS.last().unwrap();
        assert_eq!(last.service_name(), "Local");
    }

    #[test]
    fn test_specific_provider_beats_generic_ci() {
        let e = envs(&[("CI", "true"), ("APPVEYOR", "true")]);
        assert_eq!(find_provider(&e).unwrap().service_name(), "AppVeyor CI");
    }

    #[test]
    fn test_unknown_ci_not_detected() {
        let e = envs(&[("CI", "true")]);
        assert!(find_provider(&e).is_none());
    }

    #[test]
    fn test_no_ci_falls_back_to_local() {
        assert_eq!(
            find_provider(&Envs::default()).unwrap().service_name(),
            "Local"
        );
    }

    #[test]
    fn test_pick_precedence() {
        assert_eq!(
            pick(&Some("arg".to_string()), Some("env".to_string())),
            Some("arg".to_string())
        );
        assert_eq!(
            pick(&Some(String::new()), Some("env".to_string())),
            Some("env".to_string())
        );
        assert_eq!(pick(&None, None), None);
    }

    #[test]
    fn test_every_provider_lists_env_vars() {
        for p in PROVIDERS {
            assert!(!p.env_var_names().is_empty(), "{}", p.service_name());
        }
    }
}
