//! Fallback for builds outside CI: everything comes from the working copy.

use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::{BundleError, Result};
use crate::model::ServiceParams;
use crate::slug::slug_from_remote;

pub struct Local;

impl Local {
    fn branch(inputs: &ProviderInputs<'_>) -> Option<String> {
        inputs
            .arg_or_env(&inputs.args.branch, &["GIT_BRANCH", "BRANCH_NAME"])
            .or_else(|| {
                inputs
                    .git
                    .run(&["rev-parse", "--abbrev-ref", "HEAD"])
                    .ok()
                    .filter(|b| !b.is_empty())
            })
    }

    fn commit(inputs: &ProviderInputs<'_>) -> Result<String> {
        if let Some(sha) = inputs.arg_or_env(&inputs.args.sha, &["GIT_COMMIT"]) {
            return Ok(sha);
        }
        inputs
            .git
            .run(&["rev-parse", "HEAD"])
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| BundleError::Git("Unable to detect commit SHA".to_string()))
    }
}

impl Provider for Local {
    fn detect(&self, envs: &Envs) -> bool {
        !envs.is_set("CI")
    }

    fn service_name(&self) -> &'static str {
        "Local"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: Self::branch(inputs),
            build: pick(&args.build, None),
            build_url: None,
            commit: Some(Self::commit(inputs)?),
            job: None,
            pr: pick(&args.pr, None),
            service: None,
            slug: pick(&args.slug, None).or_else(|| slug_from_remote(inputs.git, None)),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &["BRANCH_NAME", "CI", "GIT_BRANCH", "GIT_COMMIT"]
    }
}
