use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Woodpecker;

impl Provider for Woodpecker {
    fn detect(&self, envs: &Envs) -> bool {
        envs.equals("CI", "woodpecker")
    }

    fn service_name(&self) -> &'static str {
        "Woodpecker CI"
    }

    // Woodpecker 1.x renamed CI_BUILD_* to CI_PIPELINE_*; both are read.
    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(
                &args.branch,
                &["CI_COMMIT_SOURCE_BRANCH", "CI_COMMIT_BRANCH"],
            ),
            build: inputs.arg_or_env(&args.build, &["CI_PIPELINE_NUMBER", "CI_BUILD_NUMBER"]),
            build_url: inputs.envs.first(&["CI_PIPELINE_URL", "CI_BUILD_LINK"]),
            commit: inputs.arg_or_env(&args.sha, &["CI_COMMIT_SHA"]),
            job: inputs.env("CI_JOB_NUMBER"),
            pr: inputs.arg_or_env(&args.pr, &["CI_COMMIT_PULL_REQUEST"]),
            service: Some("woodpecker".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["CI_REPO"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CI",
            "CI_BUILD_LINK",
            "CI_BUILD_NUMBER",
            "CI_COMMIT_BRANCH",
            "CI_COMMIT_PULL_REQUEST",
            "CI_COMMIT_SHA",
            "CI_COMMIT_SOURCE_BRANCH",
            "CI_JOB_NUMBER",
            "CI_PIPELINE_NUMBER",
            "CI_PIPELINE_URL",
            "CI_REPO",
        ]
    }
}
