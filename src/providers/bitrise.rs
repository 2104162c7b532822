use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::slug_from_remote;

pub struct Bitrise;

impl Provider for Bitrise {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CI") && envs.is_set("BITRISE_IO")
    }

    fn service_name(&self) -> &'static str {
        "Bitrise CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["BITRISE_GIT_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["BITRISE_BUILD_NUMBER"]),
            build_url: inputs.env("BITRISE_BUILD_URL"),
            commit: inputs.arg_or_env(&args.sha, &["GIT_CLONE_COMMIT_HASH"]),
            job: None,
            pr: inputs.arg_or_env(&args.pr, &["BITRISE_PULL_REQUEST"]),
            service: Some("bitrise".to_string()),
            slug: pick(&args.slug, None).or_else(|| slug_from_remote(inputs.git, None)),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BITRISE_BUILD_NUMBER",
            "BITRISE_BUILD_URL",
            "BITRISE_GIT_BRANCH",
            "BITRISE_IO",
            "BITRISE_PULL_REQUEST",
            "CI",
            "GIT_CLONE_COMMIT_HASH",
        ]
    }
}
