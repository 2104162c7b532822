use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::slug_from_remote;

pub struct Jenkins;

impl Provider for Jenkins {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("JENKINS_URL")
    }

    fn service_name(&self) -> &'static str {
        "Jenkins CI"
    }

    /// `ghprb*` variables come from the GitHub Pull Request Builder plugin,
    /// `CHANGE_*` from multibranch pipelines.
    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(
                &args.branch,
                &["ghprbSourceBranch", "CHANGE_BRANCH", "GIT_BRANCH", "BRANCH_NAME"],
            ),
            build: inputs.arg_or_env(&args.build, &["BUILD_NUMBER"]),
            build_url: inputs.env("BUILD_URL"),
            commit: inputs.arg_or_env(&args.sha, &["ghprbActualCommit", "GIT_COMMIT"]),
            job: None,
            pr: inputs.arg_or_env(&args.pr, &["ghprbPullId", "CHANGE_ID"]),
            service: Some("jenkins".to_string()),
            slug: pick(&args.slug, None)
                .or_else(|| slug_from_remote(inputs.git, inputs.env("GIT_URL").as_deref())),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BRANCH_NAME",
            "BUILD_NUMBER",
            "BUILD_URL",
            "CHANGE_BRANCH",
            "CHANGE_ID",
            "GIT_BRANCH",
            "GIT_COMMIT",
            "GIT_URL",
            "JENKINS_URL",
            "ghprbActualCommit",
            "ghprbPullId",
            "ghprbSourceBranch",
        ]
    }
}
