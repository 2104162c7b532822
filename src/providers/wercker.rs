use super::{join_slug, pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Wercker;

impl Provider for Wercker {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("WERCKER_MAIN_PIPELINE_STARTED")
    }

    fn service_name(&self) -> &'static str {
        "Wercker CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        let slug = join_slug(
            inputs.env("WERCKER_GIT_OWNER"),
            inputs.env("WERCKER_GIT_REPOSITORY"),
        );
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["WERCKER_GIT_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["WERCKER_MAIN_PIPELINE_STARTED"]),
            build_url: inputs.env("WERCKER_BUILD_URL"),
            commit: inputs.arg_or_env(&args.sha, &["WERCKER_GIT_COMMIT"]),
            job: None,
            pr: pick(&args.pr, None),
            service: Some("wercker".to_string()),
            slug: pick(&args.slug, slug),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "WERCKER_BUILD_URL",
            "WERCKER_GIT_BRANCH",
            "WERCKER_GIT_COMMIT",
            "WERCKER_GIT_OWNER",
            "WERCKER_GIT_REPOSITORY",
            "WERCKER_MAIN_PIPELINE_STARTED",
        ]
    }
}
