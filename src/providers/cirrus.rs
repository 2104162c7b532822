use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Cirrus;

impl Provider for Cirrus {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CIRRUS_CI")
    }

    fn service_name(&self) -> &'static str {
        "Cirrus CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["CIRRUS_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["CIRRUS_BUILD_ID"]),
            build_url: inputs
                .env("CIRRUS_BUILD_ID")
                .map(|id| format!("https://cirrus-ci.com/build/{id}")),
            commit: inputs.arg_or_env(&args.sha, &["CIRRUS_CHANGE_IN_REPO"]),
            job: inputs.env("CIRRUS_TASK_ID"),
            pr: inputs.arg_or_env(&args.pr, &["CIRRUS_PR"]),
            service: Some("cirrus-ci".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["CIRRUS_REPO_FULL_NAME"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CIRRUS_BRANCH",
            "CIRRUS_BUILD_ID",
            "CIRRUS_CHANGE_IN_REPO",
            "CIRRUS_CI",
            "CIRRUS_PR",
            "CIRRUS_REPO_FULL_NAME",
            "CIRRUS_TASK_ID",
        ]
    }
}
