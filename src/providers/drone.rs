use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Drone;

impl Provider for Drone {
    fn detect(&self, envs: &Envs) -> bool {
        envs.equals("DRONE", "true")
    }

    fn service_name(&self) -> &'static str {
        "Drone"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["DRONE_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["DRONE_BUILD_NUMBER"]),
            build_url: inputs.env("DRONE_BUILD_LINK"),
            commit: inputs.arg_or_env(&args.sha, &["DRONE_COMMIT_SHA"]),
            job: None,
            pr: inputs.arg_or_env(&args.pr, &["DRONE_PULL_REQUEST"]),
            service: Some("drone.io".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["DRONE_REPO"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "DRONE",
            "DRONE_BRANCH",
            "DRONE_BUILD_LINK",
            "DRONE_BUILD_NUMBER",
            "DRONE_COMMIT_SHA",
            "DRONE_PULL_REQUEST",
            "DRONE_REPO",
        ]
    }
}
