use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::slug_from_remote;

pub struct TeamCity;

impl Provider for TeamCity {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("TEAMCITY_VERSION")
    }

    fn service_name(&self) -> &'static str {
        "TeamCity"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["BRANCH_NAME"]),
            build: inputs.arg_or_env(&args.build, &["BUILD_NUMBER"]),
            build_url: None,
            commit: inputs.arg_or_env(&args.sha, &["BUILD_VCS_NUMBER"]),
            job: None,
            pr: pick(&args.pr, None),
            service: Some("teamcity".to_string()),
            slug: pick(&args.slug, None).or_else(|| slug_from_remote(inputs.git, None)),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BRANCH_NAME",
            "BUILD_NUMBER",
            "BUILD_VCS_NUMBER",
            "TEAMCITY_VERSION",
        ]
    }
}
