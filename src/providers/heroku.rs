use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::slug_from_remote;

pub struct Heroku;

impl Provider for Heroku {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CI") && envs.is_set("HEROKU_TEST_RUN_BRANCH")
    }

    fn service_name(&self) -> &'static str {
        "Heroku CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["HEROKU_TEST_RUN_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["HEROKU_TEST_RUN_ID"]),
            build_url: None,
            commit: inputs.arg_or_env(&args.sha, &["HEROKU_TEST_RUN_COMMIT_VERSION"]),
            job: None,
            pr: pick(&args.pr, None),
            service: Some("heroku".to_string()),
            slug: pick(&args.slug, None).or_else(|| slug_from_remote(inputs.git, None)),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CI",
            "HEROKU_TEST_RUN_BRANCH",
            "HEROKU_TEST_RUN_COMMIT_VERSION",
            "HEROKU_TEST_RUN_ID",
        ]
    }
}
