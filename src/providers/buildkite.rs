use super::{join_slug, pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Buildkite;

impl Provider for Buildkite {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("BUILDKITE")
    }

    fn service_name(&self) -> &'static str {
        "Buildkite"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        // Buildkite reports "false" for builds that aren't pull requests.
        let pr = inputs.env("BUILDKITE_PULL_REQUEST").filter(|pr| pr != "false");
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["BUILDKITE_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["BUILDKITE_BUILD_NUMBER"]),
            build_url: inputs.env("BUILDKITE_BUILD_URL"),
            commit: inputs.arg_or_env(&args.sha, &["BUILDKITE_COMMIT"]),
            job: inputs.env("BUILDKITE_JOB_ID"),
            pr: pick(&args.pr, pr),
            service: Some("buildkite".to_string()),
            slug: pick(
                &args.slug,
                join_slug(
                    inputs.env("BUILDKITE_ORGANIZATION_SLUG"),
                    inputs.env("BUILDKITE_PIPELINE_SLUG"),
                ),
            ),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BUILDKITE",
            "BUILDKITE_BRANCH",
            "BUILDKITE_BUILD_NUMBER",
            "BUILDKITE_BUILD_URL",
            "BUILDKITE_COMMIT",
            "BUILDKITE_JOB_ID",
            "BUILDKITE_ORGANIZATION_SLUG",
            "BUILDKITE_PIPELINE_SLUG",
            "BUILDKITE_PULL_REQUEST",
        ]
    }
}
