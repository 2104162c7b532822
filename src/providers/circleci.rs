use super::{join_slug, pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::parse_slug;

pub struct CircleCi;

impl CircleCi {
    fn slug(inputs: &ProviderInputs<'_>) -> Option<String> {
        join_slug(
            inputs.env("CIRCLE_PROJECT_USERNAME"),
            inputs.env("CIRCLE_PROJECT_REPONAME"),
        )
        .or_else(|| {
            inputs
                .env("CIRCLE_REPOSITORY_URL")
                .and_then(|url| parse_slug(&url).ok())
                .filter(|s| !s.is_empty())
        })
    }
}

impl Provider for CircleCi {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CI") && envs.is_set("CIRCLECI")
    }

    fn service_name(&self) -> &'static str {
        "CircleCI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["CIRCLE_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["CIRCLE_BUILD_NUM"]),
            build_url: inputs.env("CIRCLE_BUILD_URL"),
            commit: inputs.arg_or_env(&args.sha, &["CIRCLE_SHA1"]),
            job: inputs.env("CIRCLE_NODE_INDEX"),
            pr: inputs.arg_or_env(&args.pr, &["CIRCLE_PR_NUMBER"]),
            service: Some("circleci".to_string()),
            slug: pick(&args.slug, Self::slug(inputs)),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CI",
            "CIRCLECI",
            "CIRCLE_BRANCH",
            "CIRCLE_BUILD_NUM",
            "CIRCLE_BUILD_URL",
            "CIRCLE_NODE_INDEX",
            "CIRCLE_PR_NUMBER",
            "CIRCLE_PROJECT_REPONAME",
            "CIRCLE_PROJECT_USERNAME",
            "CIRCLE_REPOSITORY_URL",
            "CIRCLE_SHA1",
        ]
    }
}
