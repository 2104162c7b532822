use super::{pick, Provider, ProviderInputs};
use crate::console;
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::parse_slug;

pub struct GitLabCi;

impl GitLabCi {
    fn slug(inputs: &ProviderInputs<'_>) -> Option<String> {
        if let Some(path) = inputs.env("CI_PROJECT_PATH") {
            return Some(path);
        }
        // Older runners only expose the clone URL.
        ["CI_BUILD_REPO", "CI_REPOSITORY_URL"]
            .iter()
            .filter_map(|k| inputs.env(k))
            .find_map(|url| parse_slug(&url).ok().filter(|s| !s.is_empty()))
    }
}

impl Provider for GitLabCi {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("GITLAB_CI")
    }

    fn service_name(&self) -> &'static str {
        "GitLab CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        let params = ServiceParams {
            branch: inputs.arg_or_env(
                &args.branch,
                &[
                    "CI_MERGE_REQUEST_SOURCE_BRANCH_NAME",
                    "CI_BUILD_REF_NAME",
                    "CI_COMMIT_REF_NAME",
                ],
            ),
            build: inputs.arg_or_env(&args.build, &["CI_BUILD_ID", "CI_JOB_ID"]),
            build_url: inputs.env("CI_JOB_URL"),
            commit: inputs.arg_or_env(
                &args.sha,
                &[
                    "CI_MERGE_REQUEST_SOURCE_BRANCH_SHA",
                    "CI_BUILD_REF",
                    "CI_COMMIT_SHA",
                ],
            ),
            job: None,
            pr: inputs.arg_or_env(&args.pr, &["CI_MERGE_REQUEST_IID"]),
            service: Some("gitlab".to_string()),
            slug: pick(&args.slug, Self::slug(inputs)),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        };
        console::debug(&format!("GitLab CI params: {params:?}"), inputs.debug);
        Ok(params)
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CI_BUILD_ID",
            "CI_BUILD_REF",
            "CI_BUILD_REF_NAME",
            "CI_BUILD_REPO",
            "CI_COMMIT_REF_NAME",
            "CI_COMMIT_SHA",
            "CI_JOB_ID",
            "CI_JOB_URL",
            "CI_MERGE_REQUEST_IID",
            "CI_MERGE_REQUEST_SOURCE_BRANCH_NAME",
            "CI_MERGE_REQUEST_SOURCE_BRANCH_SHA",
            "CI_PROJECT_PATH",
            "CI_REPOSITORY_URL",
            "GITLAB_CI",
        ]
    }
}
