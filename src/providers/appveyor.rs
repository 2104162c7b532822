use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct AppVeyor;

impl Provider for AppVeyor {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CI")
            && (envs.equals("APPVEYOR", "True") || envs.equals("APPVEYOR", "true"))
    }

    fn service_name(&self) -> &'static str {
        "AppVeyor CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;

        let build_url = match (
            inputs.env("APPVEYOR_URL"),
            inputs.env("APPVEYOR_REPO_NAME"),
            inputs.env("APPVEYOR_BUILD_ID"),
            inputs.env("APPVEYOR_JOB_ID"),
        ) {
            (Some(url), Some(repo), Some(build), Some(job)) => Some(format!(
                "{}/project/{repo}/builds/{build}/job/{job}",
                url.trim_end_matches('/')
            )),
            _ => None,
        };

        let job = match (
            inputs.env("APPVEYOR_ACCOUNT_NAME"),
            inputs.env("APPVEYOR_PROJECT_SLUG"),
            inputs.env("APPVEYOR_BUILD_VERSION"),
        ) {
            (Some(account), Some(project), Some(version)) => {
                Some(format!("{account}/{project}/{version}"))
            }
            _ => None,
        };

        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["APPVEYOR_REPO_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["APPVEYOR_JOB_ID"]),
            build_url,
            commit: inputs.arg_or_env(
                &args.sha,
                &["APPVEYOR_PULL_REQUEST_HEAD_COMMIT", "APPVEYOR_REPO_COMMIT"],
            ),
            job,
            pr: inputs.arg_or_env(&args.pr, &["APPVEYOR_PULL_REQUEST_NUMBER"]),
            service: Some("appveyor".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["APPVEYOR_REPO_NAME"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "APPVEYOR",
            "APPVEYOR_ACCOUNT_NAME",
            "APPVEYOR_BUILD_ID",
            "APPVEYOR_BUILD_VERSION",
            "APPVEYOR_JOB_ID",
            "APPVEYOR_PROJECT_SLUG",
            "APPVEYOR_PULL_REQUEST_HEAD_COMMIT",
            "APPVEYOR_PULL_REQUEST_NUMBER",
            "APPVEYOR_REPO_BRANCH",
            "APPVEYOR_REPO_COMMIT",
            "APPVEYOR_REPO_NAME",
            "APPVEYOR_URL",
            "CI",
        ]
    }
}
