use super::{join_slug, pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Vercel;

impl Provider for Vercel {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("VERCEL")
    }

    fn service_name(&self) -> &'static str {
        "Vercel"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        let slug = join_slug(
            inputs.env("VERCEL_GIT_REPO_OWNER"),
            inputs.env("VERCEL_GIT_REPO_SLUG"),
        );
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["VERCEL_GIT_COMMIT_REF"]),
            build: inputs.arg_or_env(&args.build, &["VERCEL_DEPLOYMENT_ID"]),
            build_url: inputs.env("VERCEL_URL").map(|host| format!("https://{host}")),
            commit: inputs.arg_or_env(&args.sha, &["VERCEL_GIT_COMMIT_SHA"]),
            job: None,
            pr: inputs.arg_or_env(&args.pr, &["VERCEL_GIT_PULL_REQUEST_ID"]),
            service: Some("vercel".to_string()),
            slug: pick(&args.slug, slug),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "VERCEL",
            "VERCEL_DEPLOYMENT_ID",
            "VERCEL_GIT_COMMIT_REF",
            "VERCEL_GIT_COMMIT_SHA",
            "VERCEL_GIT_PULL_REQUEST_ID",
            "VERCEL_GIT_REPO_OWNER",
            "VERCEL_GIT_REPO_SLUG",
            "VERCEL_URL",
        ]
    }
}
