use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Render;

impl Provider for Render {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("RENDER")
    }

    fn service_name(&self) -> &'static str {
        "Render"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["RENDER_GIT_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["RENDER_INSTANCE_ID"]),
            build_url: None,
            commit: inputs.arg_or_env(&args.sha, &["RENDER_GIT_COMMIT"]),
            job: None,
            pr: pick(&args.pr, None),
            service: Some("render".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["RENDER_GIT_REPO_SLUG"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "RENDER",
            "RENDER_GIT_BRANCH",
            "RENDER_GIT_COMMIT",
            "RENDER_GIT_REPO_SLUG",
            "RENDER_INSTANCE_ID",
        ]
    }
}
