use super::{pick, strip_refs_heads, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::parse_slug;

pub struct CodeBuild;

impl Provider for CodeBuild {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CODEBUILD_CI")
    }

    fn service_name(&self) -> &'static str {
        "AWS CodeBuild"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;

        let branch = inputs
            .env("CODEBUILD_WEBHOOK_HEAD_REF")
            .map(|r| strip_refs_heads(&r));
        // Webhook-triggered PR builds report their source version as `pr/<n>`.
        let pr = inputs
            .env("CODEBUILD_SOURCE_VERSION")
            .and_then(|v| v.strip_prefix("pr/").map(str::to_string));
        let slug = inputs
            .env("CODEBUILD_SOURCE_REPO_URL")
            .and_then(|url| parse_slug(&url).ok())
            .filter(|s| !s.is_empty());

        Ok(ServiceParams {
            branch: pick(&args.branch, branch),
            build: inputs.arg_or_env(&args.build, &["CODEBUILD_BUILD_ID"]),
            build_url: inputs.env("CODEBUILD_BUILD_URL"),
            commit: inputs.arg_or_env(&args.sha, &["CODEBUILD_RESOLVED_SOURCE_VERSION"]),
            job: inputs.env("CODEBUILD_BUILD_ID"),
            pr: pick(&args.pr, pr),
            service: Some("codebuild".to_string()),
            slug: pick(&args.slug, slug),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CODEBUILD_BUILD_ID",
            "CODEBUILD_BUILD_URL",
            "CODEBUILD_CI",
            "CODEBUILD_RESOLVED_SOURCE_VERSION",
            "CODEBUILD_SOURCE_REPO_URL",
            "CODEBUILD_SOURCE_VERSION",
            "CODEBUILD_WEBHOOK_HEAD_REF",
        ]
    }
}
