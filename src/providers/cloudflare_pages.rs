use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct CloudflarePages;

impl Provider for CloudflarePages {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CF_PAGES")
    }

    fn service_name(&self) -> &'static str {
        "Cloudflare Pages"
    }

    /// Pages exposes no repository name or build number, so slug and build
    /// come from overrides only.
    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["CF_PAGES_BRANCH"]),
            build: pick(&args.build, None),
            build_url: inputs.env("CF_PAGES_URL"),
            commit: inputs.arg_or_env(&args.sha, &["CF_PAGES_COMMIT_SHA"]),
            job: None,
            pr: pick(&args.pr, None),
            service: Some("cloudflare-pages".to_string()),
            slug: pick(&args.slug, None),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &["CF_PAGES", "CF_PAGES_BRANCH", "CF_PAGES_COMMIT_SHA", "CF_PAGES_URL"]
    }
}
