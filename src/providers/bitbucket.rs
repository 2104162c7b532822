use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::git::is_hex_sha;
use crate::model::ServiceParams;

pub struct Bitbucket;

impl Bitbucket {
    /// Bitbucket exposes a 12-character SHA; expand it through git so the
    /// API receives a full commit id.
    fn commit(inputs: &ProviderInputs<'_>) -> Result<Option<String>> {
        if let Some(sha) = pick(&inputs.args.sha, None) {
            return Ok(Some(sha));
        }
        match inputs.env("BITBUCKET_COMMIT") {
            Some(sha) if is_hex_sha(&sha, 12) => Ok(Some(inputs.git.run(&["rev-parse", &sha])?)),
            other => Ok(other),
        }
    }
}

impl Provider for Bitbucket {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CI") && envs.is_set("BITBUCKET_BUILD_NUMBER")
    }

    fn service_name(&self) -> &'static str {
        "Bitbucket"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["BITBUCKET_BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["BITBUCKET_BUILD_NUMBER"]),
            build_url: None,
            commit: Self::commit(inputs)?,
            job: inputs.env("BITBUCKET_BUILD_NUMBER"),
            pr: inputs.arg_or_env(&args.pr, &["BITBUCKET_PR_ID"]),
            service: Some("bitbucket".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["BITBUCKET_REPO_FULL_NAME"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BITBUCKET_BRANCH",
            "BITBUCKET_BUILD_NUMBER",
            "BITBUCKET_COMMIT",
            "BITBUCKET_PR_ID",
            "BITBUCKET_REPO_FULL_NAME",
            "CI",
        ]
    }
}
