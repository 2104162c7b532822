use super::{pick, Provider, ProviderInputs};
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;
use crate::slug::parse_slug;

pub struct Netlify;

impl Provider for Netlify {
    fn detect(&self, envs: &Envs) -> bool {
        envs.equals("NETLIFY", "true")
    }

    fn service_name(&self) -> &'static str {
        "Netlify"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;

        let pr = if inputs.envs.equals("PULL_REQUEST", "true") {
            inputs.env("REVIEW_ID")
        } else {
            None
        };
        let slug = inputs
            .env("REPOSITORY_URL")
            .and_then(|url| parse_slug(&url).ok())
            .filter(|s| !s.is_empty());

        Ok(ServiceParams {
            branch: inputs.arg_or_env(&args.branch, &["BRANCH"]),
            build: inputs.arg_or_env(&args.build, &["BUILD_ID"]),
            build_url: inputs.env("DEPLOY_URL"),
            commit: inputs.arg_or_env(&args.sha, &["COMMIT_REF"]),
            job: None,
            pr: pick(&args.pr, pr),
            service: Some("netlify".to_string()),
            slug: pick(&args.slug, slug),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BRANCH",
            "BUILD_ID",
            "COMMIT_REF",
            "DEPLOY_URL",
            "NETLIFY",
            "PULL_REQUEST",
            "REPOSITORY_URL",
            "REVIEW_ID",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UploadOverrides;
    use crate::providers::testing::{FakeGit, Offline};

    #[test]
    fn test_pr_only_on_pull_request_builds() {
        let base = [
            ("NETLIFY", "true"),
            ("REVIEW_ID", "7"),
            ("REPOSITORY_URL", "https://github.com/owner/site"),
        ];
        let args = UploadOverrides::default();
        let git = FakeGit::default();

        let push: Envs = base.into_iter().collect();
        let inputs = ProviderInputs {
            envs: &push,
            args: &args,
            git: &git,
            http: &Offline,
            debug: false,
        };
        let params = Netlify.service_params(&inputs).unwrap();
        assert_eq!(params.pr, None);
        assert_eq!(params.slug.as_deref(), Some("owner/site"));

        let pr: Envs = base
            .into_iter()
            .chain([("PULL_REQUEST", "true")])
            .collect();
        let inputs = ProviderInputs {
            envs: &pr,
            args: &args,
            git: &git,
            http: &Offline,
            debug: false,
        };
        assert_eq!(
            Netlify.service_params(&inputs).unwrap().pr.as_deref(),
            Some("7")
        );
    }
}
