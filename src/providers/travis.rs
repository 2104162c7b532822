use super::{pick, Provider, ProviderInputs};
use crate::console;
use crate::envs::Envs;
use crate::error::Result;
use crate::model::ServiceParams;

pub struct Travis;

impl Travis {
    /// Tag builds set `TRAVIS_BRANCH` to the tag name, so no branch is
    /// reported for them.
    fn branch(inputs: &ProviderInputs<'_>) -> Option<String> {
        if inputs.env("TRAVIS_BRANCH") == inputs.env("TRAVIS_TAG") {
            return None;
        }
        inputs.envs.first(&["TRAVIS_PULL_REQUEST_BRANCH", "TRAVIS_BRANCH"])
    }
}

impl Provider for Travis {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("CI") && envs.is_set("TRAVIS") && !envs.is_set("SHIPPABLE")
    }

    fn service_name(&self) -> &'static str {
        "Travis CI"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;
        let pr = inputs
            .env("TRAVIS_PULL_REQUEST")
            .filter(|pr| pr != "false");

        let params = ServiceParams {
            branch: pick(&args.branch, Self::branch(inputs)),
            build: inputs.arg_or_env(&args.build, &["TRAVIS_JOB_NUMBER"]),
            build_url: inputs.env("TRAVIS_JOB_WEB_URL"),
            commit: inputs.arg_or_env(&args.sha, &["TRAVIS_PULL_REQUEST_SHA", "TRAVIS_COMMIT"]),
            job: inputs.env("TRAVIS_JOB_ID"),
            pr: pick(&args.pr, pr),
            service: Some("travis".to_string()),
            slug: inputs.arg_or_env(&args.slug, &["TRAVIS_REPO_SLUG"]),
            compare_sha: pick(&args.compare_sha, None),
            ..Default::default()
        };
        console::debug(&format!("Travis CI params: {params:?}"), inputs.debug);
        Ok(params)
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "CI",
            "TRAVIS",
            "TRAVIS_BRANCH",
            "TRAVIS_COMMIT",
            "TRAVIS_JOB_ID",
            "TRAVIS_JOB_NUMBER",
            "TRAVIS_JOB_WEB_URL",
            "TRAVIS_PULL_REQUEST",
            "TRAVIS_PULL_REQUEST_BRANCH",
            "TRAVIS_PULL_REQUEST_SHA",
            "TRAVIS_REPO_SLUG",
            "TRAVIS_TAG",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UploadOverrides;
    use crate::providers::testing::{FakeGit, Offline};

    fn params(pairs: &[(&str, &str)]) -> ServiceParams {
        let envs: Envs = pairs.iter().copied().collect();
        let args = UploadOverrides::default();
        let inputs = ProviderInputs {
            envs: &envs,
            args: &args,
            git: &FakeGit::default(),
            http: &Offline,
            debug: false,
        };
        Travis.service_params(&inputs).unwrap()
    }

    #[test]
    fn test_shippable_is_not_travis() {
        let envs: Envs = [("CI", "true"), ("TRAVIS", "true"), ("SHIPPABLE", "true")]
            .into_iter()
            .collect();
        assert!(!Travis.detect(&envs));
    }

    #[test]
    fn test_pull_request_build() {
        let p = params(&[
            ("TRAVIS_BRANCH", "main"),
            ("TRAVIS_PULL_REQUEST_BRANCH", "feature"),
            ("TRAVIS_PULL_REQUEST", "4"),
            ("TRAVIS_PULL_REQUEST_SHA", "prsha"),
            ("TRAVIS_COMMIT", "mergesha"),
        ]);
        assert_eq!(p.branch.as_deref(), Some("feature"));
        assert_eq!(p.commit.as_deref(), Some("prsha"));
        assert_eq!(p.pr.as_deref(), Some("4"));
    }

    #[test]
    fn test_tag_build_has_no_branch() {
        let p = params(&[
            ("TRAVIS_BRANCH", "v1.0.0"),
            ("TRAVIS_TAG", "v1.0.0"),
            ("TRAVIS_PULL_REQUEST", "false"),
        ]);
        assert_eq!(p.branch, None);
        assert_eq!(p.pr, None);
    }
}
