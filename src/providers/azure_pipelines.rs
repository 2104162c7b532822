//! Azure Pipelines.
//!
//! PR builds run on a merge commit just like GitHub Actions; the same
//! two-parent check recovers the head and base commits.

use super::{pick, strip_refs_heads, Provider, ProviderInputs};
use crate::console;
use crate::envs::Envs;
use crate::error::Result;
use crate::git;
use crate::model::ServiceParams;
use crate::slug::slug_from_remote;

pub struct AzurePipelines;

impl Provider for AzurePipelines {
    fn detect(&self, envs: &Envs) -> bool {
        envs.is_set("SYSTEM_TEAMFOUNDATIONSERVERURI")
    }

    fn service_name(&self) -> &'static str {
        "Azure Pipelines"
    }

    fn service_params(&self, inputs: &ProviderInputs<'_>) -> Result<ServiceParams> {
        let args = inputs.args;

        let server_uri = inputs.env("SYSTEM_TEAMFOUNDATIONSERVERURI");
        let project = inputs.env("SYSTEM_TEAMPROJECT");
        let build_id = inputs.env("BUILD_BUILDID");

        let build_url = match (&server_uri, &project, &build_id) {
            (Some(uri), Some(project), Some(id)) => {
                Some(format!("{uri}{project}/_build/results?buildId={id}"))
            }
            _ => None,
        };

        let pr = inputs.arg_or_env(
            &args.pr,
            &[
                "SYSTEM_PULLREQUEST_PULLREQUESTID",
                "SYSTEM_PULLREQUEST_PULLREQUESTNUMBER",
            ],
        );

        let (commit, compare_sha) = match &args.sha {
            Some(sha) if !sha.is_empty() => (Some(sha.clone()), None),
            _ => {
                let commit = inputs.env("BUILD_SOURCEVERSION");
                match pr
                    .as_ref()
                    .and_then(|_| git::merge_commit_parents(inputs.git))
                {
                    Some((base, head)) => {
                        console::debug(
                            &format!("Using merge commit parent {head}"),
                            inputs.debug,
                        );
                        (Some(head), Some(base))
                    }
                    None => (commit, None),
                }
            }
        };

        let branch = inputs
            .env("BUILD_SOURCEBRANCH")
            .map(|b| strip_refs_heads(&b));
        let slug = pick(&args.slug, None).or_else(|| {
            slug_from_remote(inputs.git, inputs.env("BUILD_REPOSITORY_URI").as_deref())
        });

        Ok(ServiceParams {
            branch: pick(&args.branch, branch),
            build: inputs.arg_or_env(&args.build, &["BUILD_BUILDNUMBER"]),
            build_url,
            commit,
            job: build_id,
            pr,
            service: Some("azure_pipelines".to_string()),
            slug,
            compare_sha: pick(&args.compare_sha, compare_sha),
            project,
            server_uri,
        })
    }

    fn env_var_names(&self) -> &'static [&'static str] {
        &[
            "BUILD_BUILDID",
            "BUILD_BUILDNUMBER",
            "BUILD_REPOSITORY_URI",
            "BUILD_SOURCEBRANCH",
            "BUILD_SOURCEVERSION",
            "SYSTEM_PULLREQUEST_PULLREQUESTID",
            "SYSTEM_PULLREQUEST_PULLREQUESTNUMBER",
            "SYSTEM_TEAMFOUNDATIONSERVERURI",
            "SYSTEM_TEAMPROJECT",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::UploadOverrides;
    use crate::providers::testing::{FakeGit, Offline};

    fn envs() -> Envs {
        [
            ("SYSTEM_TEAMFOUNDATIONSERVERURI", "https://dev.azure.com/org/"),
            ("SYSTEM_TEAMPROJECT", "proj"),
            ("BUILD_BUILDID", "99"),
            ("BUILD_BUILDNUMBER", "20240101.1"),
            ("BUILD_SOURCEBRANCH", "refs/heads/feature/x"),
            ("BUILD_SOURCEVERSION", "abc"),
            ("BUILD_REPOSITORY_URI", "https://dev.azure.com/org/proj/_git/repo"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_push_build() {
        let envs = envs();
        let args = UploadOverrides::default();
        let inputs = ProviderInputs {
            envs: &envs,
            args: &args,
            git: &FakeGit::default(),
            http: &Offline,
            debug: false,
        };
        let params = AzurePipelines.service_params(&inputs).unwrap();
        assert_eq!(params.branch.as_deref(), Some("feature/x"));
        assert_eq!(params.commit.as_deref(), Some("abc"));
        assert_eq!(
            params.build_url.as_deref(),
            Some("https://dev.azure.com/org/proj/_build/results?buildId=99")
        );
        assert_eq!(params.project.as_deref(), Some("proj"));
        assert_eq!(params.server_uri.as_deref(), Some("https://dev.azure.com/org/"));
        assert_eq!(params.slug.as_deref(), Some("org/proj/repo"));
    }

    #[test]
    fn test_git_not_consulted_without_pr() {
        let envs = envs();
        let git = FakeGit::default();
        let args = UploadOverrides::default();
        let inputs = ProviderInputs {
            envs: &envs,
            args: &args,
            git: &git,
            http: &Offline,
            debug: false,
        };
        let params = AzurePipelines.service_params(&inputs).unwrap();
        assert_eq!(params.commit.as_deref(), Some("abc"));
        assert_eq!(params.compare_sha, None);
        assert!(git.calls.borrow().is_empty(), "{:?}", git.calls.borrow());
    }

    #[test]
    fn test_pr_merge_commit() {
        let envs: Envs = [
            ("SYSTEM_TEAMFOUNDATIONSERVERURI", "https://dev.azure.com/org/"),
            ("SYSTEM_PULLREQUEST_PULLREQUESTID", "12"),
            ("BUILD_SOURCEVERSION", "merge"),
        ]
        .into_iter()
        .collect();
        let base = "a".repeat(40);
        let head = "b".repeat(40);
        let parents = format!("{base} {head}");
        let git = FakeGit::with(&[("show --no-patch --format=%P", parents.as_str())]);
        let args = UploadOverrides::default();
        let inputs = ProviderInputs {
            envs: &envs,
            args: &args,
            git: &git,
            http: &Offline,
            debug: false,
        };
        let params = AzurePipelines.service_params(&inputs).unwrap();
        assert_eq!(params.pr.as_deref(), Some("12"));
        assert_eq!(params.commit, Some(head));
        assert_eq!(params.compare_sha, Some(base));
    }
}
