mod common;

use bundler_plugin_core::envs::Envs;
use bundler_plugin_core::options::UploadOverrides;
use bundler_plugin_core::providers::{detect_provider, find_provider, ProviderInputs, PROVIDERS};
use common::{envs, FakeGit, FakeTransport, HEAD_SHA};

fn overrides() -> UploadOverrides {
    UploadOverrides {
        branch: Some("arg-branch".to_string()),
        build: Some("arg-build".to_string()),
        compare_sha: Some("arg-compare".to_string()),
        pr: Some("arg-pr".to_string()),
        sha: Some("arg-sha".to_string()),
        slug: Some("arg/slug".to_string()),
    }
}

#[test]
fn test_overrides_beat_environment_for_every_provider() {
    let args = overrides();
    let git = FakeGit::checkout();
    let http = FakeTransport::default();

    for provider in PROVIDERS {
        // Every variable the provider reads carries a competing value.
        let envs: Envs = provider
            .env_var_names()
            .iter()
            .map(|k| (*k, "from-env"))
            .collect();
        let inputs = ProviderInputs {
            envs: &envs,
            args: &args,
            git: &git,
            http: &http,
            debug: false,
        };
        let name = provider.service_name();
        let params = provider
            .service_params(&inputs)
            .unwrap_or_else(|e| panic!("{name}: {e}"));

        assert_eq!(params.branch.as_deref(), Some("arg-branch"), "{name}");
        assert_eq!(params.build.as_deref(), Some("arg-build"), "{name}");
        assert_eq!(params.commit.as_deref(), Some("arg-sha"), "{name}");
        assert_eq!(params.pr.as_deref(), Some("arg-pr"), "{name}");
        assert_eq!(params.slug.as_deref(), Some("arg/slug"), "{name}");
        assert_eq!(params.compare_sha.as_deref(), Some("arg-compare"), "{name}");
    }
}

#[test]
fn test_specific_providers_beat_generic_ci() {
    let cases: &[(&[(&str, &str)], &str)] = &[
        (&[("CI", "true"), ("APPVEYOR", "true")], "AppVeyor CI"),
        (&[("CI", "true"), ("GITHUB_ACTIONS", "true")], "GitHub Actions"),
        (&[("CI", "true"), ("GITLAB_CI", "true")], "GitLab CI"),
        (&[("CI", "true"), ("TRAVIS", "true")], "Travis CI"),
        (&[("CI", "woodpecker")], "Woodpecker CI"),
        (&[("CI", "true"), ("BITBUCKET_BUILD_NUMBER", "3")], "Bitbucket"),
        (&[("CI", "true"), ("JENKINS_URL", "https://jenkins")], "Jenkins CI"),
    ];
    for (pairs, expected) in cases {
        let provider = find_provider(&envs(pairs)).unwrap();
        assert_eq!(provider.service_name(), *expected);
    }
}

#[test]
fn test_any_non_empty_ci_value_counts() {
    let cases: &[(&[(&str, &str)], &str)] = &[
        (&[("CI", "yes"), ("BITBUCKET_BUILD_NUMBER", "5")], "Bitbucket"),
        (&[("CI", "yes"), ("TRAVIS", "true")], "Travis CI"),
        (&[("CI", "yes"), ("APPVEYOR", "True")], "AppVeyor CI"),
        (&[("CI", "on"), ("BITRISE_IO", "true")], "Bitrise CI"),
        (&[("CODEBUILD_CI", "yes")], "AWS CodeBuild"),
    ];
    for (pairs, expected) in cases {
        let provider = find_provider(&envs(pairs)).unwrap();
        assert_eq!(provider.service_name(), *expected);
    }
}

#[test]
fn test_appveyor_flag_must_be_exact() {
    let envs = envs(&[("CI", "true"), ("APPVEYOR", "1")]);
    assert!(find_provider(&envs).is_none());
}

#[test]
fn test_generic_ci_without_provider_fails() {
    let envs = envs(&[("CI", "true")]);
    let args = UploadOverrides::default();
    let inputs = ProviderInputs {
        envs: &envs,
        args: &args,
        git: &FakeGit::checkout(),
        http: &FakeTransport::default(),
        debug: false,
    };
    assert!(matches!(
        detect_provider(&inputs),
        Err(bundler_plugin_core::error::BundleError::ProviderNotDetected)
    ));
}

#[test]
fn test_local_fallback_uses_git() {
    let envs = Envs::default();
    let args = UploadOverrides::default();
    let inputs = ProviderInputs {
        envs: &envs,
        args: &args,
        git: &FakeGit::checkout(),
        http: &FakeTransport::default(),
        debug: false,
    };
    let params = detect_provider(&inputs).unwrap();
    assert_eq!(params.branch.as_deref(), Some("main"));
    assert_eq!(params.commit.as_deref(), Some(HEAD_SHA));
    assert_eq!(
        params.slug.as_deref(),
        Some("codecov/codecov-javascript-bundler-plugins")
    );
}

#[test]
fn test_github_actions_pull_request_merge_commit() {
    let parent1 = "1".repeat(40);
    let parent2 = "2".repeat(40);
    let parents = format!("{parent1} {parent2}");
    let git = FakeGit::with(&[("show --no-patch --format=%P", parents.as_str())]);
    let envs = envs(&[
        ("GITHUB_ACTIONS", "true"),
        ("GITHUB_HEAD_REF", "branch"),
        ("GITHUB_REF", "refs/pull/1/merge"),
        ("GITHUB_SHA", "mergesha"),
        ("GITHUB_REPOSITORY", "codecov/codecov-javascript-bundler-plugins"),
        ("GITHUB_RUN_ID", "77"),
    ]);
    let args = UploadOverrides::default();
    let inputs = ProviderInputs {
        envs: &envs,
        args: &args,
        git: &git,
        http: &FakeTransport::default(),
        debug: false,
    };
    let params = detect_provider(&inputs).unwrap();
    assert_eq!(params.branch.as_deref(), Some("branch"));
    assert_eq!(params.pr.as_deref(), Some("1"));
    assert_eq!(params.commit, Some(parent2));
    assert_eq!(params.compare_sha, Some(parent1));
    assert_eq!(params.service.as_deref(), Some("github-actions"));
    assert_eq!(
        params.build_url.as_deref(),
        Some("https://github.com/codecov/codecov-javascript-bundler-plugins/actions/runs/77")
    );
}
