//! Validation and defaulting of user-supplied plugin options.
//!
//! Errors are collected rather than returned on the first failure so a user
//! sees every problem with their configuration at once.

use std::fmt;
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

pub const DEFAULT_API_URL: &str = "https://api.codecov.io";
pub const DEFAULT_RETRY_COUNT: u32 = 3;
pub const DEFAULT_OIDC_AUDIENCE: &str = "https://codecov.io";

const BUNDLE_NAME_PATTERN: &str = r"^[\w\d_:/@\.{}\[\]$-]+$";

// ASCII classes only: `\w` and `\d` must not admit letters or digits outside ASCII.
static BUNDLE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(BUNDLE_NAME_PATTERN)
        .unicode(false)
        .build()
        .unwrap()
});

/// Values a user can override instead of relying on CI detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOverrides {
    pub branch: Option<String>,
    pub build: Option<String>,
    pub compare_sha: Option<String>,
    pub pr: Option<String>,
    pub sha: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GitService {
    Github,
    Gitlab,
    Bitbucket,
    GithubEnterprise,
    GitlabEnterprise,
    BitbucketServer,
}

impl GitService {
    pub fn as_str(&self) -> &'static str {
        match self {
            GitService::Github => "github",
            GitService::Gitlab => "gitlab",
            GitService::Bitbucket => "bitbucket",
            GitService::GithubEnterprise => "github_enterprise",
            GitService::GitlabEnterprise => "gitlab_enterprise",
            GitService::BitbucketServer => "bitbucket_server",
        }
    }
}

impl std::str::FromStr for GitService {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "github" => Ok(GitService::Github),
            "gitlab" => Ok(GitService::Gitlab),
            "bitbucket" => Ok(GitService::Bitbucket),
            "github_enterprise" => Ok(GitService::GithubEnterprise),
            "gitlab_enterprise" => Ok(GitService::GitlabEnterprise),
            "bitbucket_server" => Ok(GitService::BitbucketServer),
            _ => Err(format!(
                "gitService, \"{s}\" is not one of: github, gitlab, bitbucket, \
                 github_enterprise, gitlab_enterprise, bitbucket_server."
            )),
        }
    }
}

impl fmt::Display for GitService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOidc {
    #[serde(rename = "useGitHubOIDC")]
    pub use_github_oidc: Option<bool>,
    #[serde(rename = "gitHubOIDCTokenAudience")]
    pub github_oidc_token_audience: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcOptions {
    pub use_github_oidc: bool,
    pub github_oidc_token_audience: String,
}

/// Options as supplied by the user, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOptions {
    pub api_url: Option<String>,
    pub bundle_name: Option<String>,
    pub dry_run: Option<bool>,
    pub enable_bundle_analysis: Option<bool>,
    pub retry_count: Option<i64>,
    pub upload_token: Option<String>,
    pub upload_overrides: Option<UploadOverrides>,
    pub git_service: Option<String>,
    pub oidc: Option<RawOidc>,
    pub telemetry: Option<bool>,
    pub debug: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct NormalizedOptions {
    pub api_url: String,
    pub bundle_name: String,
    pub dry_run: bool,
    pub enable_bundle_analysis: bool,
    pub retry_count: u32,
    pub upload_token: Option<String>,
    pub upload_overrides: UploadOverrides,
    pub git_service: Option<GitService>,
    pub oidc: Option<OidcOptions>,
    pub telemetry: bool,
    pub debug: bool,
}

/// Human-readable validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<String>);

impl ValidationErrors {
    /// A misconfigured bundle name aborts the build; everything else is a
    /// warning the caller may choose to ignore.
    pub fn should_exit(&self) -> bool {
        self.0.iter().any(|e| e.contains("bundleName"))
    }

    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("\n"))
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate `raw` and fill in defaults.
pub fn normalize_options(raw: RawOptions) -> Result<NormalizedOptions, ValidationErrors> {
    let mut errors = Vec::new();

    let api_url = raw.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
    match url::Url::parse(&api_url) {
        Ok(u) if matches!(u.scheme(), "http" | "https") => {}
        _ => errors.push(format!("apiUrl, \"{api_url}\" is not a valid URL.")),
    }

    let bundle_name = raw.bundle_name.unwrap_or_default();
    if bundle_name.is_empty() {
        errors.push("bundleName is required.".to_string());
    } else if !BUNDLE_NAME_RE.is_match(&bundle_name) {
        errors.push(format!(
            "bundleName, \"{bundle_name}\" does not match format: \"/{BUNDLE_NAME_PATTERN}/\"."
        ));
    }

    let retry_count = match raw.retry_count {
        None => DEFAULT_RETRY_COUNT,
        Some(n) => match u32::try_from(n) {
            Ok(n) => n,
            Err(_) => {
                errors.push(format!(
                    "retryCount must be a non-negative integer, received: {n}."
                ));
                DEFAULT_RETRY_COUNT
            }
        },
    };

    let git_service = match raw.git_service.as_deref() {
        None | Some("") => None,
        Some(s) => match s.parse::<GitService>() {
            Ok(service) => Some(service),
            Err(e) => {
                errors.push(e);
                None
            }
        },
    };

    let oidc = raw.oidc.map(|o| OidcOptions {
        use_github_oidc: o.use_github_oidc.unwrap_or(false),
        github_oidc_token_audience: o
            .github_oidc_token_audience
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_OIDC_AUDIENCE.to_string()),
    });

    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    Ok(NormalizedOptions {
        api_url,
        bundle_name,
        dry_run: raw.dry_run.unwrap_or(false),
        enable_bundle_analysis: raw.enable_bundle_analysis.unwrap_or(false),
        retry_count,
        upload_token: raw.upload_token.filter(|t| !t.is_empty()),
        upload_overrides: raw.upload_overrides.unwrap_or_default(),
        git_service,
        oidc,
        telemetry: raw.telemetry.unwrap_or(true),
        debug: raw.debug.unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(bundle_name: &str) -> RawOptions {
        RawOptions {
            bundle_name: Some(bundle_name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let opts = normalize_options(raw("test-bundle")).unwrap();
        assert_eq!(opts.api_url, "https://api.codecov.io");
        assert_eq!(opts.bundle_name, "test-bundle");
        assert!(!opts.dry_run);
        assert_eq!(opts.retry_count, 3);
        assert!(!opts.enable_bundle_analysis);
        assert!(opts.telemetry);
        assert!(!opts.debug);
        assert!(opts.upload_token.is_none());
        assert!(opts.oidc.is_none());
    }

    #[test]
    fn test_invalid_bundle_name() {
        let errs = normalize_options(raw("!invalid-name!")).unwrap_err();
        assert_eq!(errs.messages().len(), 1);
        assert!(errs.messages()[0].contains("\"!invalid-name!\""));
        assert!(errs.messages()[0].contains(BUNDLE_NAME_PATTERN));
        assert!(errs.should_exit());
    }

    #[test]
    fn test_non_ascii_bundle_name_rejected() {
        for name in ["bündle-名前", "bundle-٣", "ñame"] {
            let errs = normalize_options(raw(name)).unwrap_err();
            assert!(errs.should_exit(), "{name}");
            assert!(errs.messages()[0].contains(&format!("\"{name}\"")));
            assert!(errs.messages()[0].contains(BUNDLE_NAME_PATTERN));
        }
    }

    #[test]
    fn test_bundle_name_allowed_characters() {
        for name in ["@scope/pkg", "app:client", "name.{x}[y]$", "a_b-c"] {
            assert!(normalize_options(raw(name)).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_missing_bundle_name() {
        let errs = normalize_options(RawOptions::default()).unwrap_err();
        assert!(errs.should_exit());
    }

    #[test]
    fn test_negative_retry_count() {
        let mut r = raw("bundle");
        r.retry_count = Some(-1);
        let errs = normalize_options(r).unwrap_err();
        assert_eq!(errs.messages().len(), 1);
        assert!(errs.messages()[0].contains("retryCount"));
        assert!(!errs.should_exit());
    }

    #[test]
    fn test_invalid_api_url() {
        let mut r = raw("bundle");
        r.api_url = Some("not a url".to_string());
        let errs = normalize_options(r).unwrap_err();
        assert!(errs.messages()[0].contains("apiUrl"));
    }

    #[test]
    fn test_unknown_git_service() {
        let mut r = raw("bundle");
        r.git_service = Some("sourceforge".to_string());
        let errs = normalize_options(r).unwrap_err();
        assert!(errs.messages()[0].contains("gitService"));
    }

    #[test]
    fn test_oidc_audience_default() {
        let mut r = raw("bundle");
        r.oidc = Some(RawOidc {
            use_github_oidc: Some(true),
            github_oidc_token_audience: None,
        });
        let opts = normalize_options(r).unwrap();
        let oidc = opts.oidc.unwrap();
        assert!(oidc.use_github_oidc);
        assert_eq!(oidc.github_oidc_token_audience, DEFAULT_OIDC_AUDIENCE);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "bundleName": "web",
            "retryCount": 5,
            "uploadOverrides": { "sha": "abc", "compareSha": "def" },
            "gitService": "gitlab",
            "oidc": { "useGitHubOIDC": true, "gitHubOIDCTokenAudience": "aud" }
        }"#;
        let raw: RawOptions = serde_json::from_str(json).unwrap();
        let opts = normalize_options(raw).unwrap();
        assert_eq!(opts.retry_count, 5);
        assert_eq!(opts.upload_overrides.compare_sha.as_deref(), Some("def"));
        assert_eq!(opts.git_service, Some(GitService::Gitlab));
        assert_eq!(opts.oidc.unwrap().github_oidc_token_audience, "aud");
    }
}
