//! Repository slug handling: extracting `owner/repo` from git remote URLs
//! and the sentinel encoding the upload API expects on the wire.

use crate::error::{BundleError, Result};
use crate::git::{self, GitRunner};

/// Extract the `owner/repo` slug from a git remote URL.
///
/// Accepts `https://host/owner/repo.git`, `ssh://git@host:22/owner/repo.git`
/// and scp-like `git@host:owner/repo.git`. Nested owners (GitLab subgroups)
/// are kept intact, e.g. `group/sub/repo`. Azure DevOps' `_git` marker is not
/// part of the slug: `org/proj/_git/repo` yields `org/proj/repo`.
pub fn parse_slug(remote: &str) -> Result<String> {
    let remote = remote.trim();

    let path = if let Some((scheme, rest)) = remote.split_once("://") {
        if !matches!(scheme, "http" | "https" | "ssh" | "git+ssh") {
            return Err(BundleError::SlugParse(remote.to_string()));
        }
        // Drop the host (and any user/port) segment.
        match rest.split_once('/') {
            Some((_host, path)) => path,
            None => "",
        }
    } else if remote.contains('@') {
        match remote.split_once(':') {
            Some((_host, path)) => path,
            None => return Err(BundleError::SlugParse(remote.to_string())),
        }
    } else {
        return Err(BundleError::SlugParse(remote.to_string()));
    };

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let segments: Vec<&str> = path
        .split('/')
        .filter(|s| !s.is_empty() && *s != "_git")
        .collect();
    if segments.len() < 2 {
        return Ok(String::new());
    }
    Ok(segments.join("/"))
}

/// Slug from an explicit remote address or, failing that, `origin`'s URL.
///
/// Unparseable remotes yield `None`; the caller reports no slug rather than
/// failing the whole detection.
pub fn slug_from_remote(git: &dyn GitRunner, remote: Option<&str>) -> Option<String> {
    let remote = match remote {
        Some(r) if !r.is_empty() => r.to_string(),
        _ => git::remote_origin_url(git)?,
    };
    match parse_slug(&remote) {
        Ok(slug) if !slug.is_empty() && slug != "/" => Some(slug),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable remote");
            None
        }
    }
}

/// Encode a slug for the pre-signed URL request.
///
/// `owner/repo` becomes `owner::::repo`; slashes inside the owner become
/// `:::`, so `group/sub/repo` becomes `group:::sub::::repo`.
pub fn encode_slug(slug: &str) -> String {
    match slug.rsplit_once('/') {
        Some((owner, repo)) => {
            let owner = owner.split('/').collect::<Vec<_>>().join(":::");
            format!("{owner}::::{repo}")
        }
        None => slug.to_string(),
    }
}
