//! Bundler-independent representation of one build's output. Adapters fill
//! these in from their native compilation objects and the Report serializes
//! them as the upload payload.

use serde::{Deserialize, Serialize};

/// Payload schema version understood by the upload API.
pub const PAYLOAD_VERSION: &str = "2";

/// A single emitted file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub size: u64,
    /// `None` when the file type is not compressible.
    #[serde(default)]
    pub gzip_size: Option<u64>,
    /// Name with content hashes replaced by `*`.
    #[serde(default)]
    pub normalized: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    pub id: String,
    /// `"<counter>-<id>"`, unique within one build.
    pub unique_id: String,
    pub entry: bool,
    pub initial: bool,
    pub files: Vec<String>,
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic_imports: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Path relative to the project root.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub chunk_unique_ids: Vec<String>,
}

impl Module {
    /// Record that this module also appears in `chunk_unique_id`.
    ///
    /// Ids are only ever appended; duplicates are ignored.
    pub fn add_chunk(&mut self, chunk_unique_id: &str) {
        if !self.chunk_unique_ids.iter().any(|c| c == chunk_unique_id) {
            self.chunk_unique_ids.push(chunk_unique_id.to_string());
        }
    }
}

/// Name and version of a bundler or plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub version: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// The serialized form of a Report sent to the pre-signed URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputPayload {
    pub version: String,
    pub built_at: i64,
    pub duration: i64,
    pub bundle_name: String,
    pub output_path: Option<String>,
    pub bundler: Option<Identity>,
    pub plugin: Option<Identity>,
    pub assets: Vec<Asset>,
    pub chunks: Vec<Chunk>,
    pub modules: Vec<Module>,
}

/// Build statistics supplied by an adapter (or read from a stats file by the
/// standalone analyzer) before they are attached to a Report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStats {
    #[serde(default)]
    pub bundler: Option<Identity>,
    #[serde(default)]
    pub output_path: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
    #[serde(default)]
    pub chunks: Vec<Chunk>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// Resolved identity of the current CI run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceParams {
    pub branch: Option<String>,
    pub build: Option<String>,
    #[serde(rename = "buildURL")]
    pub build_url: Option<String>,
    pub commit: Option<String>,
    pub job: Option<String>,
    pub pr: Option<String>,
    pub service: Option<String>,
    pub slug: Option<String>,
    #[serde(rename = "compareSha", skip_serializing_if = "Option::is_none")]
    pub compare_sha: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_uri: Option<String>,
}

impl ServiceParams {
    /// Copy with empty strings turned into `None`.
    #[must_use]
    pub fn without_empty(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.filter(|s| !s.is_empty())
        }
        Self {
            branch: clean(self.branch),
            build: clean(self.build),
            build_url: clean(self.build_url),
            commit: clean(self.commit),
            job: clean(self.job),
            pr: clean(self.pr),
            service: clean(self.service),
            slug: clean(self.slug),
            compare_sha: clean(self.compare_sha),
            project: clean(self.project),
            server_uri: clean(self.server_uri),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_chunk_ids_only_grow() {
        let mut module = Module {
            name: "src/index.js".to_string(),
            size: Some(10),
            chunk_unique_ids: vec!["1-main".to_string()],
        };
        module.add_chunk("2-vendor");
        module.add_chunk("1-main");
        assert_eq!(module.chunk_unique_ids, vec!["1-main", "2-vendor"]);
    }

    #[test]
    fn test_chunk_serializes_camel_case() {
        let chunk = Chunk {
            id: "main".to_string(),
            unique_id: "0-main".to_string(),
            entry: true,
            initial: true,
            files: vec!["main.js".to_string()],
            names: vec!["main".to_string()],
            dynamic_imports: None,
        };
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["uniqueId"], "0-main");
        assert!(json.get("dynamicImports").is_none());
    }

    #[test]
    fn test_service_params_wire_names() {
        let params = ServiceParams {
            build_url: Some("https://ci/1".to_string()),
            compare_sha: Some("abc".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["buildURL"], "https://ci/1");
        assert_eq!(json["compareSha"], "abc");
        assert!(json["branch"].is_null());
    }

    #[test]
    fn test_without_empty() {
        let params = ServiceParams {
            branch: Some(String::new()),
            commit: Some("abc".to_string()),
            ..Default::default()
        }
        .without_empty();
        assert_eq!(params.branch, None);
        assert_eq!(params.commit.as_deref(), Some("abc"));
    }
}
