//! The per-build Report: accumulates bundle statistics from adapter hooks and
//! uploads them.
//!
//! A Report is created once per build from validated options. Adapters call
//! [`Report::start`], fill in assets, chunks and modules, call
//! [`Report::end`] and finally [`Report::write`].
//!
//! The bundle name and plugin identity can be locked. A framework adapter
//! that wraps a generic bundler plugin sets and locks them first; the
//! generic plugin's later `set_*` calls are then ignored.

use std::time::Duration;

use crate::console;
use crate::envs::Envs;
use crate::error::{BundleError, Result};
use crate::git::{GitRunner, SystemGit};
use crate::http::{
    get_pre_signed_url, upload_stats, PreSignedUrlBody, RetryPolicy, Transport, UreqTransport,
    DEFAULT_RETRY_DELAY,
};
use crate::model::{
    Asset, BuildStats, Chunk, Identity, Module, OutputPayload, ServiceParams, PAYLOAD_VERSION,
};
use crate::oidc;
use crate::options::NormalizedOptions;
use crate::providers::{detect_provider, ProviderInputs};
use crate::telemetry::Telemetry;

/// Global token read when the options carry none.
pub const UPLOAD_TOKEN_ENV: &str = "CODECOV_UPLOAD_TOKEN";

/// Terminal state of [`Report::write`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Uploaded,
    SkippedDryRun,
    SkippedNoBundleName,
    FailedProviderDetection,
    FailedUrlFetch,
    FailedUpload,
}

/// How the pre-signed URL request authenticates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMode {
    Token(String),
    Oidc(String),
    /// Pull requests from forks may upload without a token.
    Tokenless,
}

impl AuthMode {
    fn token(&self) -> Option<&str> {
        match self {
            AuthMode::Token(t) | AuthMode::Oidc(t) => Some(t),
            AuthMode::Tokenless => None,
        }
    }
}

/// External collaborators used by [`Report::write_with`].
pub struct UploadContext<'a> {
    pub envs: &'a Envs,
    pub git: &'a dyn GitRunner,
    pub http: &'a dyn Transport,
    pub retry_delay: Duration,
}

impl<'a> UploadContext<'a> {
    pub fn new(envs: &'a Envs, git: &'a dyn GitRunner, http: &'a dyn Transport) -> Self {
        Self {
            envs,
            git,
            http,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Locks {
    bundle_name: bool,
    plugin_details: bool,
}

#[derive(Debug)]
pub struct Report {
    options: NormalizedOptions,
    bundle_name: String,
    plugin: Option<Identity>,
    locks: Locks,
    built_at: i64,
    duration: i64,
    bundler: Option<Identity>,
    output_path: Option<String>,
    pub assets: Vec<Asset>,
    pub chunks: Vec<Chunk>,
    pub modules: Vec<Module>,
    chunk_counter: usize,
    telemetry: Telemetry,
}

impl Report {
    pub fn new(options: &NormalizedOptions) -> Self {
        Self {
            bundle_name: options.bundle_name.clone(),
            options: options.clone(),
            plugin: None,
            locks: Locks::default(),
            built_at: 0,
            duration: 0,
            bundler: None,
            output_path: None,
            assets: Vec::new(),
            chunks: Vec::new(),
            modules: Vec::new(),
            chunk_counter: 0,
            telemetry: Telemetry::new(options.telemetry),
        }
    }

    pub fn options(&self) -> &NormalizedOptions {
        &self.options
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    /// Record the build start time.
    pub fn start(&mut self) {
        self.built_at = chrono::Utc::now().timestamp_millis();
    }

    /// Record the build duration. Without a prior [`start`](Self::start)
    /// this measures from the epoch.
    pub fn end(&mut self) {
        self.duration = chrono::Utc::now().timestamp_millis() - self.built_at;
    }

    pub fn built_at(&self) -> i64 {
        self.built_at
    }

    pub fn duration(&self) -> i64 {
        self.duration
    }

    pub fn bundle_name(&self) -> &str {
        &self.bundle_name
    }

    /// Set the bundle name unless it is locked; returns the current name.
    pub fn set_bundle_name(&mut self, name: &str) -> &str {
        if !self.locks.bundle_name {
            self.bundle_name = name.to_string();
        }
        &self.bundle_name
    }

    pub fn lock_bundle_name(&mut self) {
        self.locks.bundle_name = true;
    }

    pub fn unlock_bundle_name(&mut self) {
        self.locks.bundle_name = false;
    }

    pub fn plugin(&self) -> Option<&Identity> {
        self.plugin.as_ref()
    }

    /// Set the plugin identity unless it is locked.
    pub fn set_plugin(&mut self, name: &str, version: &str) {
        if !self.locks.plugin_details {
            self.plugin = Some(Identity::new(name, version));
        }
    }

    pub fn lock_plugin_details(&mut self) {
        self.locks.plugin_details = true;
    }

    pub fn unlock_plugin_details(&mut self) {
        self.locks.plugin_details = false;
    }

    pub fn set_bundler(&mut self, name: &str, version: &str) {
        self.bundler = Some(Identity::new(name, version));
    }

    pub fn set_output_path(&mut self, path: &str) {
        self.output_path = Some(path.to_string());
    }

    pub fn add_asset(&mut self, asset: Asset) {
        self.assets.push(asset);
    }

    pub fn add_chunk(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    /// Add `module`, merging it into an existing entry with the same name.
    /// Chunk ids are appended without duplicates.
    pub fn add_module(&mut self, mut module: Module) {
        let ids = std::mem::take(&mut module.chunk_unique_ids);
        let idx = match self.modules.iter().position(|m| m.name == module.name) {
            Some(i) => {
                if self.modules[i].size.is_none() {
                    self.modules[i].size = module.size;
                }
                i
            }
            None => {
                self.modules.push(module);
                self.modules.len() - 1
            }
        };
        for id in &ids {
            self.modules[idx].add_chunk(id);
        }
    }

    /// Next `"<counter>-<id>"` chunk identifier for this build.
    pub fn next_chunk_unique_id(&mut self, chunk_id: &str) -> String {
        let unique = format!("{}-{chunk_id}", self.chunk_counter);
        self.chunk_counter += 1;
        unique
    }

    /// Attach statistics gathered outside the plugin hooks, e.g. from a
    /// stats file.
    pub fn load_stats(&mut self, stats: BuildStats) {
        if let Some(bundler) = stats.bundler {
            self.bundler = Some(bundler);
        }
        if stats.output_path.is_some() {
            self.output_path = stats.output_path;
        }
        self.assets.extend(stats.assets);
        self.chunks.extend(stats.chunks);
        for module in stats.modules {
            self.add_module(module);
        }
    }

    pub fn payload(&self) -> OutputPayload {
        OutputPayload {
            version: PAYLOAD_VERSION.to_string(),
            built_at: self.built_at,
            duration: self.duration,
            bundle_name: self.bundle_name.clone(),
            output_path: self.output_path.clone(),
            bundler: self.bundler.clone(),
            plugin: self.plugin.clone(),
            assets: self.assets.clone(),
            chunks: self.chunks.clone(),
            modules: self.modules.clone(),
        }
    }

    /// Serialized upload payload.
    pub fn bundle_stats_to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.payload())?)
    }

    /// Upload using the process environment, the system `git` and a real
    /// HTTP client.
    ///
    /// Failures are logged and reported through the returned outcome. With
    /// `emit_error` they are returned as errors instead.
    pub fn write(&self, emit_error: bool) -> Result<WriteOutcome> {
        let envs = Envs::from_process();
        let http = UreqTransport::new();
        self.write_with(&UploadContext::new(&envs, &SystemGit, &http), emit_error)
    }

    pub fn write_with(&self, ctx: &UploadContext<'_>, emit_error: bool) -> Result<WriteOutcome> {
        if self.options.dry_run {
            console::dim("Dry run enabled, skipping upload.");
            return Ok(WriteOutcome::SkippedDryRun);
        }
        if self.bundle_name.is_empty() {
            console::yellow("Bundle name is not present, skipping upload.");
            return Ok(WriteOutcome::SkippedNoBundleName);
        }

        let fail = |outcome: WriteOutcome, err: BundleError| {
            console::red(&err.to_string());
            tracing::warn!(?outcome, error = %err, "bundle stats not uploaded");
            if emit_error {
                Err(err)
            } else {
                Ok(outcome)
            }
        };

        let inputs = ProviderInputs {
            envs: ctx.envs,
            args: &self.options.upload_overrides,
            git: ctx.git,
            http: ctx.http,
            debug: self.options.debug,
        };
        let params = match self
            .telemetry
            .phase("provider_detection", || detect_provider(&inputs))
        {
            Ok(params) => params,
            Err(e) => return fail(WriteOutcome::FailedProviderDetection, e),
        };
        console::debug(&format!("Service params: {params:?}"), self.options.debug);

        let policy = RetryPolicy {
            retry_count: self.options.retry_count,
            delay: ctx.retry_delay,
        };

        let url = match self
            .telemetry
            .phase("fetch_url", || self.fetch_upload_url(ctx, params, policy))
        {
            Ok(url) => url,
            Err(e) => return fail(WriteOutcome::FailedUrlFetch, e),
        };

        let uploaded = self.telemetry.phase("upload", || {
            let message = self.bundle_stats_to_json()?;
            upload_stats(ctx.http, &message, &url, policy)
        });
        if let Err(e) = uploaded {
            return fail(WriteOutcome::FailedUpload, e);
        }

        console::green(&format!(
            "Successfully uploaded stats for bundle: {}",
            self.bundle_name
        ));
        tracing::info!(bundle = %self.bundle_name, "bundle stats uploaded");
        Ok(WriteOutcome::Uploaded)
    }

    fn fetch_upload_url(
        &self,
        ctx: &UploadContext<'_>,
        params: ServiceParams,
        policy: RetryPolicy,
    ) -> Result<String> {
        let auth = self.resolve_auth(ctx, &params)?;
        let commit = params.commit.clone().unwrap_or_default();
        let body = PreSignedUrlBody::new(params, self.options.git_service);
        console::cyan("Fetching pre-signed upload URL");
        get_pre_signed_url(
            ctx.http,
            &self.options.api_url,
            &commit,
            auth.token(),
            &body,
            policy,
        )
    }

    /// Pick the credentials for the pre-signed URL request.
    ///
    /// OIDC wins when requested, then the configured token, then the global
    /// `CODECOV_UPLOAD_TOKEN`. Fork branches (`owner:branch`) may go
    /// tokenless.
    pub fn resolve_auth(&self, ctx: &UploadContext<'_>, params: &ServiceParams) -> Result<AuthMode> {
        if let Some(oidc) = self.options.oidc.as_ref().filter(|o| o.use_github_oidc) {
            if params.service.as_deref() != Some("github-actions") {
                return Err(BundleError::Oidc(
                    "OIDC is only supported on GitHub Actions".to_string(),
                ));
            }
            let token =
                oidc::github_id_token(ctx.http, ctx.envs, &oidc.github_oidc_token_audience)?;
            return Ok(AuthMode::Oidc(token));
        }

        if let Some(token) = &self.options.upload_token {
            return Ok(AuthMode::Token(token.clone()));
        }
        if let Some(token) = ctx.envs.string(UPLOAD_TOKEN_ENV) {
            return Ok(AuthMode::Token(token));
        }
        if params.branch.as_deref().is_some_and(|b| b.contains(':')) {
            return Ok(AuthMode::Tokenless);
        }
        Err(BundleError::NoUploadToken)
    }
}
