//! Command handlers for the `bundle-analyzer` binary.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::assets::complete_assets;
use crate::envs::Envs;
use crate::git::GitRunner;
use crate::http::Transport;
use crate::model::BuildStats;
use crate::normalize_path::normalize_path;
use crate::options::{NormalizedOptions, UploadOverrides};
use crate::providers::{detect_provider, find_provider, ProviderInputs};
use crate::report::{Report, UploadContext, WriteOutcome};

/// Plugin identity reported for uploads made by the standalone analyzer.
pub const PLUGIN_NAME: &str = "@codecov/bundle-analyzer";

/// Resolve CI metadata for the current environment and print it as JSON.
pub fn cmd_detect(
    envs: &Envs,
    git: &dyn GitRunner,
    http: &dyn Transport,
    overrides: &UploadOverrides,
    debug: bool,
) -> Result<String> {
    let provider = find_provider(envs).context("No CI provider matched this environment")?;
    let inputs = ProviderInputs {
        envs,
        args: overrides,
        git,
        http,
        debug,
    };
    let params = detect_provider(&inputs)?;

    let mut out = String::new();
    writeln!(out, "Provider: {}", provider.service_name()).unwrap();
    writeln!(out, "{}", serde_json::to_string_pretty(&params)?).unwrap();
    Ok(out)
}

pub fn cmd_normalize(file_name: &str, format: &str) -> String {
    format!("{}\n", normalize_path(file_name, format))
}

/// Load a stats file into a Report and upload it, or print the payload on a
/// dry run. Any failure is returned as an error.
pub fn cmd_upload(
    options: &NormalizedOptions,
    stats_file: &Path,
    format: &str,
    ctx: &UploadContext<'_>,
) -> Result<String> {
    let text = std::fs::read_to_string(stats_file)
        .with_context(|| format!("Failed to read {}", stats_file.display()))?;
    let mut stats: BuildStats = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a valid stats file", stats_file.display()))?;

    let output_dir = stats.output_path.as_deref().map(|p| {
        let p = Path::new(p);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            stats_file.parent().unwrap_or(Path::new(".")).join(p)
        }
    });
    complete_assets(&mut stats.assets, output_dir.as_deref(), format);

    let mut report = Report::new(options);
    report.start();
    report.set_plugin(PLUGIN_NAME, env!("CARGO_PKG_VERSION"));
    report.load_stats(stats);
    report.end();

    if options.dry_run {
        let payload = serde_json::to_string_pretty(&report.payload())?;
        return Ok(format!("{payload}\n"));
    }

    let outcome = report.write_with(ctx, true)?;
    let mut out = String::new();
    match outcome {
        WriteOutcome::Uploaded => writeln!(
            out,
            "Uploaded {} assets, {} chunks, {} modules for '{}'",
            report.assets.len(),
            report.chunks.len(),
            report.modules.len(),
            report.bundle_name()
        )
        .unwrap(),
        other => writeln!(out, "Upload skipped: {other:?}").unwrap(),
    }
    Ok(out)
}
