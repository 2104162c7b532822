use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use bundler_plugin_core::cli::{cmd_detect, cmd_normalize, cmd_upload};
use bundler_plugin_core::console;
use bundler_plugin_core::envs::Envs;
use bundler_plugin_core::git::SystemGit;
use bundler_plugin_core::http::UreqTransport;
use bundler_plugin_core::options::{normalize_options, RawOptions, UploadOverrides};
use bundler_plugin_core::report::UploadContext;

/// bundle-analyzer: detect CI metadata and upload bundle statistics.
#[derive(Parser)]
#[command(name = "bundle-analyzer", version, about)]
struct Cli {
    /// JSON file with plugin options (camelCase keys, as in a bundler config).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Name identifying this bundle across builds.
    #[arg(long, global = true)]
    bundle_name: Option<String>,

    /// Upload API base URL.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Repository upload token.
    #[arg(long, global = true, env = "CODECOV_UPLOAD_TOKEN", hide_env_values = true)]
    upload_token: Option<String>,

    /// Retries per request after the first attempt.
    #[arg(long, global = true)]
    retry_count: Option<i64>,

    /// github, gitlab, bitbucket, or an enterprise variant.
    #[arg(long, global = true)]
    git_service: Option<String>,

    /// Print the payload instead of uploading it.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Verbose console output.
    #[arg(long, global = true)]
    debug: bool,

    #[command(flatten)]
    overrides: OverrideArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Values that take precedence over anything detected from CI.
#[derive(clap::Args)]
struct OverrideArgs {
    #[arg(long, global = true)]
    branch: Option<String>,

    #[arg(long, global = true)]
    build: Option<String>,

    #[arg(long, global = true)]
    compare_sha: Option<String>,

    #[arg(long, global = true)]
    pr: Option<String>,

    #[arg(long, global = true)]
    sha: Option<String>,

    #[arg(long, global = true)]
    slug: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the CI provider and service params for this environment.
    Detect,

    /// Replace content hashes in an asset file name with `*`.
    Normalize {
        /// The emitted file name.
        file: String,

        /// The bundler's file name template, e.g. "[name]-[hash].js".
        #[arg(long, default_value = "")]
        format: String,
    },

    /// Upload a stats file.
    Upload {
        /// JSON stats file (bundler, outputPath, assets, chunks, modules).
        stats: PathBuf,

        /// File name template used to normalize asset names.
        #[arg(long, default_value = "")]
        format: String,
    },
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("BUNDLE_ANALYZER_LOG").unwrap_or_else(|_| EnvFilter::new("off"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let envs = Envs::from_process();
    let git = SystemGit;
    let http = UreqTransport::new();

    match &cli.command {
        Commands::Detect => {
            let raw = load_options(&cli)?;
            let overrides = raw.upload_overrides.unwrap_or_default();
            let debug = raw.debug.unwrap_or(false);
            print!("{}", cmd_detect(&envs, &git, &http, &overrides, debug)?);
        }
        Commands::Normalize { file, format } => {
            print!("{}", cmd_normalize(file, format));
        }
        Commands::Upload { stats, format } => {
            let mut raw = load_options(&cli)?;
            raw.enable_bundle_analysis = Some(true);
            let options = match normalize_options(raw) {
                Ok(options) => options,
                Err(errors) => {
                    for message in errors.messages() {
                        console::red(message);
                    }
                    return Ok(if errors.should_exit() {
                        ExitCode::FAILURE
                    } else {
                        ExitCode::SUCCESS
                    });
                }
            };
            let ctx = UploadContext::new(&envs, &git, &http);
            print!("{}", cmd_upload(&options, stats, format, &ctx)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Options from `--config`, overlaid by command-line flags.
fn load_options(cli: &Cli) -> Result<RawOptions> {
    let mut raw = match &cli.config {
        Some(path) => read_config(path)?,
        None => RawOptions::default(),
    };

    if let Some(v) = &cli.bundle_name {
        raw.bundle_name = Some(v.clone());
    }
    if let Some(v) = &cli.api_url {
        raw.api_url = Some(v.clone());
    }
    if let Some(v) = &cli.upload_token {
        raw.upload_token = Some(v.clone());
    }
    if let Some(v) = cli.retry_count {
        raw.retry_count = Some(v);
    }
    if let Some(v) = &cli.git_service {
        raw.git_service = Some(v.clone());
    }
    if cli.dry_run {
        raw.dry_run = Some(true);
    }
    if cli.debug {
        raw.debug = Some(true);
    }

    let o = &cli.overrides;
    let mut overrides: UploadOverrides = raw.upload_overrides.take().unwrap_or_default();
    for (slot, value) in [
        (&mut overrides.branch, &o.branch),
        (&mut overrides.build, &o.build),
        (&mut overrides.compare_sha, &o.compare_sha),
        (&mut overrides.pr, &o.pr),
        (&mut overrides.sha, &o.sha),
        (&mut overrides.slug, &o.slug),
    ] {
        if value.is_some() {
            slot.clone_from(value);
        }
    }
    raw.upload_overrides = Some(overrides);

    Ok(raw)
}

fn read_config(path: &Path) -> Result<RawOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}
