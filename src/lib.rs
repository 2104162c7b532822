pub mod assets;
pub mod cli;
pub mod console;
pub mod envs;
pub mod error;
pub mod git;
pub mod http;
pub mod model;
pub mod normalize_path;
pub mod oidc;
pub mod options;
pub mod providers;
pub mod report;
pub mod slug;
pub mod telemetry;
