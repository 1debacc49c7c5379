use tilenav::Connectivity;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::cli::{parse_args, print_usage, Command, ParsedArgs, ToolOptions};

const CONNECTIVITY_ENV_VAR: &str = "TILENAV_CONNECTIVITY";

pub(crate) struct AppWiring {
    pub(crate) options: ToolOptions,
    pub(crate) command: Command,
}

/// `Ok(None)` means help was printed and there is nothing to run.
pub(crate) fn build_app(args: &[String]) -> Result<Option<AppWiring>, String> {
    let defaults = ToolOptions {
        connectivity: parse_connectivity_from_env()?,
        ..ToolOptions::default()
    };
    let (options, command) = match parse_args(args, defaults)? {
        ParsedArgs::Help => {
            print_usage();
            return Ok(None);
        }
        ParsedArgs::Run { options, command } => (options, command),
    };

    init_tracing();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        connectivity = ?options.connectivity,
        "level_tool_startup"
    );
    Ok(Some(AppWiring { options, command }))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn parse_connectivity_from_env() -> Result<Option<Connectivity>, String> {
    match std::env::var(CONNECTIVITY_ENV_VAR) {
        Ok(raw) => parse_connectivity(&raw).map(Some),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(format!("failed to read {CONNECTIVITY_ENV_VAR}: {error}")),
    }
}

pub(crate) fn parse_connectivity(raw: &str) -> Result<Connectivity, String> {
    match raw.trim() {
        "4" => Ok(Connectivity::Four),
        "8" => Ok(Connectivity::Eight),
        other => Err(format!(
            "invalid {CONNECTIVITY_ENV_VAR} value '{other}' (expected 4 or 8)"
        )),
    }
}
