use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::Parser;
use jscan_analysis::PluginEngine;
use jscan_config::{load_file, load_or_builtin, JscanConfig, Loader};
use jscan_lsp::JscanLanguageServer;
use tokio::io::{stdin, stdout};
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "JSCAN_LOG";
/// Layered when `--config` is not given; resolved against the working directory.
const WORKSPACE_CONFIG: &str = "jscan.toml";

/// Language server publishing jscan diagnostics over stdio.
#[derive(Debug, Parser)]
#[command(name = "jscan-lsp", version, about)]
struct Cli {
    /// TOML file overriding the built-in defaults (default: ./jscan.toml if present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter used when JSCAN_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Talk LSP over stdin/stdout (the only transport)
    #[arg(long)]
    stdio: bool,
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV).or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialise logging: {err}"))
}

fn load_defaults(path: Option<&PathBuf>) -> anyhow::Result<JscanConfig> {
    match path {
        Some(path) => {
            load_file(path).with_context(|| format!("failed to load {}", path.display()))
        }
        None => Ok(load_or_builtin(
            Loader::new().with_optional_file(WORKSPACE_CONFIG),
        )),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let defaults = Arc::new(load_defaults(cli.config.as_ref())?);
    let engine = Arc::new(PluginEngine::default());
    info!(
        plugins = defaults.scan_plugins_conf.len(),
        max_problems = defaults.max_number_of_problems,
        stdio = cli.stdio,
        "starting jscan-lsp"
    );

    let (service, socket) = LspService::new(move |client| {
        JscanLanguageServer::with_engine(client, Arc::clone(&engine), Arc::clone(&defaults))
    });
    Server::new(stdin(), stdout(), socket).serve(service).await;
    Ok(())
}
