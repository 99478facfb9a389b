use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dfa_httpd::config::{Config, ServeMode};
use dfa_httpd::error::ExitStatus;
use dfa_httpd::server;

/// Serves files from the working directory over HTTP.
#[derive(Debug, Parser)]
#[command(name = "dfa-httpd", version)]
struct Cli {
    /// TCP port to listen on
    port: u16,

    /// YAML configuration file
    #[arg(short, long, env = "DFA_HTTPD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to serve instead of the working directory
    #[arg(long)]
    root: Option<PathBuf>,

    /// Keep accepting connections instead of exiting after the first one
    #[arg(long)]
    forever: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return ExitStatus::Usage.into();
        }
        // --help and --version
        Err(e) => {
            let _ = e.print();
            return ExitStatus::Ok.into();
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cfg = match load_config(&cli) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitStatus::Usage.into();
        }
    };
    let mode = cfg.server.mode;

    let status = tokio::select! {
        res = server::run(cfg) => match res {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("{}", e);
                e.exit_status()
            }
        },

        _ = tokio::signal::ctrl_c(), if mode == ServeMode::Forever => {
            tracing::info!("Shutdown signal received");
            ExitStatus::Ok
        }
    };

    status.into()
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut cfg = Config::load(cli.config.as_deref())?;

    cfg.server.port = cli.port;
    if let Some(root) = &cli.root {
        cfg.files.root = root.clone();
    }
    if cli.forever {
        cfg.server.mode = ServeMode::Forever;
    }

    Ok(cfg)
}
