use clap::Parser;
use clipvault_server::config::ServerConfig;
use clipvault_server::{tracing_setup, try_main};
use std::path::PathBuf;

/// Multi-tenant clipboard storage service.
#[derive(Debug, Parser)]
#[command(name = "clipvault", version, about)]
struct Args {
    /// Path to the TOML configuration file. Defaults to ./clipvault.toml
    /// when present.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the config file and environment.
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_setup::init_tracing();
    let args = Args::parse();

    let mut config = match ServerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "could not load configuration");
            std::process::exit(2);
        }
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    if let Err(e) = try_main(config).await {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}
