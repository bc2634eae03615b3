//! parrotweb main entry point

use clap::Parser;
use parrotweb_api::{start_server, AppState};
use parrotweb_config::{Config, ConfigError};
use parrotweb_core::{FileTokenStore, Session};
use parrotweb_gateway::HttpGateway;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "parrotweb")]
#[command(author = "parrotweb Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight web front-end for the Parrot Wings transfer service", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Listen port, overrides server.port
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let loaded = Config::load(args.config.clone());
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match loaded {
        Ok(config) => config,
        Err(ConfigError::FileNotFound { path }) => {
            log::warn!("Config file {} not found, using defaults", path);
            Config::default()
        }
        Err(e) => {
            log::error!("{}", e.to_details());
            return Err(e.into());
        }
    };
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate()?;

    log::info!(
        "Config loaded: remote={}, session store={}",
        config.api_base_url(),
        config.session.store_path.display()
    );

    let gateway = HttpGateway::new(
        config.api_base_url(),
        Duration::from_secs(config.remote.timeout_secs),
    )?;
    let store = FileTokenStore::new(config.session.store_path.clone());
    let session = Arc::new(Session::new(Arc::new(store)));
    if session.is_authenticated() {
        log::info!("Resuming stored session");
    }

    let state = AppState::new(config, Arc::new(gateway), session);

    let rt = Runtime::new()?;
    rt.block_on(start_server(state))?;

    Ok(())
}
