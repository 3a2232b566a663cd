//! Startup orchestration: parse arguments, pull and validate the initial
//! document, then serve the HTTP API.
//!
//! Exit codes:
//! - 64: invalid arguments
//! - 3:  the initial pull failed validation
//! - 1:  any other startup error (bad store backend, unreachable store)

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use configurator::error::ConfigError;
use configurator::exec::{ReloadTrigger, SystemRunner, Validator};
use configurator::http::{self, AppState};
use configurator::render::Transformer;
use configurator::state::ConfigState;
use configurator::store;

#[derive(Parser, Debug)]
#[command(name = "configurator", about = "Distribute a shared configuration document to this node")]
struct Args {
    /// Config store URI, e.g. consul://localhost:8500/service/web/config
    store_uri: String,

    /// Transformer name (json, json-compact, env)
    transformer: String,

    /// Target file the rendered configuration is written to
    target_file: PathBuf,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8881)]
    port: u16,

    /// Config check command; FILE is set in its environment
    #[arg(short, long)]
    check_cmd: Option<String>,

    /// Reload command run after each successful commit
    #[arg(short, long)]
    reload_cmd: Option<String>,

    /// Timeout for check/reload command execution, in seconds
    #[arg(long, default_value_t = 30)]
    exec_timeout_secs: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "configurator=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let is_help = matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
            let _ = e.print();
            std::process::exit(if is_help { 0 } else { 64 });
        }
    };

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Startup failed");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let uri = Url::parse(&args.store_uri)?;
    let store = store::from_uri(&uri)?;

    let transformer = Transformer::by_name(&args.transformer)
        .ok_or_else(|| format!("unrecognized transformer: {}", args.transformer))?;

    let timeout = Duration::from_secs(args.exec_timeout_secs);
    let check_cmd = args.check_cmd.clone().filter(|c| !c.is_empty());
    let reload_cmd = args.reload_cmd.clone().filter(|c| !c.is_empty());
    let config = ConfigState::new(
        store,
        transformer,
        args.target_file.clone(),
        Validator::new(check_cmd.clone(), timeout, SystemRunner),
        ReloadTrigger::new(reload_cmd, timeout, SystemRunner),
    );

    tracing::info!(
        store = %args.store_uri,
        transformer = transformer.name(),
        target_file = %args.target_file.display(),
        "Pulling and validating initial configuration"
    );
    match config.update().await {
        Ok(()) => {}
        Err(ConfigError::Validation(e)) => {
            eprintln!("!! Initial pull from config store resulted in validation error.");
            eprintln!("!! Output of '{}':", check_cmd.as_deref().unwrap_or(""));
            eprintln!("{}", e.output);
            std::process::exit(3);
        }
        Err(e) => return Err(e.into()),
    }

    let listener = TcpListener::bind(("0.0.0.0", args.port)).await?;
    let state = AppState {
        config: Arc::new(config),
    };
    http::serve(listener, state).await?;
    Ok(())
}
