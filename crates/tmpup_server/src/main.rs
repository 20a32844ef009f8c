//! tmpupd: paste and image host daemon.

use clap::Parser;
use tmpup_core::db::{ImageDb, PasteDb};
use tmpup_core::maint::Prune;
use tmpup_core::{Connection, Maintenance};
use tmpup_server::{config::env_flag_enabled, resolve_bind_address, serve_router, AppState, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "tmpupd", about = "Temporary paste and image host", version)]
struct Cli {
    /// Database file (overrides DB_PATH)
    #[arg(short, long)]
    database: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "tmpup_server=warn,tmpup_core=warn,tower_http=warn",
        1 => "tmpup_server=info,tmpup_core=info,tower_http=warn",
        2 => "tmpup_server=debug,tmpup_core=debug,tower_http=info",
        _ => "tmpup_server=trace,tmpup_core=trace,tower_http=debug",
    }
}

fn apply_cli(mut config: Config, cli: &Cli) -> Config {
    if let Some(database) = &cli.database {
        config.db_path.clone_from(database);
    }
    config
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = apply_cli(Config::from_env(), &cli);
    Connection::initialize(&config.db_path)?;
    tracing::info!("using database {}", config.db_path);

    let tasks: Vec<Box<dyn Prune>> = vec![Box::new(PasteDb), Box::new(ImageDb)];
    let mut maintenance = Maintenance::start(config.db_path.clone(), config.prune_interval(), tasks)?;

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    let bind = std::env::var("BIND").ok();
    let bind_addr = resolve_bind_address(&config, bind.as_deref(), allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!("tmpupd is reachable from other hosts on {}", bind_addr);
    }

    let state = AppState::new(config)?;
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!("tmpupd running at http://{}", actual_addr);

    let serve_result = serve_router(listener, state, shutdown_signal()).await;

    maintenance.shutdown();
    tracing::info!("maintenance stopped");

    serve_result?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to install signal handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
