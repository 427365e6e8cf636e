//! Competition Board — organize informal competitions and rank submissions
//!
//! Usage:
//!   competition-board serve --port 5000   — Launch the web server
//!   competition-board migrate             — Create/upgrade the database and exit

mod config;
mod error;
mod flash;
mod routes;
mod views;

use clap::{Parser, Subcommand};
use config::Config;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

const APP_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("GIT_HASH"));

#[derive(Parser)]
#[command(name = "competition-board")]
#[command(about = "Run informal competitions with custom leaderboard rules", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// SQLite database file
    #[arg(
        long,
        global = true,
        env = "COMPETITION_DB_PATH",
        default_value = "data/competition.db"
    )]
    db_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the web server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(short, long, default_value_t = 5000)]
        port: u16,
        /// File holding the secret used to sign flash cookies
        #[arg(long, env = "COMPETITION_SECRET_PATH", default_value = "data/secret_key")]
        secret_path: PathBuf,
        /// Directory served under /static
        #[arg(long, env = "COMPETITION_STATIC_DIR", default_value = "static")]
        static_dir: PathBuf,
    },
    /// Apply the database schema and exit
    Migrate,
}

#[derive(Clone)]
struct AppState {
    db: Arc<persistence::Database>,
    config: Arc<Config>,
    secret: Arc<Vec<u8>>,
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,engine=debug,persistence=debug,competition_board=debug,tower_http=debug")
    } else {
        EnvFilter::new("info,engine=info,persistence=info,competition_board=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).compact())
        .with(filter)
        .init();
}

async fn open_database(db_path: &Path) -> anyhow::Result<persistence::Database> {
    persistence::Database::new(db_path).await.map_err(|e| {
        error!("Failed to initialize database: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so env-backed arguments see it
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Serve {
            host,
            port,
            secret_path,
            static_dir,
        } => {
            let config = Config {
                host,
                port,
                db_path: cli.db_path,
                secret_path,
                static_dir,
            };
            cmd_serve(config).await?;
        }
        Commands::Migrate => {
            cmd_migrate(&cli.db_path).await?;
        }
    }

    Ok(())
}

// ============================================================================
// Serve command — Axum web server
// ============================================================================

async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    info!("Competition Board v{} starting...", APP_VERSION);

    let db = open_database(&config.db_path).await?;
    info!("Database initialized: {}", config.db_path.display());

    let secret = config::load_or_create_secret(&config.secret_path)?;
    let addr = config.bind_addr()?;

    let state = AppState {
        db: Arc::new(db),
        config: Arc::new(config),
        secret: Arc::new(secret),
    };
    let app = routes::build_router(state.clone());

    println!("\n=== Competition Board v{} ===", APP_VERSION);
    println!("Listening on http://{}", addr);
    println!("\nPages:");
    println!("  GET       /                                   - Competitions");
    println!("  GET/POST  /create_competition                 - New competition");
    println!("  GET       /leaderboard/:id[?rule=:rule_id]    - Leaderboard");
    println!("  GET/POST  /submit_score/:id                   - Submit a score");
    println!("  GET/POST  /competition/:id/manage_rules       - Leaderboard rules");
    println!("  GET/POST  /rule/:rule_id/edit                 - Edit a rule");
    println!("  POST      /rule/:rule_id/delete               - Delete a rule");
    println!("\nAPI:");
    println!("  GET       /api/health                         - Health check");
    println!("  GET       /api/leaderboard/:id                - Leaderboard as JSON");
    println!("\n  Database: {}", state.config.db_path.display());
    println!("\nPress Ctrl+C to stop\n");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Ctrl+C received, shutting down");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Migrate command — apply schema and exit
// ============================================================================

async fn cmd_migrate(db_path: &Path) -> anyhow::Result<()> {
    info!("Applying schema to {}", db_path.display());
    let db = open_database(db_path).await?;
    db.pool().close().await;
    info!("Done.");
    Ok(())
}
