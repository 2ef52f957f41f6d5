use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use student_api::{api, config, logging, students::StudentService, supabase::SupabaseService};
use tokio::net::TcpListener;

/// Serve the student API backed by a hosted Postgres table.
#[derive(Parser)]
#[command(name = "student-api", version, about)]
struct Cli {
    /// Address to bind (overrides `SERVER_HOST`).
    #[arg(long)]
    host: Option<IpAddr>,
    /// Port to bind (overrides `SERVER_PORT`).
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();
    logging::init_tracing();

    let config = config::load_config().context("failed to load configuration")?;
    let store = SupabaseService::new(&config).context("failed to build Supabase client")?;
    let service = Arc::new(StudentService::new(store, config.supabase_table.clone()));
    let app = api::create_router(service, &config.allowed_origins);

    let addr = SocketAddr::new(
        cli.host.unwrap_or(config.server_host),
        cli.port.unwrap_or(config.server_port),
    );
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")?;
    Ok(())
}
