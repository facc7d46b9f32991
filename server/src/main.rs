use clap::Parser;
use superfarmer_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    superfarmer_server::init_tracing();

    let cfg = ServerConfig::parse();
    let addr = cfg.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .inspect_err(|e| tracing::error!(%addr, error = %e, "failed to bind"))?;

    superfarmer_server::run(listener).await?;
    Ok(())
}
