use anyhow::Context;
use clap::Parser;
use pdfqa::{api, config, logging, pdfs::PdfService};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the PDF Q&A HTTP API.
#[derive(Debug, Parser)]
#[command(name = "pdfqa", version, about)]
struct Cli {
    /// Port to bind; overrides `SERVER_PORT`.
    #[arg(long)]
    port: Option<u16>,
    /// Database connection string; overrides `DATABASE_URL`.
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing();

    let mut config = config::load().context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server_port = Some(port);
    }
    if let Some(database_url) = cli.database_url {
        config.database_url = database_url;
    }

    let service = PdfService::from_config(&config).await?;
    let app = api::create_router(Arc::new(service));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

async fn bind_listener(port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
