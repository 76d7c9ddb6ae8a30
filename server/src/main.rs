mod api;
mod generator;

use clap::Parser;

/// Question service for the quickdrill trainer: generates arithmetic
/// questions and checks candidate answers. Stateless.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:8000")]
    bind: std::net::SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing with span durations
    use tracing_subscriber::fmt::format::FmtSpan;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();

    let args = Args::parse();

    tracing::info!("Starting quickdrill question service");

    let listener = tokio::net::TcpListener::bind(args.bind).await?;
    tracing::info!("Server listening on {}", args.bind);

    axum::serve(listener, api::router()).await?;

    Ok(())
}
