use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    news_pulse::telemetry::init();
    let cfg = news_pulse::config::Config::load()?;
    let property_id = cfg.property_id.clone();

    let (app, port) = news_pulse::build_app(cfg).await?;

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, property = %property_id, "analytics backend starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
