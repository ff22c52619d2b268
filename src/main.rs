use axum::routing::get;
use skillswap::telemetry;

#[tokio::main]
async fn main() {
    telemetry::setup_logging();

    let state = match skillswap::initialize_state().await {
        Ok(state) => state,
        Err(err) => {
            tracing::error!(error = %err, "cannot initialize state");
            std::process::exit(1);
        },
    };

    let recorder = match telemetry::setup_metrics_recorder() {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(error = %err, "cannot install metrics recorder");
            std::process::exit(1);
        },
    };

    let app = skillswap::app(state).route(
        "/metrics",
        get(move || std::future::ready(recorder.render())),
    );

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let listener =
        match tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!(error = %err, %port, "cannot bind port");
                std::process::exit(1);
            },
        };

    tracing::info!(%port, "server started");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %err, "server stopped");
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
    }
}
