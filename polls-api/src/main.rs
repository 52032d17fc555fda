mod multipart;
mod routes;
mod session;

use polls_app::{AppContext, Config};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };
    let addr = config.bind_addr;

    let app_context = match AppContext::connect(config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Media served from {} (uploads up to {} bytes)",
        app_context.media.root().display(),
        app_context.config.max_upload_bytes
    );
    tracing::info!("Security: login/register rate limit 5/min, 20/hour per client");

    let app = routes::router(app_context);

    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
