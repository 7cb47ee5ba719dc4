use comicboard::config::AppConfig;
use comicboard::routes;
use comicboard::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env().expect("invalid configuration");
    let port = config.port;
    tracing::info!(
        website_dir = %config.website_dir.display(),
        placeholder_base_url = %config.placeholder_base_url,
        "config loaded"
    );

    let state = AppState::with_placeholder(config);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "comicboard listening");
    axum::serve(listener, app).await.expect("server failed");
}
