//! Skillswap is a skill-exchange API: user discovery, skill assignment
//! and reviews.

#[forbid(unsafe_code)]
#[deny(missing_docs, unused_mut)]
mod database;
pub mod error;
mod image;
mod router;
pub mod skill;
pub mod telemetry;
mod token;
pub mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::get;
use axum::{Router, middleware as AxumMiddleware};
pub use error::ServerError;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    caller: Option<(&AppState, &str)>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    let token = match caller {
        Some((state, user_id)) => format!(
            "Bearer {}",
            state.token.create(user_id).expect("cannot create JWT")
        ),
        None => String::default(),
    };

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::AUTHORIZATION, token)
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State for tests: shared secret and a throwaway media directory.
#[cfg(test)]
pub fn test_state(pool: sqlx::PgPool) -> AppState {
    AppState {
        config: Arc::new(config::Configuration::default()),
        db: database::Database { postgres: pool },
        token: token::TokenManager::new("test", "test-secret"),
        images: image::ImageStore::new(
            std::env::temp_dir().join("skillswap-media"),
            "http://localhost:8080/media",
        ),
    }
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub db: database::Database,
    pub token: token::TokenManager,
    pub images: image::ImageStore,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true). level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new(). include_headers(true). latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::new(Duration::from_secs(10)))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(router::status::status))
        .nest("/users", router::users::router(state.clone()))
        .nest("/subskills", router::subskills::router())
        // Serve picture blobs written by the image store.
        .nest_service("/media", ServeDir::new(state.images.directory()))
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file.  let it in memory.
    let config = config::Configuration::default().read()?;

    let db = match config.postgres {
        Some(ref config) => database::Database::new(config).await?,
        None => {
            tracing::error!("missing `postgres` entry on `config.yaml` file");
            std::process::exit(0);
        },
    };

    // execute migrations scripts on start.
    sqlx::migrate!().run(&db.postgres).await?;

    // bearer-token verification shares a secret with the identity provider.
    let Some(token_config) = &config.token else {
        tracing::error!("missing `token` entry on `config.yaml` file");
        std::process::exit(0);
    };
    let mut token =
        token::TokenManager::new(&config.url, &token_config.secret);

    if let Some(audience) = token_config.audience.as_ref() {
        token.audience(audience);
    }

    let images = match &config.images {
        Some(cfg) => image::ImageStore::new(&cfg.directory, &cfg.public_url),
        None => image::ImageStore::new(
            "media",
            &format!("{}media", config.url),
        ),
    };

    Ok(AppState {
        config,
        db,
        token,
        images,
    })
}
