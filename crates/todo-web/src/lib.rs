//! Todo Web Server
//!
//! Axum-based REST API with a Server-Sent Events task feed.

pub mod routes;
pub mod state;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use todo_core::TaskGateway;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use state::AppState;

/// Origin of the frontend dev server, always allowed.
pub const DEV_FRONTEND_URL: &str = "http://localhost:5173";

/// Server settings resolved by the binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_url: Option<String>,
}

/// CORS policy for the configured frontend plus the dev server.
pub fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origins: Vec<HeaderValue> = frontend_url
        .into_iter()
        .chain(std::iter::once(DEV_FRONTEND_URL))
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let headers = [header::CONTENT_TYPE, header::CONNECTION, header::CACHE_CONTROL];

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(headers.clone())
        .expose_headers(headers)
        .allow_credentials(true)
}

/// Create the application router.
pub fn create_router(state: AppState, frontend_url: Option<&str>) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route("/tasksSub", get(routes::stream::subscribe_tasks))
        .route("/create", put(routes::tasks::create_task))
        .route("/update/{id}", post(routes::tasks::update_task))
        .route("/delete/{id}", delete(routes::tasks::delete_task))
        .route("/internal/notify", post(routes::internal::notify))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(frontend_url))
        .with_state(state)
}

/// Run the web server.
pub async fn run_server(tasks: TaskGateway, config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(tasks);
    let app = create_router(state, config.frontend_url.as_deref());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
