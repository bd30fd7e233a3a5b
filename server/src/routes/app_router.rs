use axum::{
    body::Body,
    http::{header, Method, Request},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use http::HeaderValue;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::{error::AppError, state::AppContext};

use super::handlers::{emails, stats, status};

pub struct AppRouter;

impl AppRouter {
    pub fn create(ctx: AppContext) -> Router {
        let origins = ctx
            .config()
            .server
            .allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
                    None
                }
            })
            .collect::<Vec<_>>();

        let cors_layer = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true);

        let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "request",
                request_id = %Uuid::new_v4(),
                method = %request.method(),
                uri = %request.uri(),
            )
        });

        Router::new()
            .route("/", get(status::root))
            .nest(
                "/api",
                Router::new()
                    .route("/health", get(status::health))
                    .route("/config/status", get(status::config_status))
                    .route("/categories", get(status::categories))
                    .route("/stats", get(stats::dashboard_stats))
                    .route("/emails", get(emails::list_emails))
                    .route("/emails/process", post(emails::process_emails))
                    .route("/emails/:id/classify", post(emails::classify_email)),
            )
            .layer(trace_layer)
            .layer(cors_layer)
            .with_state(ctx)
            .fallback(handler_404)
    }
}

pub async fn handler_404() -> impl IntoResponse {
    AppError::NotFound("Route does not exist".to_string())
}
