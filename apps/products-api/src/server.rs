//! Server assembly: router, middleware, docs and graceful shutdown

use axum::{
    extract::{Request, State},
    http::{
        header::{self, HeaderName, HeaderValue},
        Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use core_config::{server::ServerConfig, AppInfo};
use domain_products::Envelope;
use serde::Serialize;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};
use utoipa::OpenApi;

use crate::config::Config;

/// Creates the application router with documentation and common middleware.
///
/// This sets up:
/// - OpenAPI documentation (Swagger UI, ReDoc, RapiDoc, Scalar)
/// - API routes nested under `/api`
/// - Tracing, security headers, optional CORS, response compression
/// - Envelope-shaped 404 fallback
///
/// CORS is driven by `Config::cors_allowed_origins`; an empty list leaves
/// the CORS layer out entirely.
pub fn create_router<T>(apis: Router, config: &Config) -> Router
where
    T: OpenApi + 'static,
{
    use utoipa_rapidoc::RapiDoc;
    use utoipa_redoc::{Redoc, Servable as RedocServable};
    use utoipa_scalar::{Scalar, Servable as ScalarServable};
    use utoipa_swagger_ui::SwaggerUi;

    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", T::openapi()))
        .merge(Redoc::with_url("/redoc", T::openapi()))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"))
        .merge(Scalar::with_url("/scalar", T::openapi()))
        .nest("/api", apis)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers));

    let router = if config.cors_allowed_origins.is_empty() {
        router
    } else {
        info!(
            origins = config.cors_allowed_origins.len(),
            "CORS layer enabled"
        );
        router.layer(cors_layer(config.cors_allowed_origins.clone()))
    };

    // HTTP response compression (gzip, br, deflate, zstd), driven by the
    // Accept-Encoding header
    router.layer(CompressionLayer::new())
}

fn cors_layer(allowed_origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Fallback handler for unknown routes
async fn not_found() -> Response {
    Envelope::<()>::error(StatusCode::NOT_FOUND, "The requested resource was not found")
        .into_response()
}

/// Middleware that adds security headers to all responses.
///
/// Adds the following headers:
/// - X-Content-Type-Options: nosniff
/// - X-Frame-Options: DENY
/// - X-XSS-Protection: 1; mode=block
/// - Referrer-Policy: strict-origin-when-cross-origin
/// - Permissions-Policy: geolocation=(), microphone=(), camera=()
async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static("geolocation=(), microphone=(), camera=()"),
    );

    response
}

#[derive(Serialize)]
struct LivenessResponse {
    status: &'static str,
    name: &'static str,
    version: &'static str,
}

/// Liveness endpoint handler.
///
/// Always answers 200 with the app name and version while the process runs.
async fn health_handler(State(app): State<AppInfo>) -> Response {
    let response = LivenessResponse {
        status: "healthy",
        name: app.name,
        version: app.version,
    };

    (StatusCode::OK, Json(response)).into_response()
}

/// Creates a router with the root /health endpoint
pub fn health_router(app_info: AppInfo) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(app_info)
}

/// Production server with graceful shutdown and bounded cleanup.
///
/// The server drains in-flight requests after SIGINT/SIGTERM; `cleanup`
/// runs in parallel and is cut off after `shutdown_timeout`.
pub async fn serve<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let cleanup_handle = tokio::spawn(async move {
        shutdown_signal().await;

        info!("Starting cleanup tasks (timeout: {:?})", shutdown_timeout);
        match tokio::time::timeout(shutdown_timeout, cleanup).await {
            Ok(_) => info!("Cleanup completed successfully"),
            Err(_) => {
                tracing::warn!(
                    "Cleanup exceeded timeout of {:?}, forcing shutdown",
                    shutdown_timeout
                );
            }
        }
    });

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    // The cleanup task watches for the same signal; wait for it to finish
    cleanup_handle.await.ok();

    serve_result
}

/// Completes once SIGINT (Ctrl+C) or SIGTERM arrives
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;
    use core_config::app_info;
    use database::mongodb::MongoConfig;
    use tower::ServiceExt;

    fn test_config(cors_allowed_origins: Vec<HeaderValue>) -> Config {
        Config {
            app: app_info!(),
            mongodb: MongoConfig::default(),
            server: ServerConfig::default(),
            environment: Environment::Development,
            cors_allowed_origins,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_route_answers_envelope_404() {
        let config = test_config(Vec::new());
        let app = create_router::<crate::openapi::ApiDoc>(Router::new(), &config);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/no-such-route")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );

        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], 404);
        assert_eq!(body["message"], "The requested resource was not found");
        assert!(body["data"].is_null());
    }

    #[tokio::test]
    async fn test_cors_header_present_for_configured_origin() {
        let origin = HeaderValue::from_static("http://localhost:3000");
        let config = test_config(vec![origin.clone()]);
        let app = create_router::<crate::openapi::ApiDoc>(Router::new(), &config);

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/no-such-route")
                    .header(header::ORIGIN, origin.clone())
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            &origin
        );
    }

    #[tokio::test]
    async fn test_health_endpoint_reports_name_and_version() {
        let app = health_router(app_info!());

        let response = app
            .oneshot(
                HttpRequest::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["name"], "products_api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
