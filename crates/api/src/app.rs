use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::errors::EmailSendingError;
use domain::events::EventDispatcher;
use domain::services::SurveyTemplate;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_admin_session, security_headers_middleware,
    trace_id,
};
use crate::routes::{auth, dashboard, dispatch, email_log, health, settings, users};
use crate::services::default_dispatcher;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub template: Arc<SurveyTemplate>,
    pub events: EventDispatcher,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Result<Self, EmailSendingError> {
        let template = config.survey.template()?;
        Ok(Self {
            pool,
            config: Arc::new(config),
            template: Arc::new(template),
            events: default_dispatcher(),
        })
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        // Development: same-origin frontend or any origin without credentials
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Puts `timed` under the request timeout and merges `long_running` outside it.
///
/// A survey dispatch runs until every ticket has an outcome, so it must never
/// be cut off by the timeout.
fn with_request_timeout<S>(timed: Router<S>, long_running: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    timed
        .layer(TimeoutLayer::new(timeout))
        .merge(long_running)
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, EmailSendingError> {
    let state = AppState::new(config, pool)?;
    let config = state.config.clone();

    let dispatch_routes = Router::new()
        .route("/api/v1/admin/dispatch", post(dispatch::dispatch))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_session,
        ));

    // Admin routes (require a session cookie)
    let admin_routes = Router::new()
        .route("/api/v1/admin/password", put(auth::change_password))
        .route("/api/v1/admin/dispatch/preview", post(dispatch::preview))
        .route(
            "/api/v1/admin/users",
            get(users::list_users).post(users::create_user),
        )
        .route("/api/v1/admin/users/import", post(users::import_users))
        .route(
            "/api/v1/admin/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route(
            "/api/v1/admin/csv-config",
            get(settings::get_csv_config).put(settings::update_csv_config),
        )
        .route(
            "/api/v1/admin/smtp-config",
            get(settings::get_smtp_config).put(settings::update_smtp_config),
        )
        .route(
            "/api/v1/admin/smtp-config/test",
            post(settings::test_smtp_config),
        )
        .route("/api/v1/admin/dashboard", get(dashboard::get_dashboard))
        .route("/api/v1/admin/emails", get(email_log::list_emails))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_session,
        ));

    let auth_routes = Router::new()
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/logout", post(auth::logout));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    let timed_routes = Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(admin_routes);

    Ok(with_request_timeout(
        timed_routes,
        dispatch_routes,
        Duration::from_secs(config.server.request_timeout_secs),
    )
    // Global middleware (order matters: bottom layers run first)
    .layer(DefaultBodyLimit::max(config.limits.max_upload_bytes))
    .layer(middleware::from_fn_with_state(
        state.clone(),
        security_headers_middleware,
    ))
    .layer(CompressionLayer::new())
    .layer(middleware::from_fn(metrics_middleware))
    .layer(TraceLayer::new_for_http())
    .layer(middleware::from_fn(trace_id))
    .layer(cors_layer(&config.server.cors_origins))
    .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::{Request, StatusCode}};
    use tower::ServiceExt;

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_millis(300)).await;
        "done"
    }

    fn timeout_router() -> Router {
        with_request_timeout(
            Router::new().route("/timed", get(slow)),
            Router::new().route("/long", get(slow)),
            Duration::from_millis(50),
        )
    }

    async fn status_of(app: Router, uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_timeout_applies_to_timed_routes() {
        assert_eq!(
            status_of(timeout_router(), "/timed").await,
            StatusCode::REQUEST_TIMEOUT
        );
    }

    #[tokio::test]
    async fn test_long_running_routes_outlive_the_timeout() {
        assert_eq!(status_of(timeout_router(), "/long").await, StatusCode::OK);
    }

    #[test]
    fn test_cors_layer_accepts_invalid_origins() {
        // Unparseable origins are skipped
        let _ = cors_layer(&["https://ok.example.com".to_string(), "\n".to_string()]);
        let _ = cors_layer(&[]);
    }
}
