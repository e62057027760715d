use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use axum::body::Body;
use axum::http::Request;
use axum::http::Response;
use axum::middleware;
use axum::routing::get;
use axum::routing::post;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Span;

use super::cookies::CookiePolicy;
use super::handlers::admin::admin;
use super::handlers::home::home;
use super::handlers::login::login;
use super::handlers::logout::logout;
use super::handlers::refresh_token::refresh_token;
use super::handlers::register::register;
use super::handlers::validate_session::validate_session;
use super::middleware::authenticate as auth_middleware;
use super::middleware::PublicPaths;
use crate::config::SessionConfig;
use crate::domain::principal::ports::SessionServicePort;

/// Request authentication settings resolved at startup.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub login_path: String,
    pub public_paths: PublicPaths,
    pub cookie_policy: CookiePolicy,
}

impl SessionSettings {
    /// # Arguments
    /// * `config` - Session section of the configuration
    /// * `cookie_lifetime` - Max-Age of credential cookies (the refresh token lifetime)
    pub fn new(config: &SessionConfig, cookie_lifetime: chrono::Duration) -> Self {
        Self {
            login_path: config.login_path.clone(),
            public_paths: PublicPaths::new(&config.public_paths),
            cookie_policy: CookiePolicy::new(config.secure_cookies, cookie_lifetime),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<dyn SessionServicePort>,
    pub authenticator: Arc<Authenticator>,
    pub session: Arc<SessionSettings>,
}

pub fn create_router(
    session_service: Arc<dyn SessionServicePort>,
    authenticator: Arc<Authenticator>,
    session: SessionSettings,
) -> Router {
    let state = AppState {
        session_service,
        authenticator,
        session: Arc::new(session),
    };

    let auth_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/refresh-token", post(refresh_token))
        .route("/validate-session", get(validate_session))
        .route("/logout", post(logout));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        })
        .on_request(|request: &Request<Body>, _span: &Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "Request started"
            );
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, _span: &Span| {
                tracing::info!(
                    status = response.status().as_u16(),
                    latency_ms = latency.as_millis(),
                    "Request completed"
                );
            },
        );

    Router::new()
        .route("/", get(home))
        .route("/admin", get(admin))
        .nest("/auth", auth_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(trace_layer)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
