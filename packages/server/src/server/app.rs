//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use twilio::TwilioService;

use crate::config::Config;
use crate::domains::auth::code::CodeGenerator;
use crate::domains::auth::stores::{InMemorySessionStore, PostgresSessionStore};
use crate::domains::auth::JwtService;
use crate::kernel::{
    BaseCodeDispatcher, BaseSessionStore, LogOnlyDispatcher, ServerDeps, TwilioAdapter,
};
use crate::server::middleware::{
    jwt_auth_middleware, request_span, sanitize_request_id, timeout_envelope, MakeRequestHexId,
    REQUEST_ID_HEADER,
};
use crate::server::routes::{health_handler, me_handler, send_code_handler, verify_code_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub deps: ServerDeps,
}

/// Wire the concrete store, dispatcher and token issuer selected by `config`
///
/// `pool` is `None` when no `DATABASE_URL` is configured, in which case
/// sessions live in process memory.
pub fn build_deps(config: &Config, pool: Option<PgPool>) -> Result<ServerDeps> {
    let session_store: Arc<dyn BaseSessionStore> = match pool {
        Some(pool) => Arc::new(PostgresSessionStore::new(pool, config.session_ttl)),
        None => {
            tracing::warn!("DATABASE_URL not set, sessions are kept in memory");
            Arc::new(InMemorySessionStore::new(config.session_ttl))
        }
    };

    let code_dispatcher: Arc<dyn BaseCodeDispatcher> = match &config.twilio {
        Some(options) => Arc::new(TwilioAdapter::new(Arc::new(TwilioService::new(
            options.clone(),
        )))),
        None => {
            tracing::warn!("Twilio not configured, verification codes are only logged");
            Arc::new(LogOnlyDispatcher)
        }
    };

    let code_generator = match config.fixed_sms_code {
        Some(code) => CodeGenerator::fixed(code).context("FIXED_SMS_CODE is out of range")?,
        None => CodeGenerator::Random,
    };

    let jwt_service = JwtService::new(&config.jwt_secret, config.jwt_issuer.clone(), config.jwt_ttl)
        .context("Invalid JWT configuration")?;

    Ok(ServerDeps::new(
        session_store,
        code_dispatcher,
        Arc::new(jwt_service),
        code_generator,
        config.call_timeout,
    ))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum application router
///
/// `request_timeout` should exceed three store/dispatcher call timeouts (see
/// `Config::validate`) so send-code can finish its compensating delete.
pub fn build_app(deps: ServerDeps, allowed_origins: &[String], request_timeout: Duration) -> Router {
    let token_issuer = deps.token_issuer.clone();
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let app_state = AppState { deps };

    let auth_routes = Router::new()
        .route("/send-code", post(send_code_handler))
        .route("/verify-code", post(verify_code_handler))
        .route("/me", get(me_handler));

    Router::new()
        .nest("/api/v1/auth", auth_routes)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(token_issuer.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(middleware::map_response(timeout_envelope))
        .layer(cors_layer(allowed_origins))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http().make_span_with(request_span))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestHexId))
        .layer(middleware::from_fn(sanitize_request_id))
}
