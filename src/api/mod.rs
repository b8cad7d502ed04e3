use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, Request,
    },
    routing::{get, post, put},
    Extension, Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::PropagateRequestIdLayer,
    set_header::SetRequestHeaderLayer,
    trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

use crate::auth::AuthProvider;
use crate::store::DataStore;

pub mod error;
pub(crate) mod handlers;
pub mod principal;
pub mod response;
mod sweeper;

/// Capabilities shared by every handler, injected as an [`Extension`].
pub struct AppState {
    pub auth: Arc<dyn AuthProvider>,
    pub store: Arc<dyn DataStore>,
}

/// Build the full route table. Kept free of listener and layer concerns so
/// tests can drive it with `tower::ServiceExt::oneshot`.
#[must_use]
pub fn router(state: Arc<AppState>) -> Router {
    let v1 = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/verify", get(handlers::auth::verify))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route(
            "/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/companies", post(handlers::companies::create))
        .route(
            "/companies/me",
            get(handlers::companies::me)
                .put(handlers::companies::update)
                .delete(handlers::companies::delete),
        )
        .route("/companies/stats", get(handlers::companies::stats))
        .route("/admin/companies", get(handlers::companies::list))
        .route("/users", get(handlers::users::list))
        .route(
            "/users/:id",
            get(handlers::users::get)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route(
            "/invitations",
            post(handlers::invitations::create).get(handlers::invitations::list),
        )
        .route(
            "/invitations/:token/accept",
            post(handlers::invitations::accept),
        )
        .route(
            "/invitations/:id",
            axum::routing::delete(handlers::invitations::delete),
        )
        .route(
            "/shortcuts",
            get(handlers::shortcuts::list).post(handlers::shortcuts::create),
        )
        .route(
            "/shortcuts/:id",
            put(handlers::shortcuts::update).delete(handlers::shortcuts::delete),
        )
        .route("/setup/progress", get(handlers::setup::progress))
        .route("/setup/step", put(handlers::setup::update_step))
        .route("/setup/stats", get(handlers::setup::stats))
        .route("/setup/configuration", put(handlers::setup::configuration))
        .route(
            "/setup/generate-shortcuts",
            post(handlers::setup::generate_shortcuts),
        )
        .route("/setup/nudge-users", post(handlers::setup::nudge_users))
        .route("/setup/download-info", get(handlers::setup::download_info));

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api/v1", v1)
        .layer(Extension(state))
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    state: Arc<AppState>,
    frontend_origin: Option<String>,
    sweep_interval: Duration,
) -> Result<()> {
    sweeper::spawn_expiry_sweeper(state.store.clone(), sweep_interval);

    let mut cors = CorsLayer::new()
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]);

    // Lock CORS to the configured frontend; without one, stay open for local
    // development.
    if let Some(base_url) = frontend_origin {
        cors = cors
            .allow_origin(AllowOrigin::exact(origin_header(&base_url)?))
            .allow_credentials(true);
    } else {
        cors = cors.allow_origin(AllowOrigin::any());
    }

    let app = router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestHeaderLayer::if_not_present(
                HeaderName::from_static("x-request-id"),
                |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
            ))
            .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                "x-request-id",
            )))
            .layer(TraceLayer::new_for_http().make_span_with(make_span))
            .layer(cors),
    );

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

fn origin_header(frontend_base_url: &str) -> Result<HeaderValue> {
    let parsed = Url::parse(frontend_base_url)
        .with_context(|| format!("Invalid frontend base URL: {frontend_base_url}"))?;
    let host = parsed.host_str().ok_or_else(|| {
        anyhow!("Frontend base URL must include a valid host: {frontend_base_url}")
    })?;
    let port = parsed
        .port()
        .map_or_else(String::new, |port| format!(":{port}"));
    let origin = format!("{}://{}{}", parsed.scheme(), host, port);
    HeaderValue::from_str(&origin).context("Failed to build frontend origin header")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_header_strips_path_and_keeps_port() {
        let origin = origin_header("https://portal.example.com:8443/app/index.html").unwrap();
        assert_eq!(origin, "https://portal.example.com:8443");

        let origin = origin_header("http://localhost:3000").unwrap();
        assert_eq!(origin, "http://localhost:3000");
    }

    #[test]
    fn origin_header_rejects_garbage() {
        assert!(origin_header("not a url").is_err());
    }
}
