//! Router assembly, middleware stack and the serve loop for both services.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{MatchedPath, Request},
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, LogFormat, LoggingConfig, SecurityConfig, Service};
use crate::database::repository::{AuthRepositories, PortfolioRepositories};
use crate::database::DatabaseManager;
use crate::handlers::{auth, protected, public, system};
use crate::metrics::{spawn_collector, Metrics};
use crate::middleware::{current_user_middleware, jwt_auth_middleware, track_metrics};
use crate::state::{ApiState, AuthState};

const COLLECT_EVERY: Duration = Duration::from_secs(30);

/// Install the global subscriber. `RUST_LOG` wins over `LOG_LEVEL`.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("{},tower_http=info,sqlx=warn", logging.level))
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    // A second init (tests) is harmless.
    let _ = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if security.cors_permissive {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

/// Adds the shared outer stack: request metrics, tracing span with a request
/// id, CORS.
fn with_common_layers<S>(router: Router<S>, metrics: Arc<Metrics>, security: &SecurityConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        let matched = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str);
        tracing::info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri(),
            matched_path = matched,
            request_id = %uuid::Uuid::new_v4(),
        )
    });

    router
        .layer(middleware::from_fn_with_state(metrics, track_metrics))
        .layer(trace)
        .layer(cors_layer(security))
}

/// Routes of the portfolio API (port 8000)
pub fn api_router(state: ApiState, security: &SecurityConfig) -> Router {
    let owned = Router::new()
        .route(
            "/api/portfolios/own",
            get(protected::portfolio::list_own).post(protected::portfolio::create),
        )
        .route(
            "/api/portfolios/own/:id",
            put(protected::portfolio::update).delete(protected::portfolio::delete),
        )
        .route(
            "/api/categories/own",
            get(protected::category::list_own).post(protected::category::create),
        )
        .route(
            "/api/categories/own/:id",
            put(protected::category::update).delete(protected::category::delete),
        )
        .route(
            "/api/projects/own",
            get(protected::project::list_own).post(protected::project::create),
        )
        .route(
            "/api/projects/own/:id",
            get(protected::project::get_own)
                .put(protected::project::update)
                .delete(protected::project::delete),
        )
        .route(
            "/api/sections/own",
            get(protected::section::list_own).post(protected::section::create),
        )
        .route(
            "/api/sections/own/:id",
            put(protected::section::update).delete(protected::section::delete),
        )
        .route("/api/section-contents/own", post(protected::section_content::create))
        .route(
            "/api/section-contents/own/:id",
            put(protected::section_content::update)
                .delete(protected::section_content::delete),
        )
        .route(
            "/api/section-contents/own/:id/order",
            patch(protected::section_content::update_order),
        )
        .route_layer(middleware::from_fn_with_state(
            state.keys.clone(),
            jwt_auth_middleware,
        ));

    let reads = Router::new()
        .route("/api/portfolios/id/:id", get(public::portfolio::get_basic))
        .route("/api/portfolios/public/:id", get(public::portfolio::get_public))
        .route(
            "/api/portfolios/public/:id/categories",
            get(public::portfolio::get_categories),
        )
        .route(
            "/api/portfolios/public/:id/sections",
            get(public::portfolio::get_sections),
        )
        .route("/api/categories/id/:id", get(public::category::get_basic))
        .route("/api/categories/public/:id", get(public::category::get_public))
        .route(
            "/api/categories/public/:id/projects",
            get(public::category::get_projects),
        )
        .route("/api/projects/public/:id", get(public::project::get_public))
        .route("/api/projects/category/:id", get(public::project::by_category))
        .route("/api/projects/search/skills", get(public::project::search_by_skills))
        .route("/api/projects/search/client", get(public::project::search_by_client))
        .route("/api/sections/public/:id", get(public::section::get_public))
        .route("/api/sections/portfolio/:id", get(public::section::by_portfolio))
        .route("/api/sections/type", get(public::section::by_type))
        .route("/api/sections/:id/contents", get(public::section::contents))
        .route("/api/section-contents/:id", get(public::section_content::get));

    let ops = Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .route("/ready", get(system::ready))
        .route("/metrics", get(system::metrics));

    let metrics = state.metrics.clone();
    let router = Router::new()
        .merge(ops)
        .merge(reads)
        .merge(owned)
        .with_state(state);

    with_common_layers(router, metrics, security)
}

/// Routes of the auth service (port 8080)
pub fn auth_router(state: AuthState, security: &SecurityConfig) -> Router {
    let protected = Router::new()
        .route(
            "/api/profile",
            get(auth::profile::get)
                .put(auth::profile::update)
                .delete(auth::profile::delete),
        )
        .route("/api/users", get(auth::users::list))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            current_user_middleware,
        ));

    let public = Router::new()
        .route("/api/auth/register", post(auth::session::register))
        .route("/api/auth/login", post(auth::session::login))
        .route("/health", get(system::health))
        .route("/ready", get(system::ready_with_users))
        .route("/metrics", get(system::metrics));

    let metrics = state.metrics.clone();
    let router = Router::new().merge(public).merge(protected).with_state(state);

    with_common_layers(router, metrics, security)
}

/// Connect, optionally migrate, then serve `service` until Ctrl+C / SIGTERM.
pub async fn run(service: Service, config: &AppConfig) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let pool = DatabaseManager::connect_lazy(&config.database)
        .context("failed to configure database pool")?;
    if config.database.auto_migrate {
        DatabaseManager::migrate(&pool, service)
            .await
            .context("failed to apply migrations")?;
    }

    let metrics = Arc::new(Metrics::new());
    let (app, collector) = match service {
        Service::Api => {
            let repos = PortfolioRepositories::postgres(pool.clone());
            let collector = spawn_collector(metrics.clone(), repos.store.clone(), None, COLLECT_EVERY);
            let state = ApiState::new(repos, config, metrics);
            (api_router(state, &config.security), collector)
        }
        Service::Auth => {
            let repos = AuthRepositories::postgres(pool.clone());
            let collector = spawn_collector(
                metrics.clone(),
                repos.store.clone(),
                Some(repos.users.clone()),
                COLLECT_EVERY,
            );
            let state = AuthState::new(repos, config, metrics);
            (auth_router(state, &config.security), collector)
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(
        service = service.name(),
        environment = ?config.environment,
        %addr,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    collector.abort();
    DatabaseManager::close(&pool).await;
    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => warn!("Received Ctrl+C, shutting down"),
        _ = terminate => warn!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{api_app, auth_app, get, send, token_for, MemoryStore};
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn owned_routes_require_a_bearer_token() {
        let app = api_app(&MemoryStore::new());

        let (status, body) = get(&app, "/api/portfolios/own", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Authorization header required");

        let request = axum::http::Request::builder()
            .uri("/api/portfolios/own")
            .header(header::AUTHORIZATION, "Token abc")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let (status, body) = get(&app, "/api/portfolios/own", Some("not-a-jwt")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid token");
    }

    #[tokio::test]
    async fn public_reads_need_no_token() {
        let store = MemoryStore::new();
        let app = api_app(&store);

        let (status, body) = get(&app, "/api/portfolios/public/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Portfolio not found");

        let (status, body) = get(&app, "/api/portfolios/public/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid ID");
    }

    #[tokio::test]
    async fn health_reports_database_state() {
        let store = MemoryStore::new();
        let app = api_app(&store);

        let (status, body) = get(&app, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], Service::Api.name());

        store.set_down(true);
        let (status, body) = get(&app, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "error");

        let (status, body) = get(&app, "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["ready"], false);
    }

    #[tokio::test]
    async fn head_health_has_status_but_no_body() {
        let store = MemoryStore::new();
        let app = api_app(&store);

        let (status, body) = send(&app, axum::http::Method::HEAD, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());

        store.set_down(true);
        let (status, body) = send(&app, axum::http::Method::HEAD, "/health", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn auth_readiness_runs_a_query() {
        let store = MemoryStore::new();
        let app = auth_app(&store);

        let (status, body) = get(&app, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ready"], true);

        store.set_down(true);
        let (status, body) = get(&app, "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["reason"], "database query failed");
    }

    #[tokio::test]
    async fn metrics_endpoint_exports_request_counters() {
        let app = api_app(&MemoryStore::new());
        get(&app, "/api/portfolios/own", None).await;

        let (status, body) = get(&app, "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        let text = body.as_str().unwrap();
        assert!(text.contains("# TYPE http_requests_total counter"));
        assert!(text.contains(r#"path="/api/portfolios/own""#));
        assert!(text.contains(r#"status="401""#));
    }

    #[tokio::test]
    async fn crud_outcomes_are_counted() {
        let store = MemoryStore::new();
        let state = crate::testing::api_state(&store);
        let metrics = state.metrics.clone();
        let app = api_router(state, &crate::testing::test_config(Service::Api).security);
        let token = token_for(1);

        send(
            &app,
            Method::POST,
            "/api/portfolios/own",
            Some(&token),
            Some(json!({ "title": "Work" })),
        )
        .await;
        send(&app, Method::POST, "/api/portfolios/own", Some(&token), Some(json!({}))).await;

        let labels = [("entity", "portfolio"), ("operation", "create"), ("status", "success")];
        assert_eq!(metrics.counter_value(crate::metrics::CRUD_OPERATIONS_TOTAL, &labels).await, 1);
        let labels = [("entity", "portfolio"), ("operation", "create"), ("status", "error")];
        assert_eq!(metrics.counter_value(crate::metrics::CRUD_OPERATIONS_TOTAL, &labels).await, 1);
    }

    #[tokio::test]
    async fn root_describes_the_api() {
        let app = api_app(&MemoryStore::new());
        let (status, body) = get(&app, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn cors_preflight_is_answered() {
        let app = api_app(&MemoryStore::new());
        let request = axum::http::Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/portfolios/own")
            .header(header::ORIGIN, "http://localhost:3000")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[test]
    fn cors_list_skips_invalid_origins() {
        let security = SecurityConfig {
            jwt_secret: "s".into(),
            jwt_expiry_hours: 1,
            bcrypt_cost: 4,
            cors_origins: vec!["http://localhost:3000".into(), "bad\norigin".into()],
            cors_permissive: false,
        };
        // Builds without panicking on the bad entry
        let _ = cors_layer(&security);
    }
}
