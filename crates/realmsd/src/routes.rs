//! HTTP surface: `/api/realms`, `/api/status` and JSON 404s.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use moka::future::Cache;
use realms_core::{DiscoveryError, Realm, RealmDiscovery, METRICS, VERSION};
use serde_json::json;
use tracing::{info, warn};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    discovery: Arc<RealmDiscovery>,
    realms: Cache<(), Arc<Vec<Realm>>>,
}

impl AppState {
    pub fn new(discovery: Arc<RealmDiscovery>, ttl: Duration) -> Self {
        let realms = Cache::builder().max_capacity(1).time_to_live(ttl).build();
        Self { discovery, realms }
    }

    /// Cached realm list. Concurrent misses share one discovery pass and
    /// failed passes are not cached.
    pub async fn realms(&self) -> Result<Arc<Vec<Realm>>, Arc<DiscoveryError>> {
        let discovery = Arc::clone(&self.discovery);
        self.realms
            .try_get_with((), async move {
                let realms = discovery.get_realms().await?;
                info!(realms = realms.len(), "realm list refreshed");
                METRICS.flush();
                Ok::<_, DiscoveryError>(Arc::new(realms))
            })
            .await
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/realms", get(list_realms))
        .route("/api/status", get(status))
        .fallback(not_found)
        .with_state(state)
}

async fn list_realms(State(state): State<AppState>) -> Result<Json<Vec<Realm>>, ApiError> {
    let realms = state.realms().await?;
    Ok(Json(realms.as_ref().clone()))
}

async fn status() -> Json<serde_json::Value> {
    Json(json!({ "ok": true, "version": VERSION }))
}

async fn not_found() -> ApiError {
    ApiError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: "no such route".to_string(),
    }
}

/// JSON error body: `{"error": {"code", "message"}}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl From<Arc<DiscoveryError>> for ApiError {
    fn from(err: Arc<DiscoveryError>) -> Self {
        warn!(code = err.code(), error = %err, "discovery pass failed");
        ApiError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({ "error": { "code": self.code, "message": self.message } });
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use realms_core::fakes::{BrokenRegistrySource, NodeBehavior, ScriptedTransport};
    use realms_core::{DiscoveryConfig, RegistrySource, StaticRegistrySource, StatusTransport};
    use tower::ServiceExt;

    fn app(registry: Arc<dyn RegistrySource>, transport: Arc<dyn StatusTransport>) -> Router {
        let discovery = RealmDiscovery::new(registry, transport, DiscoveryConfig::default());
        router(AppState::new(Arc::new(discovery), Duration::from_secs(3600)))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_realms_lists_deduplicated_realms() {
        let registry = Arc::new(StaticRegistrySource::from_domains([
            "a.example",
            "b.example",
            "http://insecure.example",
        ]));
        let transport = Arc::new(
            ScriptedTransport::new()
                .with("https://a.example", NodeBehavior::ready("hela", &["blue"]))
                .with("https://b.example", NodeBehavior::ready("hela", &["red"])),
        );

        let (status, body) = get(app(registry, transport), "/api/realms").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([{ "id": "hela", "url": "https://a.example", "layers": ["blue"] }])
        );
    }

    #[tokio::test]
    async fn test_all_unreachable_is_empty_ok() {
        let registry = Arc::new(StaticRegistrySource::from_domains(["a.example"]));
        let transport = Arc::new(
            ScriptedTransport::new().with("https://a.example", NodeBehavior::status(503)),
        );

        let (status, body) = get(app(registry, transport), "/api/realms").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn test_registry_failure_is_500_with_code() {
        let registry = Arc::new(BrokenRegistrySource::unavailable("rpc down"));
        let transport = Arc::new(ScriptedTransport::new());

        let (status, body) = get(app(registry, transport), "/api/realms").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "registry_unavailable");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("rpc down"));
    }

    #[tokio::test]
    async fn test_cached_realms_skip_second_pass() {
        let registry = Arc::new(StaticRegistrySource::from_domains(["a.example"]));
        let transport = Arc::new(
            ScriptedTransport::new().with("https://a.example", NodeBehavior::ready("hela", &[])),
        );
        let discovery = RealmDiscovery::new(
            registry,
            transport.clone(),
            DiscoveryConfig::default(),
        );
        let state = AppState::new(Arc::new(discovery), Duration::from_secs(3600));

        let first = state.realms().await.unwrap();
        let second = state.realms().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_pass_is_not_cached() {
        let discovery = RealmDiscovery::new(
            Arc::new(BrokenRegistrySource::unavailable("rpc down")),
            Arc::new(ScriptedTransport::new()),
            DiscoveryConfig::default(),
        );
        let state = AppState::new(Arc::new(discovery), Duration::from_secs(3600));

        assert!(state.realms().await.is_err());
        assert_eq!(state.realms.entry_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_registry_returns_500_instead_of_hanging() {
        let registry = Arc::new(BrokenRegistrySource::silent());
        let transport = Arc::new(ScriptedTransport::new());

        let (status, body) = tokio::time::timeout(
            Duration::from_secs(3600),
            get(app(registry, transport), "/api/realms"),
        )
        .await
        .expect("request must finish");

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "registry_unavailable");
    }

    #[tokio::test]
    async fn test_status_reports_version() {
        let router = app(
            Arc::new(StaticRegistrySource::default()),
            Arc::new(ScriptedTransport::new()),
        );

        let (status, body) = get(router, "/api/status").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "ok": true, "version": VERSION }));
    }

    #[tokio::test]
    async fn test_unknown_api_route_is_json_404() {
        let router = app(
            Arc::new(StaticRegistrySource::default()),
            Arc::new(ScriptedTransport::new()),
        );

        let (status, body) = get(router, "/api/peers").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }
}
