//! HTTP surface: menu listing, manual crawl trigger and CORS.

use crate::core::etl::EtlEngine;
use crate::domain::model::is_day_key;
use crate::domain::ports::{MenuRepository, Pipeline};
use crate::utils::error::Result;
use axum::extract::{Query, Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn_with_state, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ApiState<P: Pipeline> {
    repository: Arc<dyn MenuRepository>,
    engine: Arc<EtlEngine<P>>,
}

impl<P: Pipeline> ApiState<P> {
    pub fn new(repository: Arc<dyn MenuRepository>, engine: Arc<EtlEngine<P>>) -> Self {
        Self { repository, engine }
    }
}

impl<P: Pipeline> Clone for ApiState<P> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            engine: Arc::clone(&self.engine),
        }
    }
}

/// Origins allowed to read the API from a browser. `*` admits any origin.
#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

impl CorsPolicy {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    pub fn allows(&self, origin: &str) -> bool {
        self.allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed.trim_end_matches('/') == origin)
    }
}

#[derive(Debug, Deserialize)]
struct MenuQuery {
    date: Option<String>,
}

pub fn router<P: Pipeline + 'static>(state: ApiState<P>, cors: CorsPolicy) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/menus", get(read_menus::<P>))
        .route("/crawl", get(trigger_crawl::<P>).post(trigger_crawl::<P>))
        .with_state(state)
        .layer(from_fn_with_state(cors, apply_cors))
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    let local_addr = listener.local_addr()?;
    tracing::info!("🚀 Menu API listening on http://{}", local_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutting down menu API");
            }
        })
        .await?;
    Ok(())
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "한라대학교 학식 API 서버 (주간 자동화 적용됨)"
    }))
}

async fn read_menus<P: Pipeline + 'static>(
    State(state): State<ApiState<P>>,
    Query(query): Query<MenuQuery>,
) -> Response {
    if let Some(day) = &query.date {
        if !is_day_key(day) {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("date must look like YYYY.MM.DD, got '{day}'"),
            );
        }
    }

    let repository = Arc::clone(&state.repository);
    let rows = tokio::task::spawn_blocking(move || match query.date {
        Some(day) => repository.read_day(&day),
        None => repository.read_all(),
    })
    .await;

    match rows {
        Ok(Ok(rows)) => Json(rows).into_response(),
        Ok(Err(e)) => {
            tracing::error!("Failed to read menus: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            tracing::error!("Menu read task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn trigger_crawl<P: Pipeline + 'static>(State(state): State<ApiState<P>>) -> Response {
    tracing::info!("🔧 Manual crawl requested");
    let summary = state.engine.run().await;

    let mut body = serde_json::json!({
        "message": "관리자 요청으로 크롤링을 수행했습니다.",
        "extracted": summary.extracted,
        "saved": summary.saved,
    });
    if let Some(reason) = summary.error {
        body["error"] = serde_json::Value::String(reason);
    }
    Json(body).into_response()
}

async fn apply_cors(State(policy): State<CorsPolicy>, request: Request, next: Next) -> Response {
    let allowed_origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|origin| policy.allows(origin))
        .and_then(|origin| HeaderValue::from_str(origin).ok());
    let requested_headers = request
        .headers()
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned();

    let is_preflight = request.method() == Method::OPTIONS
        && request.headers().contains_key(header::ORIGIN)
        && request
            .headers()
            .contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);

    let mut response = match (is_preflight, allowed_origin.is_some()) {
        (true, true) => StatusCode::NO_CONTENT.into_response(),
        (true, false) => {
            tracing::debug!("Rejected CORS preflight");
            return (StatusCode::BAD_REQUEST, "Disallowed CORS origin").into_response();
        }
        _ => next.run(request).await,
    };

    if let Some(origin) = allowed_origin {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            requested_headers.unwrap_or_else(|| HeaderValue::from_static("*")),
        );
        headers.append(header::VARY, HeaderValue::from_static("Origin"));
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_policy_wildcard() {
        let policy = CorsPolicy::new(vec!["*".to_string()]);
        assert!(policy.allows("http://localhost:3000"));
    }

    #[test]
    fn test_cors_policy_explicit_origins() {
        let policy = CorsPolicy::new(vec!["https://halla-bob.vercel.app/".to_string()]);
        assert!(policy.allows("https://halla-bob.vercel.app"));
        assert!(!policy.allows("https://evil.example"));
        assert!(!CorsPolicy::default().allows("https://halla-bob.vercel.app"));
    }
}
