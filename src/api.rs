//! REST API Server for the finance agent
//!
//! Exposes the agent turn and the two pipeline operations over HTTP so a
//! messaging webhook (or any other caller) can drive them.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::agent::FinanceAgent;
use crate::models::TransactionPayload;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageRequest {
    pub conversation_id: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PayloadRequest {
    pub text: String,
    pub confidence_threshold: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConfirmRequest {
    pub text: String,
    pub pending_payload: Option<TransactionPayload>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiResult {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::error(format!("{}: {}", context, e))),
    )
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<FinanceAgent>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Conversation Turn
/// =============================

async fn handle_message(
    State(state): State<ApiState>,
    Json(req): Json<MessageRequest>,
) -> ApiResult {
    if req.conversation_id.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("conversation_id is required".into())),
        );
    }

    info!(conversation_id = %req.conversation_id, "Received finance message");

    match state.agent.handle(&req.conversation_id, &req.text).await {
        Ok(outcome) => (StatusCode::OK, Json(ApiResponse::success(outcome))),
        Err(e) => internal_error("Finance turn failed", e),
    }
}

/// =============================
/// Pipeline Operations
/// =============================

async fn make_payload(
    State(state): State<ApiState>,
    Json(req): Json<PayloadRequest>,
) -> ApiResult {
    let threshold = req
        .confidence_threshold
        .unwrap_or_else(|| state.agent.confidence_threshold());

    if !(0.0..=1.0).contains(&threshold) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error("confidence_threshold must be within [0, 1]".into())),
        );
    }

    let result = state.agent.builder().build(&req.text, threshold);
    (StatusCode::OK, Json(ApiResponse::success(result)))
}

async fn confirm(
    State(state): State<ApiState>,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult {
    let result = state
        .agent
        .resolver()
        .resolve(&req.text, req.pending_payload.as_ref());
    (StatusCode::OK, Json(ApiResponse::success(result)))
}

/// =============================
/// Pending & Ledger Inspection
/// =============================

async fn get_pending(
    State(state): State<ApiState>,
    Path(conversation_id): Path<String>,
) -> ApiResult {
    match state.agent.pending().get(&conversation_id).await {
        Ok(pending) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "conversation_id": conversation_id,
                "has_pending": pending.is_some(),
                "pending": pending,
            }))),
        ),
        Err(e) => internal_error("Failed to load pending transaction", e),
    }
}

async fn clear_pending(
    State(state): State<ApiState>,
    Path(conversation_id): Path<String>,
) -> ApiResult {
    match state.agent.pending().clear(&conversation_id).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(serde_json::json!({
                "conversation_id": conversation_id,
                "cleared": true,
            }))),
        ),
        Err(e) => internal_error("Failed to clear pending transaction", e),
    }
}

async fn list_transactions(
    State(state): State<ApiState>,
    Path(conversation_id): Path<String>,
) -> ApiResult {
    match state.agent.ledger().list_for_conversation(&conversation_id).await {
        Ok(entries) => (StatusCode::OK, Json(ApiResponse::success(entries))),
        Err(e) => internal_error("Failed to list transactions", e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(agent: Arc<FinanceAgent>) -> Router {
    let state = ApiState { agent };

    Router::new()
        .route("/health", get(health))
        .route("/api/finance/message", post(handle_message))
        .route("/api/finance/payload", post(make_payload))
        .route("/api/finance/confirm", post(confirm))
        .route(
            "/api/finance/pending/:conversation_id",
            get(get_pending).delete(clear_pending),
        )
        .route("/api/finance/transactions/:conversation_id", get(list_transactions))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    agent: Arc<FinanceAgent>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(agent);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        create_router(Arc::new(FinanceAgent::with_defaults().unwrap()))
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(b) => Body::from(b.to_string()),
                None => Body::empty(),
            })
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&router(), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_message_flow_with_pending() {
        let router = router();

        let (status, body) = call(
            &router,
            "POST",
            "/api/finance/message",
            Some(json!({"conversation_id": "5511999990000", "text": "comprei um presente"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "need_confirmation");

        let (_, pending) = call(&router, "GET", "/api/finance/pending/5511999990000", None).await;
        assert_eq!(pending["data"]["has_pending"], true);

        let (_, body) = call(
            &router,
            "POST",
            "/api/finance/message",
            Some(json!({"conversation_id": "5511999990000", "text": "R$ 120,00"})),
        )
        .await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["action"], "save_transaction");

        let (_, listed) = call(&router, "GET", "/api/finance/transactions/5511999990000", None).await;
        assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_payload_endpoint() {
        let (status, body) = call(
            &router(),
            "POST",
            "/api/finance/payload",
            Some(json!({"text": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "error");
        assert_eq!(body["data"]["error"], "empty_text");

        let (status, _) = call(
            &router(),
            "POST",
            "/api/finance/payload",
            Some(json!({"text": "uber 20", "confidence_threshold": 2.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_confirm_endpoint() {
        let router = router();
        let (_, body) = call(
            &router,
            "POST",
            "/api/finance/confirm",
            Some(json!({"text": "sim"})),
        )
        .await;
        assert_eq!(body["data"]["error"], "no_pending");

        let pending = json!({
            "amount": 80.0,
            "currency": "BRL",
            "direction": "expense",
            "category": "Lazer",
            "confidence": 0.3,
            "description": "ontem",
            "raw_text": "gastei 80 ontem",
            "ts_iso": "2026-10-19T10:00:00-03:00"
        });
        let (_, body) = call(
            &router,
            "POST",
            "/api/finance/confirm",
            Some(json!({"text": "Mercado", "pending_payload": pending})),
        )
        .await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["transaction_payload"]["category"], "Mercado");
        assert_eq!(body["data"]["transaction_payload"]["confidence"], 1.0);
    }

    #[tokio::test]
    async fn test_clear_pending() {
        let router = router();
        call(
            &router,
            "POST",
            "/api/finance/message",
            Some(json!({"conversation_id": "c1", "text": "comprei um presente"})),
        )
        .await;

        let (status, body) = call(&router, "DELETE", "/api/finance/pending/c1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["cleared"], true);

        let (_, pending) = call(&router, "GET", "/api/finance/pending/c1", None).await;
        assert_eq!(pending["data"]["has_pending"], false);
    }
}
