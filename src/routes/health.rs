use std::sync::Arc;

use axum::{routing::get, Router};
use serde::Serialize;

use crate::{middleware::mw_ctx::CtxState, models::web::ApiResponse};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
struct HealthView {
    status: &'static str,
}

async fn health() -> ApiResponse<HealthView> {
    ApiResponse::ok(HealthView { status: "ok" }, "Service is running")
}
