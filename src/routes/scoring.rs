use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::{
    middleware::{
        ctx::Ctx,
        error::CtxResult,
        mw_ctx::CtxState,
        utils::extractor_utils::{JsonOrFormValidated, QueryParams},
    },
    models::{
        view::scoring::{
            CalculationView, GovernanceMetricView, GovernanceMetricsView, ScoreEntryView,
            ScoringCriteriaView, ScoringFactorView,
        },
        web::{ApiResponse, ListPage},
    },
    services::scoring_service::{
        CalculateInput, GovernanceMetricInput, ScoreEntryParams, ScoringService,
    },
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/scoring/criteria", get(get_criteria))
        .route("/api/scoring/factors", get(get_factors))
        .route("/api/scoring/calculate", post(calculate_score))
        .route("/api/scoring/entries", get(list_entries))
        .route(
            "/api/scoring/governance-metrics",
            get(get_governance_metrics).post(upsert_governance_metric),
        )
}

#[derive(Debug, Deserialize)]
struct DimensionParams {
    dimension: Option<String>,
}

async fn get_criteria(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<ApiResponse<Vec<ScoringCriteriaView>>> {
    let criteria = ScoringService::new(&state.db.client, &ctx).criteria().await?;
    Ok(ApiResponse::ok(criteria, "Scoring criteria"))
}

async fn get_factors(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<ApiResponse<Vec<ScoringFactorView>>> {
    let factors = ScoringService::new(&state.db.client, &ctx).factors().await?;
    Ok(ApiResponse::ok(factors, "Scoring factors"))
}

async fn calculate_score(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(body): JsonOrFormValidated<CalculateInput>,
) -> CtxResult<ApiResponse<CalculationView>> {
    let result = ScoringService::new(&state.db.client, &ctx)
        .calculate(body)
        .await?;
    Ok(ApiResponse::ok(result, "Score calculated"))
}

async fn list_entries(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<ScoreEntryParams>,
) -> CtxResult<ApiResponse<ListPage<ScoreEntryView>>> {
    let entries = ScoringService::new(&state.db.client, &ctx)
        .entries(params)
        .await?;
    Ok(ApiResponse::ok(entries, "Score entries"))
}

async fn get_governance_metrics(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<DimensionParams>,
) -> CtxResult<ApiResponse<GovernanceMetricsView>> {
    let metrics = ScoringService::new(&state.db.client, &ctx)
        .governance_metrics(params.dimension)
        .await?;
    Ok(ApiResponse::ok(metrics, "Governance metrics"))
}

async fn upsert_governance_metric(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(body): JsonOrFormValidated<GovernanceMetricInput>,
) -> CtxResult<ApiResponse<GovernanceMetricView>> {
    let metric = ScoringService::new(&state.db.client, &ctx)
        .upsert_metric(body)
        .await?;
    Ok(ApiResponse::ok(metric, "Governance metric saved"))
}
