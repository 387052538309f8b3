use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};
use serde::Deserialize;

use crate::{
    middleware::{
        ctx::Ctx,
        error::{CtxError, CtxResult},
        mw_ctx::CtxState,
        utils::{
            db_utils::Pagination,
            extractor_utils::{JsonOrFormValidated, ListParams, QueryParams},
        },
    },
    models::{
        view::reward::{LikesView, RedemptionView, RewardView, SuggestionView},
        web::{ApiResponse, ListPage},
    },
    services::reward_service::{
        NewRewardSuggestionInput, RedeemInput, RewardInput, RewardService, RewardUpdateInput,
        SuggestionInput,
    },
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/rewards", get(list_rewards).post(create_reward))
        .route("/api/rewards/", get(list_rewards).post(create_reward))
        .route("/api/rewards/redemptions", get(list_redemptions))
        .route("/api/rewards/suggestions", get(list_suggestions))
        .route("/api/rewards/suggest-new", post(suggest_new_reward))
        .route(
            "/api/rewards/:id",
            get(get_reward).put(update_reward).delete(delete_reward),
        )
        .route("/api/rewards/:id/redeem", post(redeem_reward))
        .route("/api/rewards/:id/like", post(like_reward))
        .route("/api/rewards/:id/suggest", post(suggest_reward))
}

#[derive(Debug, Deserialize)]
struct SuggestionParams {
    page: Option<u32>,
    per_page: Option<u32>,
    reward_id: Option<String>,
}

async fn list_rewards(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<ListParams>,
) -> CtxResult<ApiResponse<ListPage<RewardView>>> {
    let pagination = params.pagination().map_err(CtxError::from(&ctx))?;
    let rewards = RewardService::new(&state.db.client, &ctx)
        .list(params.search, pagination)
        .await?;
    Ok(ApiResponse::ok(rewards, "Rewards"))
}

async fn create_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(body): JsonOrFormValidated<RewardInput>,
) -> CtxResult<ApiResponse<RewardView>> {
    let reward = RewardService::new(&state.db.client, &ctx)
        .create(body)
        .await?;
    Ok(ApiResponse::ok(reward, "Reward created"))
}

async fn get_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reward_id): Path<String>,
) -> CtxResult<ApiResponse<RewardView>> {
    let reward = RewardService::new(&state.db.client, &ctx)
        .get(&reward_id)
        .await?;
    Ok(ApiResponse::ok(reward, "Reward"))
}

async fn update_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reward_id): Path<String>,
    JsonOrFormValidated(body): JsonOrFormValidated<RewardUpdateInput>,
) -> CtxResult<ApiResponse<RewardView>> {
    let reward = RewardService::new(&state.db.client, &ctx)
        .update(&reward_id, body)
        .await?;
    Ok(ApiResponse::ok(reward, "Reward updated"))
}

async fn delete_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reward_id): Path<String>,
) -> CtxResult<ApiResponse<Option<()>>> {
    RewardService::new(&state.db.client, &ctx)
        .delete(&reward_id)
        .await?;
    Ok(ApiResponse::ok(None, "Reward deleted"))
}

async fn redeem_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reward_id): Path<String>,
    JsonOrFormValidated(body): JsonOrFormValidated<RedeemInput>,
) -> CtxResult<ApiResponse<RedemptionView>> {
    let redemption = RewardService::new(&state.db.client, &ctx)
        .redeem(&reward_id, body)
        .await?;
    Ok(ApiResponse::ok(redemption, "Reward redeemed"))
}

async fn list_redemptions(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<ListParams>,
) -> CtxResult<ApiResponse<ListPage<RedemptionView>>> {
    let pagination = params.pagination().map_err(CtxError::from(&ctx))?;
    let redemptions = RewardService::new(&state.db.client, &ctx)
        .redemptions(params.user_id, pagination)
        .await?;
    Ok(ApiResponse::ok(redemptions, "Redemptions"))
}

async fn like_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reward_id): Path<String>,
) -> CtxResult<ApiResponse<LikesView>> {
    let likes = RewardService::new(&state.db.client, &ctx)
        .like(&reward_id)
        .await?;
    Ok(ApiResponse::ok(likes, "Reward liked"))
}

async fn suggest_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(reward_id): Path<String>,
    JsonOrFormValidated(body): JsonOrFormValidated<SuggestionInput>,
) -> CtxResult<ApiResponse<SuggestionView>> {
    let suggestion = RewardService::new(&state.db.client, &ctx)
        .suggest(&reward_id, body)
        .await?;
    Ok(ApiResponse::ok(suggestion, "Suggestion submitted"))
}

async fn suggest_new_reward(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(body): JsonOrFormValidated<NewRewardSuggestionInput>,
) -> CtxResult<ApiResponse<SuggestionView>> {
    let suggestion = RewardService::new(&state.db.client, &ctx)
        .suggest_new(body)
        .await?;
    Ok(ApiResponse::ok(suggestion, "Suggestion submitted"))
}

async fn list_suggestions(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<SuggestionParams>,
) -> CtxResult<ApiResponse<ListPage<SuggestionView>>> {
    let pagination =
        Pagination::new(params.page, params.per_page).map_err(CtxError::from(&ctx))?;
    let suggestions = RewardService::new(&state.db.client, &ctx)
        .suggestions(params.reward_id, pagination)
        .await?;
    Ok(ApiResponse::ok(suggestions, "Suggestions"))
}
