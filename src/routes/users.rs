use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Router,
};

use crate::{
    middleware::{
        ctx::Ctx,
        error::{CtxError, CtxResult},
        mw_ctx::CtxState,
        utils::extractor_utils::{JsonOrFormValidated, ListParams, QueryParams},
    },
    models::{
        view::user::{AchievementView, UserView},
        web::{ApiResponse, ListPage},
    },
    services::user_service::{UserService, UserUpdateInput},
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/:id", get(get_user).delete(delete_user))
        .route("/api/users/:id/updateInfo", post(update_user))
        .route("/api/users/:id/achievements", get(get_achievements))
}

async fn list_users(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<ListParams>,
) -> CtxResult<ApiResponse<ListPage<UserView>>> {
    let pagination = params.pagination().map_err(CtxError::from(&ctx))?;
    let users = UserService::new(&state.db.client, &ctx)
        .list(params.search, pagination)
        .await?;
    Ok(ApiResponse::ok(users, "Users"))
}

async fn get_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<ApiResponse<UserView>> {
    let user = UserService::new(&state.db.client, &ctx).get(&user_id).await?;
    Ok(ApiResponse::ok(user, "User"))
}

async fn update_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
    JsonOrFormValidated(body): JsonOrFormValidated<UserUpdateInput>,
) -> CtxResult<ApiResponse<UserView>> {
    let user = UserService::new(&state.db.client, &ctx)
        .update(&user_id, body)
        .await?;
    Ok(ApiResponse::ok(user, "User updated"))
}

async fn delete_user(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<ApiResponse<Option<()>>> {
    UserService::new(&state.db.client, &ctx)
        .delete(&user_id)
        .await?;
    Ok(ApiResponse::ok(None, "User deleted"))
}

async fn get_achievements(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(user_id): Path<String>,
) -> CtxResult<ApiResponse<Vec<AchievementView>>> {
    let achievements = UserService::new(&state.db.client, &ctx)
        .achievements(&user_id)
        .await?;
    Ok(ApiResponse::ok(achievements, "Achievements"))
}
