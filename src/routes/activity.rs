use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
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
        view::activity::ActivityView,
        web::{ApiResponse, ListPage},
    },
    services::activity_service::{ActivityInput, ActivityService, ActivityUpdateInput},
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/activity", get(list_activities).post(create_activity))
        .route("/api/activity/", get(list_activities).post(create_activity))
        .route("/api/activity/recent", get(recent_activities))
        .route(
            "/api/activity/:id",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
}

async fn list_activities(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    QueryParams(params): QueryParams<ListParams>,
) -> CtxResult<ApiResponse<ListPage<ActivityView>>> {
    let pagination = params.pagination().map_err(CtxError::from(&ctx))?;
    let activities = ActivityService::new(&state.db.client, &ctx)
        .list(params.user_id, params.search, pagination)
        .await?;
    Ok(ApiResponse::ok(activities, "Activities"))
}

async fn recent_activities(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<ApiResponse<Vec<ActivityView>>> {
    let activities = ActivityService::new(&state.db.client, &ctx).recent().await?;
    Ok(ApiResponse::ok(activities, "Recent activities"))
}

async fn create_activity(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    JsonOrFormValidated(body): JsonOrFormValidated<ActivityInput>,
) -> CtxResult<ApiResponse<ActivityView>> {
    let activity = ActivityService::new(&state.db.client, &ctx)
        .create(body)
        .await?;
    Ok(ApiResponse::ok(activity, "Activity created"))
}

async fn get_activity(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(activity_id): Path<String>,
) -> CtxResult<ApiResponse<ActivityView>> {
    let activity = ActivityService::new(&state.db.client, &ctx)
        .get(&activity_id)
        .await?;
    Ok(ApiResponse::ok(activity, "Activity"))
}

async fn update_activity(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(activity_id): Path<String>,
    JsonOrFormValidated(body): JsonOrFormValidated<ActivityUpdateInput>,
) -> CtxResult<ApiResponse<ActivityView>> {
    let activity = ActivityService::new(&state.db.client, &ctx)
        .update(&activity_id, body)
        .await?;
    Ok(ApiResponse::ok(activity, "Activity updated"))
}

async fn delete_activity(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    Path(activity_id): Path<String>,
) -> CtxResult<ApiResponse<Option<()>>> {
    ActivityService::new(&state.db.client, &ctx)
        .delete(&activity_id)
        .await?;
    Ok(ApiResponse::ok(None, "Activity deleted"))
}
