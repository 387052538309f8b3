use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::{
        activity::activity_entity::{self, Activity, ActivityDbService, ActivityStatus, ActivityUpdate},
        user_auth::local_user_entity::{self, LocalUserDbService},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxError, CtxResult},
        utils::{
            db_utils::Pagination,
            string_utils::{get_str_thing, LEN_OR_NONE},
        },
    },
    models::{view::activity::ActivityView, web::ListPage},
};

pub const RECENT_LIMIT: u32 = 5;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct ActivityInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Points must not be negative"))]
    pub points: Option<i64>,
    pub user_id: Option<String>,
    pub status: Option<ActivityStatus>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Default)]
pub struct ActivityUpdateInput {
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Points must not be negative"))]
    pub points: Option<i64>,
    pub user_id: Option<String>,
    pub status: Option<ActivityStatus>,
}

pub struct ActivityService<'a> {
    ctx: &'a Ctx,
    activity_repository: ActivityDbService<'a>,
    user_repository: LocalUserDbService<'a>,
}

impl<'a> ActivityService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> ActivityService<'a> {
        ActivityService {
            ctx,
            activity_repository: ActivityDbService { db, ctx },
            user_repository: LocalUserDbService { db, ctx },
        }
    }

    pub async fn list(
        &self,
        user_id: Option<String>,
        search: Option<String>,
        pagination: Pagination,
    ) -> CtxResult<ListPage<ActivityView>> {
        let user = user_id
            .and_then(LEN_OR_NONE)
            .map(|id| get_str_thing(local_user_entity::TABLE_NAME, &id))
            .transpose()
            .map_err(CtxError::from(self.ctx))?;
        let (items, total) = self
            .activity_repository
            .list(user, search, &pagination)
            .await?;
        Ok(ListPage {
            items: items.into_iter().map(ActivityView::from).collect(),
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    pub async fn recent(&self) -> CtxResult<Vec<ActivityView>> {
        let items = self.activity_repository.recent(RECENT_LIMIT).await?;
        Ok(items.into_iter().map(ActivityView::from).collect())
    }

    pub async fn create(&self, input: ActivityInput) -> CtxResult<ActivityView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let title = LEN_OR_NONE(input.title).ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "Title is required".to_string(),
            })
        })?;
        let user = self.owner(input.user_id).await?;

        let created = self
            .activity_repository
            .create(Activity {
                id: None,
                title,
                description: input.description,
                points: input.points.unwrap_or(0),
                user,
                status: input.status.unwrap_or(ActivityStatus::Pending),
                completed_at: None,
                r_created: None,
                r_updated: None,
            })
            .await?;
        info!(req_id = %self.ctx.req_id(), title = %created.title, "->> activity created");
        Ok(ActivityView::from(created))
    }

    pub async fn get(&self, activity_id: &str) -> CtxResult<ActivityView> {
        let thing = self.activity_thing(activity_id)?;
        Ok(ActivityView::from(self.activity_repository.get(&thing).await?))
    }

    pub async fn update(&self, activity_id: &str, input: ActivityUpdateInput) -> CtxResult<ActivityView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let thing = self.activity_thing(activity_id)?;
        self.activity_repository.exists(&thing).await?;
        let user = self.owner(input.user_id).await?;

        let patch = ActivityUpdate {
            title: input.title.and_then(LEN_OR_NONE),
            description: input.description,
            points: input.points,
            user,
            status: input.status,
        };
        let updated = self.activity_repository.update(&thing, patch).await?;
        Ok(ActivityView::from(updated))
    }

    pub async fn delete(&self, activity_id: &str) -> CtxResult<()> {
        let thing = self.activity_thing(activity_id)?;
        self.activity_repository.delete(&thing).await?;
        Ok(())
    }

    /// Record id of an existing user, 404 when the user is unknown.
    async fn owner(&self, user_id: Option<String>) -> CtxResult<Option<surrealdb::sql::Thing>> {
        let Some(user_id) = user_id.and_then(LEN_OR_NONE) else {
            return Ok(None);
        };
        let user = get_str_thing(local_user_entity::TABLE_NAME, &user_id)
            .map_err(CtxError::from(self.ctx))?;
        self.user_repository.exists(&user).await?;
        Ok(Some(user))
    }

    fn activity_thing(&self, activity_id: &str) -> CtxResult<surrealdb::sql::Thing> {
        get_str_thing(activity_entity::TABLE_NAME, activity_id).map_err(CtxError::from(self.ctx))
    }
}
