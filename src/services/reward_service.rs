use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use tracing::info;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::{
        reward::{
            redemption_entity::{RedemptionDbService, RedemptionStatus},
            reward_entity::{self, Reward, RewardDbService, RewardUpdate},
            reward_suggestion_entity::{RewardSuggestion, RewardSuggestionDbService},
        },
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
    models::{
        view::reward::{LikesView, RedemptionView, RewardView, SuggestionView},
        web::ListPage,
    },
};

/// Path id that marks a suggestion for a reward that does not exist yet.
pub const NEW_REWARD_ID: &str = "new";
const ANONYMOUS_USER: &str = "anonymous";

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RewardInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Cost must not be negative"))]
    pub cost: i64,
    pub icon: Option<String>,
    pub available: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Default)]
pub struct RewardUpdateInput {
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Cost must not be negative"))]
    pub cost: Option<i64>,
    pub icon: Option<String>,
    pub available: Option<bool>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RedeemInput {
    #[validate(length(min = 1, message = "user_id is required"))]
    pub user_id: String,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct SuggestionInput {
    pub user_id: Option<String>,
    #[validate(length(min = 1, message = "Suggestion is required"))]
    pub suggestion: String,
    pub suggested_value: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct NewRewardSuggestionInput {
    pub user_id: Option<String>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub suggested_value: Option<i64>,
    #[serde(default)]
    pub suggestion: String,
}

pub struct RewardService<'a> {
    ctx: &'a Ctx,
    reward_repository: RewardDbService<'a>,
    redemption_repository: RedemptionDbService<'a>,
    suggestion_repository: RewardSuggestionDbService<'a>,
    user_repository: LocalUserDbService<'a>,
}

impl<'a> RewardService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> RewardService<'a> {
        RewardService {
            ctx,
            reward_repository: RewardDbService { db, ctx },
            redemption_repository: RedemptionDbService { db, ctx },
            suggestion_repository: RewardSuggestionDbService { db, ctx },
            user_repository: LocalUserDbService { db, ctx },
        }
    }

    pub async fn list(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> CtxResult<ListPage<RewardView>> {
        let (items, total) = self
            .reward_repository
            .list_available(search, &pagination)
            .await?;
        Ok(ListPage {
            items: items.into_iter().map(RewardView::from).collect(),
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    pub async fn get(&self, reward_id: &str) -> CtxResult<RewardView> {
        let thing = self.reward_thing(reward_id)?;
        Ok(RewardView::from(self.reward_repository.get(&thing).await?))
    }

    pub async fn create(&self, input: RewardInput) -> CtxResult<RewardView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let name = LEN_OR_NONE(input.name).ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "Name is required".to_string(),
            })
        })?;
        let created = self
            .reward_repository
            .create(Reward {
                id: None,
                name,
                description: input.description,
                cost: input.cost,
                icon: input.icon,
                available: input.available.unwrap_or(true),
                category: input.category,
                likes: 0,
                r_created: None,
                r_updated: None,
            })
            .await?;
        Ok(RewardView::from(created))
    }

    pub async fn update(&self, reward_id: &str, input: RewardUpdateInput) -> CtxResult<RewardView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let thing = self.reward_thing(reward_id)?;
        let patch = RewardUpdate {
            name: input.name.and_then(LEN_OR_NONE),
            description: input.description,
            cost: input.cost,
            icon: input.icon,
            available: input.available,
            category: input.category,
        };
        let updated = self.reward_repository.update(&thing, patch).await?;
        Ok(RewardView::from(updated))
    }

    pub async fn delete(&self, reward_id: &str) -> CtxResult<()> {
        let thing = self.reward_thing(reward_id)?;
        self.reward_repository.delete(&thing).await?;
        Ok(())
    }

    /// Spends the reward cost from the user's points. Missing records are
    /// reported before availability, availability before the balance.
    pub async fn redeem(&self, reward_id: &str, input: RedeemInput) -> CtxResult<RedemptionView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let reward_thing = self.reward_thing(reward_id)?;
        let user_thing = get_str_thing(local_user_entity::TABLE_NAME, &input.user_id)
            .map_err(CtxError::from(self.ctx))?;

        self.user_repository.exists(&user_thing).await?;
        let reward = self.reward_repository.get(&reward_thing).await?;
        if !reward.available {
            return Err(self.ctx.to_ctx_error(AppError::RewardUnavailable));
        }

        let redemption = self
            .redemption_repository
            .redeem(&user_thing, &reward_thing)
            .await?;
        info!(
            req_id = %self.ctx.req_id(),
            user = %user_thing,
            reward = %reward_thing,
            cost = reward.cost,
            "->> reward redeemed"
        );
        Ok(RedemptionView::from(redemption))
    }

    pub async fn redemptions(
        &self,
        user_id: Option<String>,
        pagination: Pagination,
    ) -> CtxResult<ListPage<RedemptionView>> {
        let user = user_id
            .and_then(LEN_OR_NONE)
            .map(|id| get_str_thing(local_user_entity::TABLE_NAME, &id))
            .transpose()
            .map_err(CtxError::from(self.ctx))?;
        let (items, total) = self.redemption_repository.list(user, &pagination).await?;
        Ok(ListPage {
            items: items.into_iter().map(RedemptionView::from).collect(),
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    pub async fn like(&self, reward_id: &str) -> CtxResult<LikesView> {
        let thing = self.reward_thing(reward_id)?;
        let likes = self.reward_repository.like(&thing).await?;
        Ok(LikesView { likes })
    }

    /// Suggestion on an existing reward, or on a future one when `reward_id`
    /// is `new`.
    pub async fn suggest(&self, reward_id: &str, input: SuggestionInput) -> CtxResult<SuggestionView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let reward = match reward_id.trim() {
            NEW_REWARD_ID => None,
            id => {
                let thing = self.reward_thing(id)?;
                self.reward_repository.exists(&thing).await?;
                Some(thing)
            }
        };
        let user = self.suggesting_user(input.user_id).await?;
        let suggestion_text = LEN_OR_NONE(input.suggestion).ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "Suggestion is required".to_string(),
            })
        })?;

        let is_new_reward = reward.is_none();
        let created = self
            .suggestion_repository
            .create(RewardSuggestion {
                id: None,
                user,
                reward,
                suggestion_text,
                suggested_value: input.suggested_value,
                name: None,
                description: None,
                category: None,
                is_new_reward,
                status: RedemptionStatus::Pending,
                timestamp: None,
                r_created: None,
                r_updated: None,
            })
            .await?;
        info!(req_id = %self.ctx.req_id(), reward_id, "->> reward suggestion stored");
        Ok(SuggestionView::from(created))
    }

    pub async fn suggest_new(&self, input: NewRewardSuggestionInput) -> CtxResult<SuggestionView> {
        input.validate().map_err(CtxError::from(self.ctx))?;
        let name = LEN_OR_NONE(input.name).ok_or_else(|| {
            self.ctx.to_ctx_error(AppError::Generic {
                description: "Name is required".to_string(),
            })
        })?;
        let user = self.suggesting_user(input.user_id).await?;

        let created = self
            .suggestion_repository
            .create(RewardSuggestion {
                id: None,
                user,
                reward: None,
                suggestion_text: input.suggestion.trim().to_string(),
                suggested_value: input.suggested_value,
                name: Some(name),
                description: input.description,
                category: input.category,
                is_new_reward: true,
                status: RedemptionStatus::Pending,
                timestamp: None,
                r_created: None,
                r_updated: None,
            })
            .await?;
        info!(req_id = %self.ctx.req_id(), "->> new reward suggestion stored");
        Ok(SuggestionView::from(created))
    }

    pub async fn suggestions(
        &self,
        reward_id: Option<String>,
        pagination: Pagination,
    ) -> CtxResult<ListPage<SuggestionView>> {
        let reward = reward_id
            .and_then(LEN_OR_NONE)
            .map(|id| self.reward_thing(&id))
            .transpose()?;
        let (items, total) = self.suggestion_repository.list(reward, &pagination).await?;
        Ok(ListPage {
            items: items.into_iter().map(SuggestionView::from).collect(),
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    /// `None` for anonymous suggestions, 404 for an unknown user.
    async fn suggesting_user(&self, user_id: Option<String>) -> CtxResult<Option<Thing>> {
        let user_id = match user_id.and_then(LEN_OR_NONE) {
            None => return Ok(None),
            Some(id) if id == ANONYMOUS_USER => return Ok(None),
            Some(id) => id,
        };
        let thing = get_str_thing(local_user_entity::TABLE_NAME, &user_id)
            .map_err(CtxError::from(self.ctx))?;
        self.user_repository.exists(&thing).await?;
        Ok(Some(thing))
    }

    fn reward_thing(&self, reward_id: &str) -> CtxResult<Thing> {
        get_str_thing(reward_entity::TABLE_NAME, reward_id).map_err(CtxError::from(self.ctx))
    }
}
