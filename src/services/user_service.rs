use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail};

use crate::{
    database::client::Db,
    entities::{
        activity::activity_entity::ActivityDbService,
        reward::{redemption_entity::RedemptionDbService, reward_entity::RewardDbService},
        scoring::score_entry_entity::ScoreEntryDbService,
        user_auth::local_user_entity::{self, LocalUserDbService, LocalUserUpdate},
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
        view::{
            to_utc,
            user::{AchievementView, UserView},
        },
        web::ListPage,
    },
    utils::hash::hash_password,
};

/// Best score entry at or above this earns the high score achievement.
pub const HIGH_SCORE_THRESHOLD: i64 = 130;

#[derive(Debug, Deserialize, Serialize, Validate, Default)]
pub struct UserUpdateInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
}

pub struct UserService<'a> {
    ctx: &'a Ctx,
    user_repository: LocalUserDbService<'a>,
    activity_repository: ActivityDbService<'a>,
    score_repository: ScoreEntryDbService<'a>,
    redemption_repository: RedemptionDbService<'a>,
    reward_repository: RewardDbService<'a>,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> UserService<'a> {
        UserService {
            ctx,
            user_repository: LocalUserDbService { db, ctx },
            activity_repository: ActivityDbService { db, ctx },
            score_repository: ScoreEntryDbService { db, ctx },
            redemption_repository: RedemptionDbService { db, ctx },
            reward_repository: RewardDbService { db, ctx },
        }
    }

    pub async fn list(
        &self,
        search: Option<String>,
        pagination: Pagination,
    ) -> CtxResult<ListPage<UserView>> {
        let (users, total) = self.user_repository.list(search, &pagination).await?;
        let ids = users.iter().filter_map(|u| u.id.clone()).collect();
        let mut counts = self.activity_repository.task_counts(ids).await?;
        let items = users
            .into_iter()
            .map(|user| {
                let c = user
                    .id
                    .as_ref()
                    .and_then(|id| counts.remove(&id.to_raw()))
                    .unwrap_or_default();
                UserView::new(user, c)
            })
            .collect();
        Ok(ListPage {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    pub async fn get(&self, user_id: &str) -> CtxResult<UserView> {
        let thing = self.user_thing(user_id)?;
        let user = self.user_repository.get(&thing).await?;
        let mut counts = self.activity_repository.task_counts(vec![thing.clone()]).await?;
        Ok(UserView::new(
            user,
            counts.remove(&thing.to_raw()).unwrap_or_default(),
        ))
    }

    /// Blank fields are left untouched. The email stays unique across users.
    pub async fn update(&self, user_id: &str, input: UserUpdateInput) -> CtxResult<UserView> {
        let thing = self.user_thing(user_id)?;
        self.user_repository.exists(&thing).await?;

        let email = input
            .email
            .and_then(LEN_OR_NONE)
            .map(|e| e.to_lowercase());
        if let Some(ref email) = email {
            if !email.validate_email() {
                return Err(self.ctx.to_ctx_error(AppError::Generic {
                    description: "Invalid email".to_string(),
                }));
            }
            if let Some(owner) = self.user_repository.get_by_email(email).await? {
                if owner.id.as_ref() != Some(&thing) {
                    return Err(self.ctx.to_ctx_error(AppError::EmailAlreadyUsed));
                }
            }
        }

        let password = match input.password.and_then(LEN_OR_NONE) {
            Some(pwd) if pwd.len() < 6 => {
                return Err(self.ctx.to_ctx_error(AppError::Generic {
                    description: "Password min 6 characters".to_string(),
                }))
            }
            Some(pwd) => Some(hash_password(&pwd).map_err(CtxError::from(self.ctx))?),
            None => None,
        };

        let patch = LocalUserUpdate {
            name: input.name.and_then(LEN_OR_NONE),
            email,
            password,
            department: input.department.and_then(LEN_OR_NONE),
            position: input.position.and_then(LEN_OR_NONE),
            phone: input.phone.and_then(LEN_OR_NONE),
        };
        self.user_repository.update(&thing, patch).await?;
        self.get(user_id).await
    }

    pub async fn delete(&self, user_id: &str) -> CtxResult<()> {
        let thing = self.user_thing(user_id)?;
        self.user_repository.delete(&thing).await?;
        Ok(())
    }

    /// Achievements derived from the user's score entries and redemptions.
    pub async fn achievements(&self, user_id: &str) -> CtxResult<Vec<AchievementView>> {
        let thing = self.user_thing(user_id)?;
        self.user_repository.exists(&thing).await?;

        let mut achievements = vec![];
        let (first, best) = self.score_repository.user_firsts(&thing).await?;
        if let Some(first) = first {
            achievements.push(AchievementView {
                id: "first_contribution".to_string(),
                name: "First contribution".to_string(),
                date: to_utc(first.r_created),
                points: first.score,
            });
        }
        if let Some(best) = best.filter(|b| b.score >= HIGH_SCORE_THRESHOLD) {
            achievements.push(AchievementView {
                id: "high_score".to_string(),
                name: "High score".to_string(),
                date: to_utc(best.r_created),
                points: best.score,
            });
        }
        if let Some(redemption) = self.redemption_repository.first_by_user(&thing).await? {
            let cost = match self.reward_repository.get(&redemption.reward).await {
                Ok(reward) => reward.cost,
                Err(CtxError {
                    error: AppError::EntityFailIdNotFound { .. },
                    ..
                }) => 0,
                Err(err) => return Err(err),
            };
            achievements.push(AchievementView {
                id: "first_redemption".to_string(),
                name: "First redemption".to_string(),
                date: to_utc(redemption.timestamp),
                points: cost,
            });
        }
        Ok(achievements)
    }

    fn user_thing(&self, user_id: &str) -> CtxResult<surrealdb::sql::Thing> {
        get_str_thing(local_user_entity::TABLE_NAME, user_id).map_err(CtxError::from(self.ctx))
    }
}
