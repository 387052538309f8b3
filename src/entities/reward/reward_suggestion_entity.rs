use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::entities::reward::{redemption_entity::RedemptionStatus, reward_entity};
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{get_entity_page, with_not_found_err, ListFilter, Pagination};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "reward_suggestion";
const USER_TABLE: &str = local_user_entity::TABLE_NAME;
const REWARD_TABLE: &str = reward_entity::TABLE_NAME;

/// Review state, same values as a redemption.
pub type SuggestionStatus = RedemptionStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardSuggestion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward: Option<Thing>,
    pub suggestion_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_value: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub is_new_reward: bool,
    pub status: SuggestionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<Datetime>,
}

pub struct RewardSuggestionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> RewardSuggestionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE option<record<{USER_TABLE}>>;
    DEFINE FIELD IF NOT EXISTS reward ON TABLE {TABLE_NAME} TYPE option<record<{REWARD_TABLE}>>;
    DEFINE FIELD IF NOT EXISTS suggestion_text ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS suggested_value ON TABLE {TABLE_NAME} TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS name ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS category ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS is_new_reward ON TABLE {TABLE_NAME} TYPE bool DEFAULT false;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string DEFAULT 'pending' ASSERT $value INSIDE ['pending','approved','rejected'];
    DEFINE FIELD IF NOT EXISTS timestamp ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS suggestion_reward_idx ON TABLE {TABLE_NAME} COLUMNS reward;
    DEFINE INDEX IF NOT EXISTS timestamp_idx ON TABLE {TABLE_NAME} COLUMNS timestamp;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn create(&self, record: RewardSuggestion) -> CtxResult<RewardSuggestion> {
        let created: Option<RewardSuggestion> = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        with_not_found_err(created, self.ctx, TABLE_NAME)
    }

    pub async fn list(
        &self,
        reward: Option<Thing>,
        pagination: &Pagination,
    ) -> CtxResult<(Vec<RewardSuggestion>, u64)> {
        let filter = ListFilter::new().eq_opt("reward", reward);
        get_entity_page(self.db, TABLE_NAME, filter, "timestamp", pagination)
            .await
            .map_err(CtxError::from(self.ctx))
    }
}
