use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::middleware;
use middleware::utils::db_utils::{
    get_entity, get_entity_page, record_exists, with_not_found_err, IdentIdName, ListFilter,
    Pagination,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "reward";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub likes: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<Datetime>,
}

#[derive(Debug, Default, Serialize)]
pub struct RewardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

pub struct RewardDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> RewardDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS name ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS cost ON TABLE {TABLE_NAME} TYPE int ASSERT $value >= 0;
    DEFINE FIELD IF NOT EXISTS icon ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS available ON TABLE {TABLE_NAME} TYPE bool DEFAULT true;
    DEFINE FIELD IF NOT EXISTS category ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS likes ON TABLE {TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS reward_available_idx ON TABLE {TABLE_NAME} COLUMNS available;
    DEFINE INDEX IF NOT EXISTS r_created_idx ON TABLE {TABLE_NAME} COLUMNS r_created;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn exists(&self, reward_id: &Thing) -> CtxResult<()> {
        record_exists(self.db, reward_id)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn get(&self, reward_id: &Thing) -> CtxResult<Reward> {
        let opt = get_entity::<Reward>(self.db, TABLE_NAME, &IdentIdName::Id(reward_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        with_not_found_err(opt, self.ctx, &reward_id.to_raw())
    }

    /// Lists only rewards that can currently be redeemed.
    pub async fn list_available(
        &self,
        search: Option<String>,
        pagination: &Pagination,
    ) -> CtxResult<(Vec<Reward>, u64)> {
        let filter = ListFilter::new()
            .eq("available", true)
            .search(&["name", "description"], search);
        get_entity_page(self.db, TABLE_NAME, filter, "r_created", pagination)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn create(&self, record: Reward) -> CtxResult<Reward> {
        let created: Option<Reward> = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        with_not_found_err(created, self.ctx, TABLE_NAME)
    }

    pub async fn update(&self, reward_id: &Thing, patch: RewardUpdate) -> CtxResult<Reward> {
        let mut res = self
            .db
            .query("UPDATE $id MERGE $patch RETURN AFTER;")
            .bind(("id", reward_id.clone()))
            .bind(("patch", patch))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let updated: Option<Reward> = res.take(0).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(updated, self.ctx, &reward_id.to_raw())
    }

    pub async fn delete(&self, reward_id: &Thing) -> CtxResult<Reward> {
        let mut res = self
            .db
            .query("DELETE $id RETURN BEFORE;")
            .bind(("id", reward_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let deleted: Option<Reward> = res.take(0).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(deleted, self.ctx, &reward_id.to_raw())
    }

    /// Atomic `likes += 1`, returns the new count.
    pub async fn like(&self, reward_id: &Thing) -> CtxResult<i64> {
        #[derive(Deserialize)]
        struct Likes {
            likes: i64,
        }
        let mut res = self
            .db
            .query("UPDATE $id SET likes += 1 RETURN likes;")
            .bind(("id", reward_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let likes: Option<Likes> = res.take(0).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(likes, self.ctx, &reward_id.to_raw()).map(|l| l.likes)
    }
}
