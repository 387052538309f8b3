use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware;
use middleware::utils::db_utils::{get_entity_list, record_exists, ListFilter};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "scoring_criteria";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub category: String,
    pub description: String,
    pub base_points: i64,
    pub weight: f64,
}

pub struct ScoringCriteriaDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> ScoringCriteriaDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS category ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS base_points ON TABLE {TABLE_NAME} TYPE int;
    DEFINE FIELD IF NOT EXISTS weight ON TABLE {TABLE_NAME} TYPE float;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn exists(&self, criteria_id: &Thing) -> CtxResult<()> {
        record_exists(self.db, criteria_id)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn list(&self) -> CtxResult<Vec<ScoringCriteria>> {
        get_entity_list(self.db, TABLE_NAME, ListFilter::new(), "id", None)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    /// Creates or overwrites the record with the given key.
    pub async fn upsert(&self, key: &str, record: ScoringCriteria) -> CtxResult<()> {
        self.db
            .query("UPSERT $id CONTENT $content;")
            .bind(("id", Thing::from((TABLE_NAME, key))))
            .bind(("content", ScoringCriteria { id: None, ..record }))
            .await
            .map_err(CtxError::from(self.ctx))?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}
