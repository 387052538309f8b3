use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::Thing;

use crate::database::client::Db;
use crate::middleware;
use middleware::utils::db_utils::{get_entity_list, ListFilter};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "scoring_factor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FactorType {
    Select,
    Number,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringFactor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub label: String,
    pub description: String,
    pub factor_type: FactorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FactorOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

pub struct ScoringFactorDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> ScoringFactorDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS label ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS factor_type ON TABLE {TABLE_NAME} TYPE string ASSERT $value INSIDE ['select','number','checkbox'];
    DEFINE FIELD IF NOT EXISTS options ON TABLE {TABLE_NAME} TYPE option<array<object>>;
    DEFINE FIELD IF NOT EXISTS options[*].label ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS options[*].value ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS min ON TABLE {TABLE_NAME} TYPE option<int>;
    DEFINE FIELD IF NOT EXISTS max ON TABLE {TABLE_NAME} TYPE option<int>;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn list(&self) -> CtxResult<Vec<ScoringFactor>> {
        get_entity_list(self.db, TABLE_NAME, ListFilter::new(), "id", None)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn upsert(&self, key: &str, record: ScoringFactor) -> CtxResult<()> {
        self.db
            .query("UPSERT $id CONTENT $content;")
            .bind(("id", Thing::from((TABLE_NAME, key))))
            .bind(("content", ScoringFactor { id: None, ..record }))
            .await
            .map_err(CtxError::from(self.ctx))?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }
}
