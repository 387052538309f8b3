use serde::{Deserialize, Serialize};
use surrealdb::sql::{Array, Datetime, Id, Thing, Value};

use crate::database::client::Db;
use crate::middleware;
use middleware::utils::db_utils::{get_entity_list, with_not_found_err, ListFilter};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "governance_metric";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceMetric {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub dimension: String,
    pub metric_name: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Datetime>,
}

/// One record per (dimension, metric_name); the pair is the record key.
pub fn metric_thing(dimension: &str, metric_name: &str) -> Thing {
    let key = Array::from(vec![Value::from(dimension), Value::from(metric_name)]);
    Thing::from((TABLE_NAME.to_string(), Id::Array(key)))
}

pub struct GovernanceMetricDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> GovernanceMetricDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS dimension ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS metric_name ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS value ON TABLE {TABLE_NAME} TYPE float;
    DEFINE FIELD IF NOT EXISTS timestamp ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS dimension_metric_idx ON TABLE {TABLE_NAME} COLUMNS dimension, metric_name UNIQUE;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn list_by_dimension(&self, dimension: &str) -> CtxResult<Vec<GovernanceMetric>> {
        let filter = ListFilter::new().eq("dimension", dimension);
        get_entity_list(self.db, TABLE_NAME, filter, "metric_name ASC", None)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    /// Updates the value in place when the pair already exists.
    pub async fn upsert(
        &self,
        dimension: String,
        metric_name: String,
        value: f64,
    ) -> CtxResult<GovernanceMetric> {
        let mut res = self
            .db
            .query("UPSERT $id SET dimension=$dimension, metric_name=$metric_name, value=$value RETURN AFTER;")
            .bind(("id", metric_thing(&dimension, &metric_name)))
            .bind(("dimension", dimension))
            .bind(("metric_name", metric_name))
            .bind(("value", value))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let metric: Option<GovernanceMetric> = res.take(0).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(metric, self.ctx, TABLE_NAME)
    }
}
