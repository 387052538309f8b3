use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{
    get_entity, get_entity_list, get_entity_page, record_exists, with_not_found_err, IdentIdName,
    ListFilter, Pagination,
};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "activity";
const USER_TABLE: &str = local_user_entity::TABLE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActivityStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Thing>,
    pub status: ActivityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<Datetime>,
}

#[derive(Debug, Default, Serialize)]
pub struct ActivityUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActivityStatus>,
}

/// Completed and not completed activity counts of one user.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskCounts {
    pub completed: u64,
    pub pending: u64,
}

pub struct ActivityDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> ActivityDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS title ON TABLE {TABLE_NAME} TYPE string ASSERT string::len(string::trim($value)) > 0;
    DEFINE FIELD IF NOT EXISTS description ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS points ON TABLE {TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE option<record<{USER_TABLE}>>;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string DEFAULT 'pending' ASSERT $value INSIDE ['pending','in_progress','completed','cancelled'];
    DEFINE FIELD IF NOT EXISTS completed_at ON TABLE {TABLE_NAME} TYPE option<datetime>;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS activity_user_idx ON TABLE {TABLE_NAME} COLUMNS user;
    DEFINE INDEX IF NOT EXISTS r_created_idx ON TABLE {TABLE_NAME} COLUMNS r_created;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn exists(&self, activity_id: &Thing) -> CtxResult<()> {
        record_exists(self.db, activity_id)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn get(&self, activity_id: &Thing) -> CtxResult<Activity> {
        let opt = get_entity::<Activity>(self.db, TABLE_NAME, &IdentIdName::Id(activity_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        with_not_found_err(opt, self.ctx, &activity_id.to_raw())
    }

    pub async fn list(
        &self,
        user: Option<Thing>,
        search: Option<String>,
        pagination: &Pagination,
    ) -> CtxResult<(Vec<Activity>, u64)> {
        let filter = ListFilter::new()
            .eq_opt("user", user)
            .search(&["title", "description"], search);
        get_entity_page(self.db, TABLE_NAME, filter, "r_created", pagination)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn recent(&self, limit: u32) -> CtxResult<Vec<Activity>> {
        get_entity_list(self.db, TABLE_NAME, ListFilter::new(), "r_created DESC", Some(limit))
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn create(&self, record: Activity) -> CtxResult<Activity> {
        let created: Option<Activity> = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(CtxError::from(self.ctx))?;
        let created = with_not_found_err(created, self.ctx, TABLE_NAME)?;
        match (created.status, created.id.as_ref()) {
            (ActivityStatus::Completed, Some(id)) => {
                self.stamp_completed(id).await?;
                self.get(id).await
            }
            _ => Ok(created),
        }
    }

    /// Moving into `completed` stamps `completed_at` unless it is already set.
    pub async fn update(&self, activity_id: &Thing, patch: ActivityUpdate) -> CtxResult<Activity> {
        let mut res = self
            .db
            .query("UPDATE $id MERGE $patch RETURN AFTER;")
            .bind(("id", activity_id.clone()))
            .bind(("patch", patch))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let updated: Option<Activity> = res.take(0).map_err(CtxError::from(self.ctx))?;
        let updated = with_not_found_err(updated, self.ctx, &activity_id.to_raw())?;
        match updated.status {
            ActivityStatus::Completed if updated.completed_at.is_none() => {
                self.stamp_completed(activity_id).await?;
                self.get(activity_id).await
            }
            _ => Ok(updated),
        }
    }

    async fn stamp_completed(&self, activity_id: &Thing) -> CtxResult<()> {
        self.db
            .query("UPDATE $id SET completed_at = time::now() WHERE status = 'completed' AND completed_at IS NONE;")
            .bind(("id", activity_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?
            .check()
            .map_err(CtxError::from(self.ctx))?;
        Ok(())
    }

    pub async fn delete(&self, activity_id: &Thing) -> CtxResult<Activity> {
        let mut res = self
            .db
            .query("DELETE $id RETURN BEFORE;")
            .bind(("id", activity_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let deleted: Option<Activity> = res.take(0).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(deleted, self.ctx, &activity_id.to_raw())
    }

    /// Task counters per user id (`local_user:key` raw string).
    pub async fn task_counts(&self, users: Vec<Thing>) -> CtxResult<HashMap<String, TaskCounts>> {
        #[derive(Deserialize)]
        struct Row {
            user: Thing,
            status: ActivityStatus,
            total: u64,
        }
        if users.is_empty() {
            return Ok(HashMap::new());
        }
        let qry = format!(
            "SELECT user, status, count() AS total FROM {TABLE_NAME} WHERE user INSIDE $users GROUP BY user, status;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("users", users))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let rows: Vec<Row> = res.take(0).map_err(CtxError::from(self.ctx))?;
        Ok(rows.into_iter().fold(HashMap::new(), |mut acc, row| {
            let counts: &mut TaskCounts = acc.entry(row.user.to_raw()).or_default();
            match row.status {
                ActivityStatus::Completed => counts.completed += row.total,
                _ => counts.pending += row.total,
            }
            acc
        }))
    }
}
