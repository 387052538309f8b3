use serde::{Deserialize, Serialize};
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::database::surrdb_utils::check_transaction_custom_error;
use crate::entities::activity::activity_entity;
use crate::entities::scoring::scoring_criteria_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{get_entity_page, with_not_found_err, ListFilter, Pagination};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "score_entry";
const USER_TABLE: &str = local_user_entity::TABLE_NAME;
const ACTIVITY_TABLE: &str = activity_entity::TABLE_NAME;
const CRITERIA_TABLE: &str = scoring_criteria_entity::TABLE_NAME;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user: Thing,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<Thing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria: Option<Thing>,
    pub score: i64,
    /// Factor values exactly as submitted.
    pub factors: serde_json::Value,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<Datetime>,
}

pub struct ScoreEntryDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> ScoreEntryDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{USER_TABLE}>;
    DEFINE FIELD IF NOT EXISTS activity ON TABLE {TABLE_NAME} TYPE option<record<{ACTIVITY_TABLE}>>;
    DEFINE FIELD IF NOT EXISTS criteria ON TABLE {TABLE_NAME} TYPE option<record<{CRITERIA_TABLE}>>;
    DEFINE FIELD IF NOT EXISTS score ON TABLE {TABLE_NAME} TYPE int READONLY;
    DEFINE FIELD IF NOT EXISTS factors ON TABLE {TABLE_NAME} FLEXIBLE TYPE object DEFAULT {{}};
    DEFINE FIELD IF NOT EXISTS notes ON TABLE {TABLE_NAME} TYPE string DEFAULT '';
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE INDEX IF NOT EXISTS score_entry_user_idx ON TABLE {TABLE_NAME} COLUMNS user;
    DEFINE INDEX IF NOT EXISTS score_entry_activity_idx ON TABLE {TABLE_NAME} COLUMNS activity;
    DEFINE INDEX IF NOT EXISTS r_created_idx ON TABLE {TABLE_NAME} COLUMNS r_created;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    /// Stores the entry and credits its score to the user in one transaction.
    pub async fn create_and_credit(&self, record: ScoreEntry) -> CtxResult<ScoreEntry> {
        let qry = format!(
            "BEGIN TRANSACTION;
            UPDATE $user_id SET points += $score;
            CREATE ONLY {TABLE_NAME} CONTENT {{
                user: $user_id,
                activity: $activity_id,
                criteria: $criteria_id,
                score: $score,
                factors: $factors,
                notes: $notes,
            }};
            COMMIT TRANSACTION;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("user_id", record.user))
            .bind(("activity_id", record.activity))
            .bind(("criteria_id", record.criteria))
            .bind(("score", record.score))
            .bind(("factors", record.factors))
            .bind(("notes", record.notes))
            .await
            .map_err(CtxError::from(self.ctx))?;
        check_transaction_custom_error(&mut res).map_err(CtxError::from(self.ctx))?;

        let created_idx = res.num_statements() - 1;
        let created: Option<ScoreEntry> = res.take(created_idx).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(created, self.ctx, TABLE_NAME)
    }

    pub async fn list(
        &self,
        user: Option<Thing>,
        activity: Option<Thing>,
        pagination: &Pagination,
    ) -> CtxResult<(Vec<ScoreEntry>, u64)> {
        let filter = ListFilter::new()
            .eq_opt("user", user)
            .eq_opt("activity", activity);
        get_entity_page(self.db, TABLE_NAME, filter, "r_created", pagination)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    /// First entry of the user and the entry with the best score.
    pub async fn user_firsts(&self, user: &Thing) -> CtxResult<(Option<ScoreEntry>, Option<ScoreEntry>)> {
        let qry = format!(
            "SELECT * FROM {TABLE_NAME} WHERE user=$user ORDER BY r_created ASC LIMIT 1;
            SELECT * FROM {TABLE_NAME} WHERE user=$user ORDER BY score DESC, r_created ASC LIMIT 1;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("user", user.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let first: Option<ScoreEntry> = res.take(0).map_err(CtxError::from(self.ctx))?;
        let best: Option<ScoreEntry> = res.take(1).map_err(CtxError::from(self.ctx))?;
        Ok((first, best))
    }
}
