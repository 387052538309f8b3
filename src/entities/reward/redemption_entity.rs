use serde::{Deserialize, Serialize};
use strum::Display;
use surrealdb::sql::{Datetime, Thing};

use crate::database::client::Db;
use crate::database::surrdb_utils::{
    check_transaction_custom_error, THROW_NOT_ENOUGH_POINTS, THROW_REWARD_UNAVAILABLE,
};
use crate::entities::reward::reward_entity;
use crate::entities::user_auth::local_user_entity;
use crate::middleware;
use middleware::utils::db_utils::{get_entity_page, with_not_found_err, ListFilter, Pagination};
use middleware::{
    ctx::Ctx,
    error::{AppError, CtxError, CtxResult},
};

pub const TABLE_NAME: &str = "redemption";
const USER_TABLE: &str = local_user_entity::TABLE_NAME;
const REWARD_TABLE: &str = reward_entity::TABLE_NAME;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub user: Thing,
    pub reward: Thing,
    pub status: RedemptionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<Datetime>,
}

pub struct RedemptionDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> RedemptionDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS user ON TABLE {TABLE_NAME} TYPE record<{USER_TABLE}>;
    DEFINE FIELD IF NOT EXISTS reward ON TABLE {TABLE_NAME} TYPE record<{REWARD_TABLE}>;
    DEFINE FIELD IF NOT EXISTS status ON TABLE {TABLE_NAME} TYPE string DEFAULT 'pending' ASSERT $value INSIDE ['pending','approved','rejected'];
    DEFINE FIELD IF NOT EXISTS timestamp ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS redemption_user_idx ON TABLE {TABLE_NAME} COLUMNS user;
    DEFINE INDEX IF NOT EXISTS timestamp_idx ON TABLE {TABLE_NAME} COLUMNS timestamp;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    /// Charges the reward cost and records the redemption in one transaction.
    /// The conditional update keeps concurrent redemptions from spending
    /// the same points twice.
    pub async fn redeem(&self, user_id: &Thing, reward_id: &Thing) -> CtxResult<Redemption> {
        let qry = format!(
            "BEGIN TRANSACTION;
            LET $reward = (SELECT * FROM ONLY $reward_id);
            IF $reward.available != true {{
                THROW \"{THROW_REWARD_UNAVAILABLE}\";
            }};
            LET $cost = $reward.cost;
            LET $charged = UPDATE $user_id SET points -= $cost WHERE points >= $cost;
            IF array::len($charged) == 0 {{
                THROW \"{THROW_NOT_ENOUGH_POINTS}\";
            }};
            CREATE ONLY {TABLE_NAME} CONTENT {{
                user: $user_id,
                reward: $reward_id,
                status: 'pending',
                timestamp: time::now(),
            }};
            COMMIT TRANSACTION;"
        );
        let mut res = self
            .db
            .query(qry)
            .bind(("user_id", user_id.clone()))
            .bind(("reward_id", reward_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        check_transaction_custom_error(&mut res).map_err(CtxError::from(self.ctx))?;

        let created_idx = res.num_statements() - 1;
        let created: Option<Redemption> = res.take(created_idx).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(created, self.ctx, TABLE_NAME)
    }

    pub async fn list(
        &self,
        user: Option<Thing>,
        pagination: &Pagination,
    ) -> CtxResult<(Vec<Redemption>, u64)> {
        let filter = ListFilter::new().eq_opt("user", user);
        get_entity_page(self.db, TABLE_NAME, filter, "timestamp", pagination)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn first_by_user(&self, user: &Thing) -> CtxResult<Option<Redemption>> {
        let mut res = self
            .db
            .query(format!(
                "SELECT * FROM {TABLE_NAME} WHERE user=$user ORDER BY timestamp ASC LIMIT 1;"
            ))
            .bind(("user", user.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        res.take::<Option<Redemption>>(0)
            .map_err(CtxError::from(self.ctx))
    }
}
