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

pub const TABLE_NAME: &str = "local_user";
const EMAIL_INDEX: &str = "local_user_email_idx";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Thing>,
    pub name: String,
    pub email: String,
    /// argon2 PHC string
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub join_date: Option<Datetime>,
    pub points: i64,
    pub level: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_created: Option<Datetime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_updated: Option<Datetime>,
}

impl LocalUser {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        LocalUser {
            id: None,
            name,
            email: email.trim().to_lowercase(),
            password: password_hash,
            department: None,
            position: None,
            phone: None,
            join_date: None,
            points: 0,
            level: 1,
            r_created: None,
            r_updated: None,
        }
    }
}

/// Fields changed by a partial update, `None` leaves the stored value.
#[derive(Debug, Default, Serialize)]
pub struct LocalUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Unique email index violations lost to a concurrent writer.
fn email_conflict(err: surrealdb::Error) -> AppError {
    if err.to_string().contains(EMAIL_INDEX) {
        AppError::EmailAlreadyUsed
    } else {
        err.into()
    }
}

pub struct LocalUserDbService<'a> {
    pub db: &'a Db,
    pub ctx: &'a Ctx,
}

impl<'a> LocalUserDbService<'a> {
    pub async fn mutate_db(&self) -> Result<(), AppError> {
        let sql = format!("
    DEFINE TABLE IF NOT EXISTS {TABLE_NAME} SCHEMAFULL;
    DEFINE FIELD IF NOT EXISTS name ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS email ON TABLE {TABLE_NAME} TYPE string VALUE string::lowercase($value) ASSERT string::is::email($value);
    DEFINE FIELD IF NOT EXISTS password ON TABLE {TABLE_NAME} TYPE string;
    DEFINE FIELD IF NOT EXISTS department ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS position ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS phone ON TABLE {TABLE_NAME} TYPE option<string>;
    DEFINE FIELD IF NOT EXISTS join_date ON TABLE {TABLE_NAME} TYPE datetime DEFAULT time::now();
    DEFINE FIELD IF NOT EXISTS points ON TABLE {TABLE_NAME} TYPE int DEFAULT 0;
    DEFINE FIELD IF NOT EXISTS level ON TABLE {TABLE_NAME} TYPE int DEFAULT 1;
    DEFINE FIELD IF NOT EXISTS r_created ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE $before OR time::now();
    DEFINE FIELD IF NOT EXISTS r_updated ON TABLE {TABLE_NAME} TYPE option<datetime> DEFAULT time::now() VALUE time::now();
    DEFINE INDEX IF NOT EXISTS {EMAIL_INDEX} ON TABLE {TABLE_NAME} COLUMNS email UNIQUE;
    DEFINE INDEX IF NOT EXISTS r_created_idx ON TABLE {TABLE_NAME} COLUMNS r_created;
    ");
        let mutation = self.db.query(sql).await?;
        mutation.check()?;
        Ok(())
    }

    pub async fn exists(&self, user_id: &Thing) -> CtxResult<()> {
        record_exists(self.db, user_id)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn get(&self, user_id: &Thing) -> CtxResult<LocalUser> {
        let opt = get_entity::<LocalUser>(self.db, TABLE_NAME, &IdentIdName::Id(user_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        with_not_found_err(opt, self.ctx, &user_id.to_raw())
    }

    pub async fn get_by_email(&self, email: &str) -> CtxResult<Option<LocalUser>> {
        get_entity::<LocalUser>(
            self.db,
            TABLE_NAME,
            &IdentIdName::column("email", email.trim().to_lowercase()),
        )
        .await
        .map_err(CtxError::from(self.ctx))
    }

    pub async fn list(
        &self,
        search: Option<String>,
        pagination: &Pagination,
    ) -> CtxResult<(Vec<LocalUser>, u64)> {
        let filter = ListFilter::new().search(&["name", "email"], search);
        get_entity_page(self.db, TABLE_NAME, filter, "r_created", pagination)
            .await
            .map_err(CtxError::from(self.ctx))
    }

    pub async fn create(&self, record: LocalUser) -> CtxResult<LocalUser> {
        let created: Option<LocalUser> = self
            .db
            .create(TABLE_NAME)
            .content(record)
            .await
            .map_err(|err| self.ctx.to_ctx_error(email_conflict(err)))?;
        with_not_found_err(created, self.ctx, TABLE_NAME)
    }

    pub async fn update(&self, user_id: &Thing, patch: LocalUserUpdate) -> CtxResult<LocalUser> {
        let mut res = self
            .db
            .query("UPDATE $id MERGE $patch RETURN AFTER;")
            .bind(("id", user_id.clone()))
            .bind(("patch", patch))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let updated: Option<LocalUser> = res
            .take(0)
            .map_err(|err| self.ctx.to_ctx_error(email_conflict(err)))?;
        with_not_found_err(updated, self.ctx, &user_id.to_raw())
    }

    pub async fn delete(&self, user_id: &Thing) -> CtxResult<LocalUser> {
        let mut res = self
            .db
            .query("DELETE $id RETURN BEFORE;")
            .bind(("id", user_id.clone()))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let deleted: Option<LocalUser> = res.take(0).map_err(CtxError::from(self.ctx))?;
        with_not_found_err(deleted, self.ctx, &user_id.to_raw())
    }

    pub async fn users_len(&self) -> CtxResult<u64> {
        #[derive(Deserialize)]
        struct Count {
            count: u64,
        }
        let mut res = self
            .db
            .query(format!("SELECT count() FROM {TABLE_NAME} GROUP ALL;"))
            .await
            .map_err(CtxError::from(self.ctx))?;
        let count: Option<Count> = res.take(0).map_err(CtxError::from(self.ctx))?;
        Ok(count.map(|c| c.count).unwrap_or(0))
    }
}
