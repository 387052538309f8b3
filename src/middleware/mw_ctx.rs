use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use chrono::Duration;

use crate::config::AppConfig;
use crate::database::client::Database;
use crate::middleware::error::AppResult;
use crate::utils::jwt::JWT;
use crate::utils::request_cipher::RequestCipher;

pub const JWT_KEY: &str = "jwt";

pub struct CtxState {
    pub db: Database,
    pub jwt: JWT,
    pub cipher: RequestCipher,
}

impl Debug for CtxState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtxState")
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

pub fn create_ctx_state(db: Database, config: &AppConfig) -> AppResult<Arc<CtxState>> {
    let ctx_state = CtxState {
        db,
        jwt: JWT::new(config.jwt_secret.clone(), Duration::days(config.jwt_duration_days)),
        cipher: RequestCipher::new(config.rsa_key_bits)?,
    };
    Ok(Arc::new(ctx_state))
}
