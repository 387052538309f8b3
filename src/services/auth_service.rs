use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::{
    database::client::Db,
    entities::{
        activity::activity_entity::ActivityDbService,
        user_auth::local_user_entity::{self, LocalUser, LocalUserDbService},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxError, CtxResult},
        utils::string_utils::{get_string_thing, thing_key, LEN_OR_NONE},
    },
    models::view::user::{LoggedUserView, SessionView, UserView},
    utils::{
        hash::{hash_password, verify_password},
        jwt::JWT,
    },
};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthRegisterInput {
    #[validate(email(message = "Invalid email"))]
    pub email: String,
    #[validate(length(min = 6, message = "Min 6 characters"))]
    pub password: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct AuthLoginInput {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

pub struct AuthService<'a> {
    ctx: &'a Ctx,
    jwt: &'a JWT,
    user_repository: LocalUserDbService<'a>,
    activity_repository: ActivityDbService<'a>,
}

impl<'a> AuthService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx, jwt: &'a JWT) -> AuthService<'a> {
        AuthService {
            ctx,
            jwt,
            user_repository: LocalUserDbService { db, ctx },
            activity_repository: ActivityDbService { db, ctx },
        }
    }

    pub async fn register(&self, input: AuthRegisterInput) -> CtxResult<LoggedUserView> {
        input.validate().map_err(CtxError::from(self.ctx))?;

        let email = input.email.trim().to_lowercase();
        if self.user_repository.get_by_email(&email).await?.is_some() {
            return Err(self.ctx.to_ctx_error(AppError::EmailAlreadyUsed));
        }

        let name = input
            .name
            .and_then(LEN_OR_NONE)
            .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
        let hash = hash_password(&input.password).map_err(CtxError::from(self.ctx))?;

        let user = self
            .user_repository
            .create(LocalUser::new(name, email, hash))
            .await?;
        info!(req_id = %self.ctx.req_id(), email = %user.email, "->> user registered");
        Ok(Self::logged_view(&user, None))
    }

    /// Unknown emails and wrong passwords fail the same way.
    pub async fn login(&self, input: AuthLoginInput) -> CtxResult<LoggedUserView> {
        input.validate().map_err(CtxError::from(self.ctx))?;

        let user = self
            .user_repository
            .get_by_email(&input.email)
            .await?
            .ok_or_else(|| self.ctx.to_ctx_error(AppError::AuthenticationFail))?;

        if !verify_password(&user.password, &input.password) {
            return Err(self.ctx.to_ctx_error(AppError::AuthenticationFail));
        }

        let user_id = user
            .id
            .as_ref()
            .map(thing_key)
            .ok_or_else(|| self.ctx.to_ctx_error(AppError::AuthenticationFail))?;
        let token = self
            .jwt
            .create_by_login(&user_id)
            .map_err(CtxError::from(self.ctx))?;
        Ok(Self::logged_view(&user, Some(token)))
    }

    /// Session of the `jwt` cookie. A missing or stale cookie, or a token of
    /// a deleted user, is reported as unauthenticated.
    pub async fn session(&self) -> CtxResult<SessionView> {
        let Ok(user_id) = self.ctx.user_id() else {
            return Ok(SessionView {
                authenticated: false,
                user: None,
            });
        };
        let thing = get_string_thing(local_user_entity::TABLE_NAME, user_id)
            .map_err(CtxError::from(self.ctx))?;
        let user = match self.user_repository.get(&thing).await {
            Ok(user) => user,
            Err(CtxError {
                error: AppError::EntityFailIdNotFound { .. },
                ..
            }) => {
                return Ok(SessionView {
                    authenticated: false,
                    user: None,
                })
            }
            Err(err) => return Err(err),
        };
        let mut counts = self.activity_repository.task_counts(vec![thing.clone()]).await?;
        let counts = counts.remove(&thing.to_raw()).unwrap_or_default();
        Ok(SessionView {
            authenticated: true,
            user: Some(UserView::new(user, counts)),
        })
    }

    fn logged_view(user: &LocalUser, token: Option<String>) -> LoggedUserView {
        LoggedUserView {
            user_id: user.id.as_ref().map(thing_key).unwrap_or_default(),
            email: user.email.clone(),
            name: user.name.clone(),
            token,
        }
    }
}
