use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_cookies::{Cookie, Cookies};

use crate::{
    middleware::{
        ctx::Ctx,
        error::CtxResult,
        mw_ctx::{CtxState, JWT_KEY},
        utils::extractor_utils::MaybeEncryptedJson,
    },
    models::{
        view::user::{LoggedUserView, SessionView},
        web::ApiResponse,
    },
    services::auth_service::{AuthLoginInput, AuthRegisterInput, AuthService},
};

pub fn routes() -> Router<Arc<CtxState>> {
    Router::new()
        .route("/api/auth/register", post(signup))
        .route("/api/auth/login", post(signin))
        .route("/api/auth/logout", post(signout))
        .route("/api/auth/session", get(session))
        .route("/api/auth/public_key", post(public_key))
}

#[derive(Debug, Serialize)]
struct PublicKeyView {
    public_key: String,
}

async fn signup(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    MaybeEncryptedJson(body): MaybeEncryptedJson<AuthRegisterInput>,
) -> CtxResult<ApiResponse<LoggedUserView>> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let user = auth_service.register(body).await?;
    Ok(ApiResponse::ok(user, "Registration successful"))
}

async fn signin(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
    cookies: Cookies,
    MaybeEncryptedJson(body): MaybeEncryptedJson<AuthLoginInput>,
) -> CtxResult<ApiResponse<LoggedUserView>> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let user = auth_service.login(body).await?;

    if let Some(token) = user.token.clone() {
        cookies.add(
            Cookie::build((JWT_KEY, token))
                .path("/")
                .http_only(true)
                .into(),
        );
    }
    Ok(ApiResponse::ok(user, "Login successful"))
}

async fn signout(cookies: Cookies) -> ApiResponse<Option<()>> {
    cookies.remove(Cookie::build((JWT_KEY, "")).path("/").into());
    ApiResponse::ok(None, "Logged out")
}

async fn session(
    State(state): State<Arc<CtxState>>,
    ctx: Ctx,
) -> CtxResult<ApiResponse<SessionView>> {
    let auth_service = AuthService::new(&state.db.client, &ctx, &state.jwt);
    let session = auth_service.session().await?;
    let message = if session.authenticated {
        "Authenticated"
    } else {
        "Not authenticated"
    };
    Ok(ApiResponse::ok(session, message))
}

async fn public_key(State(state): State<Arc<CtxState>>) -> ApiResponse<PublicKeyView> {
    ApiResponse::ok(
        PublicKeyView {
            public_key: state.cipher.public_key_pem().to_string(),
        },
        "Public key",
    )
}
