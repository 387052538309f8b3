use axum_test::{TestResponse, TestServer};
use fake::{faker, Fake};
use perfpulse_server::{
    entities::user_auth::local_user_entity,
    middleware::mw_ctx::CtxState,
    models::{
        view::{activity::ActivityView, reward::RewardView, user::LoggedUserView},
        web::ApiResponse,
    },
};
use serde_json::json;
use surrealdb::sql::Thing;

pub const TEST_PASSWORD: &str = "some3242paSs";

#[allow(dead_code)]
pub fn fake_email() -> String {
    faker::internet::en::FreeEmail().fake::<String>().to_lowercase()
}

#[allow(dead_code)]
pub async fn register_user(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/api/auth/register")
        .json(&json!({
            "email": email,
            "password": password,
            "name": faker::name::en::Name().fake::<String>(),
        }))
        .await
}

#[allow(dead_code)]
pub async fn login_user(server: &TestServer, email: &str, password: &str) -> TestResponse {
    server
        .post("/api/auth/login")
        .json(&json!({ "email": email, "password": password }))
        .await
}

/// Registers a user with a random email and logs it in.
#[allow(dead_code)]
pub async fn create_fake_login_test_user(server: &TestServer) -> (LoggedUserView, String) {
    let email = fake_email();
    let created = register_user(server, &email, TEST_PASSWORD).await;
    created.assert_status_success();

    let login = login_user(server, &email, TEST_PASSWORD).await;
    login.assert_status_success();
    let user = login.json::<ApiResponse<LoggedUserView>>().data;
    (user, email)
}

#[allow(dead_code)]
pub async fn set_user_points(ctx_state: &CtxState, user_id: &str, points: i64) {
    ctx_state
        .db
        .client
        .query("UPDATE $id SET points = $points;")
        .bind(("id", Thing::from((local_user_entity::TABLE_NAME, user_id))))
        .bind(("points", points))
        .await
        .unwrap()
        .check()
        .unwrap();
}

#[allow(dead_code)]
pub async fn create_reward(server: &TestServer, name: &str, cost: i64, available: bool) -> RewardView {
    let response = server
        .post("/api/rewards")
        .json(&json!({
            "name": name,
            "description": format!("{name} description"),
            "cost": cost,
            "available": available,
            "category": "test",
        }))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<RewardView>>().data
}

#[allow(dead_code)]
pub async fn create_activity(server: &TestServer, title: &str, user_id: Option<&str>) -> ActivityView {
    let response = server
        .post("/api/activity")
        .json(&json!({
            "title": title,
            "description": format!("{title} description"),
            "points": 10,
            "user_id": user_id,
        }))
        .await;
    response.assert_status_success();
    response.json::<ApiResponse<ActivityView>>().data
}
