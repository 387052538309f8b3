mod helpers;

use perfpulse_server::{
    middleware::error::ErrorResponseBody,
    models::{
        view::user::{AchievementView, UserView},
        web::{ApiResponse, ListPage},
    },
};
use serde_json::json;

use crate::helpers::{
    create_activity, create_fake_login_test_user, create_reward, fake_email, login_user,
    register_user, set_user_points, TEST_PASSWORD,
};

test_with_server!(list_users_paginated_and_searchable, |server, ctx_state, config| {
    for name in ["Zyxwa Walker", "Bob Stone", "Zyxwab Keys"] {
        server
            .post("/api/auth/register")
            .json(&json!({ "email": fake_email(), "password": TEST_PASSWORD, "name": name }))
            .await
            .assert_status_success();
    }

    let all = server.get("/api/users").await;
    all.assert_status_success();
    let all = all.json::<ApiResponse<ListPage<UserView>>>().data;
    assert_eq!(all.total, 3);
    assert_eq!(all.page, 1);
    assert_eq!(all.per_page, 10);

    let page = server
        .get("/api/users")
        .add_query_param("page", 2)
        .add_query_param("per_page", 2)
        .await
        .json::<ApiResponse<ListPage<UserView>>>()
        .data;
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total, 3);

    let found = server
        .get("/api/users")
        .add_query_param("search", "ZYXW")
        .await
        .json::<ApiResponse<ListPage<UserView>>>()
        .data;
    assert_eq!(found.total, 2);
    assert!(found.items.iter().all(|u| u.name.starts_with("Zyxwa")));
});

test_with_server!(invalid_pagination_is_rejected, |server, ctx_state, config| {
    server
        .get("/api/users")
        .add_query_param("page", 0)
        .await
        .assert_status_bad_request();
    server
        .get("/api/users")
        .add_query_param("per_page", 101)
        .await
        .assert_status_bad_request();
});

test_with_server!(get_user_with_task_counts, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    let done = create_activity(&server, "Ship feature", Some(&user.user_id)).await;
    create_activity(&server, "Write docs", Some(&user.user_id)).await;
    server
        .put(&format!("/api/activity/{}", done.id))
        .json(&json!({ "status": "completed" }))
        .await
        .assert_status_success();

    let response = server.get(&format!("/api/users/{}", user.user_id)).await;
    response.assert_status_success();
    let view = response.json::<ApiResponse<UserView>>().data;
    assert_eq!(view.completed_tasks, 1);
    assert_eq!(view.pending_tasks, 1);

    server
        .get("/api/users/missing")
        .await
        .assert_status_not_found();
});

test_with_server!(update_user_info, |server, ctx_state, config| {
    let (user, email) = create_fake_login_test_user(&server).await;
    let (other, other_email) = create_fake_login_test_user(&server).await;

    let response = server
        .post(&format!("/api/users/{}/updateInfo", user.user_id))
        .json(&json!({
            "name": "New Name",
            "department": "R&D",
            "position": "",
            "email": email,
        }))
        .await;
    response.assert_status_success();
    let view = response.json::<ApiResponse<UserView>>().data;
    assert_eq!(view.name, "New Name");
    assert_eq!(view.department.as_deref(), Some("R&D"));
    assert_eq!(view.position, None);
    assert_eq!(view.email, email);

    let taken = server
        .post(&format!("/api/users/{}/updateInfo", user.user_id))
        .json(&json!({ "email": other_email }))
        .await;
    taken.assert_status_bad_request();
    assert_eq!(
        taken.json::<ErrorResponseBody>().message,
        "The email is already registered"
    );

    server
        .post(&format!("/api/users/{}/updateInfo", other.user_id))
        .json(&json!({ "password": "another-secret" }))
        .await
        .assert_status_success();
    login_user(&server, &other_email, "another-secret")
        .await
        .assert_status_success();
    login_user(&server, &other_email, TEST_PASSWORD)
        .await
        .assert_status_unauthorized();
});

test_with_server!(update_user_rejects_malformed_email, |server, ctx_state, config| {
    let (user, email) = create_fake_login_test_user(&server).await;

    let response = server
        .post(&format!("/api/users/{}/updateInfo", user.user_id))
        .json(&json!({ "email": "not-an-email", "name": "Ignored" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<ErrorResponseBody>().message, "Invalid email");

    let view = server
        .get(&format!("/api/users/{}", user.user_id))
        .await
        .json::<ApiResponse<UserView>>()
        .data;
    assert_eq!(view.email, email);
    assert_ne!(view.name, "Ignored");

    server
        .post(&format!("/api/users/{}/updateInfo", user.user_id))
        .json(&json!({ "email": "" }))
        .await
        .assert_status_success();
});

test_with_server!(duplicate_email_write_maps_to_domain_error, |server, ctx_state, config| {
    use perfpulse_server::entities::user_auth::local_user_entity::{
        LocalUser, LocalUserDbService, LocalUserUpdate,
    };
    use perfpulse_server::middleware::{
        ctx::Ctx, error::AppError, utils::string_utils::get_str_thing,
    };
    use uuid::Uuid;

    let (user, email) = create_fake_login_test_user(&server).await;
    let ctx = Ctx::new(Ok("test".to_string()), Uuid::new_v4());
    let users = LocalUserDbService {
        db: &ctx_state.db.client,
        ctx: &ctx,
    };

    let duplicate = users
        .create(LocalUser::new("Copy".to_string(), email.to_uppercase(), "hash".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(duplicate.error, AppError::EmailAlreadyUsed));

    let other = users
        .create(LocalUser::new("Other".to_string(), fake_email(), "hash".to_string()))
        .await
        .unwrap();
    let patch = LocalUserUpdate {
        email: Some(email.clone()),
        ..Default::default()
    };
    let taken = users
        .update(other.id.as_ref().unwrap(), patch)
        .await
        .unwrap_err();
    assert!(matches!(taken.error, AppError::EmailAlreadyUsed));

    let owner = users
        .get(&get_str_thing("local_user", &user.user_id).unwrap())
        .await
        .unwrap();
    assert_eq!(owner.email, email);
});

test_with_server!(delete_user, |server, ctx_state, config| {
    let email = fake_email();
    let created = register_user(&server, &email, TEST_PASSWORD).await;
    let user_id = created
        .json::<ApiResponse<perfpulse_server::models::view::user::LoggedUserView>>()
        .data
        .user_id;

    server
        .delete(&format!("/api/users/{user_id}"))
        .await
        .assert_status_success();
    server
        .get(&format!("/api/users/{user_id}"))
        .await
        .assert_status_not_found();
    server
        .delete(&format!("/api/users/{user_id}"))
        .await
        .assert_status_not_found();
});

test_with_server!(achievements_from_scores_and_redemptions, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;

    let empty = server
        .get(&format!("/api/users/{}/achievements", user.user_id))
        .await;
    empty.assert_status_success();
    assert!(empty.json::<ApiResponse<Vec<AchievementView>>>().data.is_empty());

    let activity = create_activity(&server, "Refactor", Some(&user.user_id)).await;
    server
        .post("/api/scoring/calculate")
        .json(&json!({
            "1": "high", "2": 20, "3": "innovative", "4": true,
            "user_id": user.user_id,
            "activity_id": activity.id,
        }))
        .await
        .assert_status_success();

    set_user_points(&ctx_state, &user.user_id, 500).await;
    let reward = create_reward(&server, "Book", 200, true).await;
    server
        .post(&format!("/api/rewards/{}/redeem", reward.id))
        .json(&json!({ "user_id": user.user_id }))
        .await
        .assert_status_success();

    let achievements = server
        .get(&format!("/api/users/{}/achievements", user.user_id))
        .await
        .json::<ApiResponse<Vec<AchievementView>>>()
        .data;
    let ids: Vec<&str> = achievements.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["first_contribution", "high_score", "first_redemption"]);
    assert_eq!(achievements[0].points, 139);
    assert_eq!(achievements[1].points, 139);
    assert_eq!(achievements[2].points, 200);

    server
        .get("/api/users/missing/achievements")
        .await
        .assert_status_not_found();
});
