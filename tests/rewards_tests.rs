mod helpers;

use perfpulse_server::{
    entities::reward::redemption_entity::RedemptionStatus,
    middleware::error::ErrorResponseBody,
    models::{
        view::{
            reward::{LikesView, RedemptionView, RewardView, SuggestionView},
            user::UserView,
        },
        web::{ApiResponse, ListPage},
    },
};
use serde_json::json;

use crate::helpers::{create_fake_login_test_user, create_reward, set_user_points};

async fn user_points(server: &axum_test::TestServer, user_id: &str) -> i64 {
    server
        .get(&format!("/api/users/{user_id}"))
        .await
        .json::<ApiResponse<UserView>>()
        .data
        .points
}

test_with_server!(reward_crud, |server, ctx_state, config| {
    let reward = create_reward(&server, "Team lunch", 150, true).await;
    assert_eq!(reward.cost, 150);
    assert_eq!(reward.likes, 0);
    assert!(reward.available);

    let fetched = server.get(&format!("/api/rewards/{}", reward.id)).await;
    fetched.assert_status_success();
    assert_eq!(fetched.json::<ApiResponse<RewardView>>().data.name, "Team lunch");

    let updated = server
        .put(&format!("/api/rewards/{}", reward.id))
        .json(&json!({ "cost": 180, "name": "" }))
        .await;
    updated.assert_status_success();
    let updated = updated.json::<ApiResponse<RewardView>>().data;
    assert_eq!(updated.cost, 180);
    assert_eq!(updated.name, "Team lunch");

    server
        .post("/api/rewards")
        .json(&json!({ "name": "Broken", "cost": -5 }))
        .await
        .assert_status_bad_request();

    server
        .delete(&format!("/api/rewards/{}", reward.id))
        .await
        .assert_status_success();
    server
        .get(&format!("/api/rewards/{}", reward.id))
        .await
        .assert_status_not_found();
});

test_with_server!(list_shows_only_available_rewards, |server, ctx_state, config| {
    create_reward(&server, "Gift card", 100, true).await;
    create_reward(&server, "Headphones", 400, true).await;
    let hidden = create_reward(&server, "Retired mug", 50, false).await;

    let list = server.get("/api/rewards").await;
    list.assert_status_success();
    let list = list.json::<ApiResponse<ListPage<RewardView>>>().data;
    assert_eq!(list.total, 2);
    assert!(list.items.iter().all(|r| r.id != hidden.id));

    let searched = server
        .get("/api/rewards/")
        .add_query_param("search", "gift")
        .await
        .json::<ApiResponse<ListPage<RewardView>>>()
        .data;
    assert_eq!(searched.total, 1);
    assert_eq!(searched.items[0].name, "Gift card");
});

test_with_server!(redeem_without_enough_points_fails, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    set_user_points(&ctx_state, &user.user_id, 100).await;
    let reward = create_reward(&server, "Conference", 300, true).await;

    let response = server
        .post(&format!("/api/rewards/{}/redeem", reward.id))
        .json(&json!({ "user_id": user.user_id }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<ErrorResponseBody>().message, "Not enough points");
    assert_eq!(user_points(&server, &user.user_id).await, 100);

    let redemptions = server
        .get("/api/rewards/redemptions")
        .add_query_param("user_id", &user.user_id)
        .await
        .json::<ApiResponse<ListPage<RedemptionView>>>()
        .data;
    assert_eq!(redemptions.total, 0);
});

test_with_server!(redeem_spends_points, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    set_user_points(&ctx_state, &user.user_id, 300).await;
    let reward = create_reward(&server, "Book", 300, true).await;

    let response = server
        .post(&format!("/api/rewards/{}/redeem", reward.id))
        .json(&json!({ "user_id": user.user_id }))
        .await;
    response.assert_status_success();
    let redemption = response.json::<ApiResponse<RedemptionView>>().data;
    assert_eq!(redemption.user_id, user.user_id);
    assert_eq!(redemption.reward_id, reward.id);
    assert_eq!(redemption.status, RedemptionStatus::Pending);
    assert!(redemption.timestamp.is_some());
    assert_eq!(user_points(&server, &user.user_id).await, 0);

    server
        .post(&format!("/api/rewards/{}/redeem", reward.id))
        .json(&json!({ "user_id": user.user_id }))
        .await
        .assert_status_bad_request();

    let redemptions = server
        .get("/api/rewards/redemptions")
        .add_query_param("user_id", &user.user_id)
        .await
        .json::<ApiResponse<ListPage<RedemptionView>>>()
        .data;
    assert_eq!(redemptions.total, 1);
});

test_with_server!(concurrent_redeems_spend_points_once, |server, ctx_state, config| {
    use perfpulse_server::entities::{
        reward::{redemption_entity::RedemptionDbService, reward_entity},
        user_auth::local_user_entity,
    };
    use perfpulse_server::middleware::{
        ctx::Ctx, error::AppError, utils::string_utils::get_str_thing,
    };
    use uuid::Uuid;

    let (user, _) = create_fake_login_test_user(&server).await;
    set_user_points(&ctx_state, &user.user_id, 100).await;
    let reward = create_reward(&server, "Concert ticket", 100, true).await;
    let user_thing = get_str_thing(local_user_entity::TABLE_NAME, &user.user_id).unwrap();
    let reward_thing = get_str_thing(reward_entity::TABLE_NAME, &reward.id).unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = ctx_state.clone();
            let user_thing = user_thing.clone();
            let reward_thing = reward_thing.clone();
            tokio::spawn(async move {
                let ctx = Ctx::new(Ok("test".to_string()), Uuid::new_v4());
                RedemptionDbService {
                    db: &state.db.client,
                    ctx: &ctx,
                }
                .redeem(&user_thing, &reward_thing)
                .await
            })
        })
        .collect();

    let mut redeemed = 0;
    for result in futures::future::join_all(handles).await {
        match result.unwrap() {
            Ok(_) => redeemed += 1,
            Err(err) => assert!(
                matches!(err.error, AppError::NotEnoughPoints | AppError::SurrealDb { .. }),
                "unexpected error {:?}",
                err.error
            ),
        }
    }
    assert_eq!(redeemed, 1);
    assert_eq!(user_points(&server, &user.user_id).await, 0);

    let redemptions = server
        .get("/api/rewards/redemptions")
        .add_query_param("user_id", &user.user_id)
        .await
        .json::<ApiResponse<ListPage<RedemptionView>>>()
        .data;
    assert_eq!(redemptions.total, 1);
});

test_with_server!(redeem_checks_user_and_reward, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    set_user_points(&ctx_state, &user.user_id, 1000).await;
    let hidden = create_reward(&server, "Retired", 10, false).await;
    let reward = create_reward(&server, "Coffee", 10, true).await;

    let unavailable = server
        .post(&format!("/api/rewards/{}/redeem", hidden.id))
        .json(&json!({ "user_id": user.user_id }))
        .await;
    unavailable.assert_status_bad_request();
    assert_eq!(
        unavailable.json::<ErrorResponseBody>().message,
        "The reward is not available"
    );

    server
        .post("/api/rewards/missing/redeem")
        .json(&json!({ "user_id": user.user_id }))
        .await
        .assert_status_not_found();
    server
        .post(&format!("/api/rewards/{}/redeem", reward.id))
        .json(&json!({ "user_id": "ghost" }))
        .await
        .assert_status_not_found();
    server
        .post(&format!("/api/rewards/{}/redeem", reward.id))
        .json(&json!({ "user_id": "" }))
        .await
        .assert_status_bad_request();

    assert_eq!(user_points(&server, &user.user_id).await, 1000);
});

test_with_server!(like_increments_count, |server, ctx_state, config| {
    let reward = create_reward(&server, "Plant", 20, true).await;
    for expected in 1..=3 {
        let response = server.post(&format!("/api/rewards/{}/like", reward.id)).await;
        response.assert_status_success();
        assert_eq!(response.json::<ApiResponse<LikesView>>().data.likes, expected);
    }
    server
        .post("/api/rewards/missing/like")
        .await
        .assert_status_not_found();
});

test_with_server!(suggestions_for_rewards, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    let reward = create_reward(&server, "Massage", 250, true).await;

    let on_reward = server
        .post(&format!("/api/rewards/{}/suggest", reward.id))
        .json(&json!({ "user_id": user.user_id, "suggestion": "Make it cheaper", "suggested_value": 200 }))
        .await;
    on_reward.assert_status_success();
    let on_reward = on_reward.json::<ApiResponse<SuggestionView>>().data;
    assert_eq!(on_reward.reward_id.as_deref(), Some(reward.id.as_str()));
    assert_eq!(on_reward.user_id.as_deref(), Some(user.user_id.as_str()));
    assert_eq!(on_reward.suggested_value, Some(200));
    assert!(!on_reward.is_new_reward);

    let for_new = server
        .post("/api/rewards/new/suggest")
        .json(&json!({ "user_id": "anonymous", "suggestion": "Gym membership" }))
        .await;
    for_new.assert_status_success();
    let for_new = for_new.json::<ApiResponse<SuggestionView>>().data;
    assert!(for_new.reward_id.is_none());
    assert!(for_new.user_id.is_none());
    assert!(for_new.is_new_reward);

    let named = server
        .post("/api/rewards/suggest-new")
        .json(&json!({ "name": "Bike", "category": "health" }))
        .await;
    named.assert_status_success();
    let named = named.json::<ApiResponse<SuggestionView>>().data;
    assert_eq!(named.name.as_deref(), Some("Bike"));
    assert_eq!(named.suggestion_text, "");
    assert!(named.is_new_reward);

    server
        .post(&format!("/api/rewards/{}/suggest", reward.id))
        .json(&json!({ "suggestion": "" }))
        .await
        .assert_status_bad_request();
    server
        .post("/api/rewards/suggest-new")
        .json(&json!({ "name": "" }))
        .await
        .assert_status_bad_request();
    server
        .post("/api/rewards/missing/suggest")
        .json(&json!({ "suggestion": "hello" }))
        .await
        .assert_status_not_found();
    server
        .post(&format!("/api/rewards/{}/suggest", reward.id))
        .json(&json!({ "user_id": "ghost", "suggestion": "hello" }))
        .await
        .assert_status_not_found();

    let all = server
        .get("/api/rewards/suggestions")
        .await
        .json::<ApiResponse<ListPage<SuggestionView>>>()
        .data;
    assert_eq!(all.total, 3);

    let for_reward = server
        .get("/api/rewards/suggestions")
        .add_query_param("reward_id", &reward.id)
        .await
        .json::<ApiResponse<ListPage<SuggestionView>>>()
        .data;
    assert_eq!(for_reward.total, 1);
    assert_eq!(for_reward.items[0].suggestion_text, "Make it cheaper");
});
