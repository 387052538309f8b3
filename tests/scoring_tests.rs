mod helpers;

use perfpulse_server::{
    entities::scoring::scoring_factor_entity::FactorType,
    models::{
        view::{
            scoring::{CalculationView, ScoreEntryView, ScoringCriteriaView, ScoringFactorView},
            user::UserView,
        },
        web::{ApiResponse, ListPage},
    },
};
use serde_json::json;

use crate::helpers::{create_activity, create_fake_login_test_user};

test_with_server!(criteria_and_factors_are_seeded, |server, ctx_state, config| {
    let criteria = server.get("/api/scoring/criteria").await;
    criteria.assert_status_success();
    let criteria = criteria.json::<ApiResponse<Vec<ScoringCriteriaView>>>().data;
    assert_eq!(criteria.len(), 5);
    let commit = criteria.iter().find(|c| c.id == "1").unwrap();
    assert_eq!(commit.category, "Code commit");
    assert_eq!(commit.base_points, 10);
    assert_eq!(commit.weight, 1.0);

    let factors = server.get("/api/scoring/factors").await;
    factors.assert_status_success();
    let raw = factors.json::<serde_json::Value>();
    assert_eq!(raw["data"][0]["type"], "select");

    let factors = factors.json::<ApiResponse<Vec<ScoringFactorView>>>().data;
    assert_eq!(factors.len(), 4);
    let time = factors.iter().find(|f| f.id == "2").unwrap();
    assert_eq!(time.factor_type, FactorType::Number);
    assert_eq!((time.min, time.max), (Some(1), Some(100)));
    let quality = factors.iter().find(|f| f.id == "1").unwrap();
    assert_eq!(quality.options.as_ref().map(Vec::len), Some(3));
});

test_with_server!(calculate_without_persisting, |server, ctx_state, config| {
    let response = server
        .post("/api/scoring/calculate")
        .json(&json!({ "1": "high", "2": 20, "3": "innovative", "4": true }))
        .await;
    response.assert_status_success();
    let result = response.json::<ApiResponse<CalculationView>>().data;
    assert_eq!(result.score, 139);
    assert!(result.entry_id.is_none());

    let categories: Vec<&str> = result.breakdown.iter().map(|b| b.category.as_str()).collect();
    assert_eq!(
        categories,
        vec!["Base", "Quality", "Time", "Innovation", "Collaboration"]
    );
    let innovation = &result.breakdown[3];
    assert_eq!(innovation.raw_score, 25);
    assert_eq!(innovation.weighted_score, 37.5);

    let empty = server
        .post("/api/scoring/calculate")
        .json(&json!({}))
        .await
        .json::<ApiResponse<CalculationView>>()
        .data;
    assert_eq!(empty.score, 50);

    server
        .post("/api/scoring/calculate")
        .json(&json!([1, 2, 3]))
        .await
        .assert_status_bad_request();
});

test_with_server!(calculate_persists_and_credits_points, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    let activity = create_activity(&server, "Speed up build", Some(&user.user_id)).await;

    let response = server
        .post("/api/scoring/calculate")
        .json(&json!({
            "1": "medium", "2": "45", "3": "improved", "4": "false",
            "user_id": user.user_id,
            "activity_id": activity.id,
            "criteria_id": "4",
            "notes": "cache layers",
        }))
        .await;
    response.assert_status_success();
    let result = response.json::<ApiResponse<CalculationView>>().data;
    assert_eq!(result.score, 81);
    let entry_id = result.entry_id.unwrap();

    let user_view = server
        .get(&format!("/api/users/{}", user.user_id))
        .await
        .json::<ApiResponse<UserView>>()
        .data;
    assert_eq!(user_view.points, 81);

    let entries = server
        .get("/api/scoring/entries")
        .add_query_param("user_id", &user.user_id)
        .await;
    entries.assert_status_success();
    let entries = entries.json::<ApiResponse<ListPage<ScoreEntryView>>>().data;
    assert_eq!(entries.total, 1);
    let entry = &entries.items[0];
    assert_eq!(entry.id, entry_id);
    assert_eq!(entry.score, 81);
    assert_eq!(entry.activity_id.as_deref(), Some(activity.id.as_str()));
    assert_eq!(entry.criteria_id.as_deref(), Some("4"));
    assert_eq!(entry.notes, "cache layers");
    assert_eq!(entry.factors["1"], "medium");
    assert!(entry.factors.get("user_id").is_none());
    assert!(entry.factors.get("notes").is_none());
});

test_with_server!(calculate_skips_unknown_records, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    let activity = create_activity(&server, "Pairing", None).await;

    let no_activity = server
        .post("/api/scoring/calculate")
        .json(&json!({ "1": "high", "user_id": user.user_id, "activity_id": "missing" }))
        .await
        .json::<ApiResponse<CalculationView>>()
        .data;
    assert!(no_activity.entry_id.is_none());

    let no_user = server
        .post("/api/scoring/calculate")
        .json(&json!({ "1": "high", "user_id": "ghost", "activity_id": activity.id }))
        .await
        .json::<ApiResponse<CalculationView>>()
        .data;
    assert!(no_user.entry_id.is_none());
    assert_eq!(no_user.score, 74);

    let unknown_criteria = server
        .post("/api/scoring/calculate")
        .json(&json!({
            "user_id": user.user_id,
            "activity_id": activity.id,
            "criteria_id": "99",
        }))
        .await
        .json::<ApiResponse<CalculationView>>()
        .data;
    assert!(unknown_criteria.entry_id.is_some());

    let entries = server
        .get("/api/scoring/entries")
        .await
        .json::<ApiResponse<ListPage<ScoreEntryView>>>()
        .data;
    assert_eq!(entries.total, 1);
    assert!(entries.items[0].criteria_id.is_none());

    let user_view = server
        .get(&format!("/api/users/{}", user.user_id))
        .await
        .json::<ApiResponse<UserView>>()
        .data;
    assert_eq!(user_view.points, 50);
});

test_with_server!(entries_filter_by_activity, |server, ctx_state, config| {
    let (user, _) = create_fake_login_test_user(&server).await;
    let first = create_activity(&server, "First", Some(&user.user_id)).await;
    let second = create_activity(&server, "Second", Some(&user.user_id)).await;

    for activity in [&first, &first, &second] {
        server
            .post("/api/scoring/calculate")
            .json(&json!({ "user_id": user.user_id, "activity_id": activity.id }))
            .await
            .assert_status_success();
    }

    let for_first = server
        .get("/api/scoring/entries")
        .add_query_param("activity_id", &first.id)
        .await
        .json::<ApiResponse<ListPage<ScoreEntryView>>>()
        .data;
    assert_eq!(for_first.total, 2);

    let paged = server
        .get("/api/scoring/entries")
        .add_query_param("user_id", &user.user_id)
        .add_query_param("per_page", 2)
        .await
        .json::<ApiResponse<ListPage<ScoreEntryView>>>()
        .data;
    assert_eq!(paged.total, 3);
    assert_eq!(paged.items.len(), 2);

    server
        .get("/api/scoring/entries")
        .add_query_param("page", 0)
        .await
        .assert_status_bad_request();
});
