mod helpers;

use perfpulse_server::models::{
    view::scoring::{GovernanceMetricView, GovernanceMetricsView},
    web::ApiResponse,
};
use serde_json::json;

async fn metrics(server: &axum_test::TestServer, dimension: Option<&str>) -> GovernanceMetricsView {
    let mut request = server.get("/api/scoring/governance-metrics");
    if let Some(dimension) = dimension {
        request = request.add_query_param("dimension", dimension);
    }
    let response = request.await;
    response.assert_status_success();
    response.json::<ApiResponse<GovernanceMetricsView>>().data
}

test_with_server!(sample_metrics_without_data, |server, ctx_state, config| {
    let department = metrics(&server, None).await;
    assert_eq!(department.labels.len(), 6);
    assert_eq!(department.values, vec![85.0, 92.0, 88.0, 76.0, 90.0, 82.0]);
    assert_eq!(department.governance_index, 89.5);

    let global = metrics(&server, Some("global")).await;
    assert_eq!(global.values, vec![80.0, 85.0, 92.0, 88.0, 78.0, 86.0]);
    assert_eq!(global.governance_index, 86.3);

    let unknown = metrics(&server, Some("team")).await;
    assert_eq!(unknown, department);
});

test_with_server!(upsert_metric_in_place, |server, ctx_state, config| {
    let first = server
        .post("/api/scoring/governance-metrics")
        .json(&json!({ "dimension": "team", "metric_name": "Security", "value": 70.0 }))
        .await;
    first.assert_status_success();
    let first = first.json::<ApiResponse<GovernanceMetricView>>().data;
    assert_eq!(first.dimension, "team");
    assert_eq!(first.value, 70.0);

    server
        .post("/api/scoring/governance-metrics")
        .json(&json!({ "dimension": "team", "metric_name": "Security", "value": 75.5 }))
        .await
        .assert_status_success();
    server
        .post("/api/scoring/governance-metrics")
        .json(&json!({ "dimension": "team", "metric_name": "Availability", "value": 90 }))
        .await
        .assert_status_success();

    let team = metrics(&server, Some("team")).await;
    assert_eq!(team.labels, vec!["Availability", "Security"]);
    assert_eq!(team.values, vec![90.0, 75.5]);
    assert_eq!(team.governance_index, 82.8);

    let department = metrics(&server, Some("department")).await;
    assert_eq!(department.governance_index, 89.5);
});

test_with_server!(upsert_metric_requires_fields, |server, ctx_state, config| {
    for body in [
        json!({ "metric_name": "Security", "value": 70 }),
        json!({ "dimension": "team", "value": 70 }),
        json!({ "dimension": "team", "metric_name": "Security" }),
        json!({ "dimension": "", "metric_name": "Security", "value": 70 }),
    ] {
        server
            .post("/api/scoring/governance-metrics")
            .json(&body)
            .await
            .assert_status_bad_request();
    }
    let team = metrics(&server, Some("team")).await;
    assert_eq!(team.governance_index, 89.5);
});
