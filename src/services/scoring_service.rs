use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use validator::{Validate, ValidationErrors};

use crate::{
    database::client::Db,
    entities::{
        activity::activity_entity::{self, ActivityDbService},
        scoring::{
            governance_metric_entity::GovernanceMetricDbService,
            score_entry_entity::{ScoreEntry, ScoreEntryDbService},
            scoring_criteria_entity::{self, ScoringCriteriaDbService},
            scoring_factor_entity::ScoringFactorDbService,
        },
        user_auth::local_user_entity::{self, LocalUserDbService},
    },
    middleware::{
        ctx::Ctx,
        error::{AppError, CtxError, CtxResult},
        utils::{
            db_utils::Pagination,
            string_utils::{get_str_thing, thing_key},
        },
    },
    models::{
        view::scoring::{
            CalculationView, GovernanceMetricView, GovernanceMetricsView, ScoreEntryView,
            ScoringCriteriaView, ScoringFactorView,
        },
        web::ListPage,
    },
};

pub const BASE_SCORE: i64 = 50;
pub const DEFAULT_DIMENSION: &str = "department";

/// Request keys of the calculator that are not factor values.
const RESERVED_KEYS: [&str; 4] = ["user_id", "activity_id", "notes", "criteria_id"];

const FACTOR_QUALITY: &str = "1";
const FACTOR_TIME: &str = "2";
const FACTOR_INNOVATION: &str = "3";
const FACTOR_COLLABORATION: &str = "4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    pub category: String,
    pub raw_score: i64,
    pub weight: f64,
    pub weighted_score: f64,
}

impl BreakdownItem {
    fn new(category: &str, raw_score: i64, weight: f64) -> Self {
        let weighted = raw_score as f64 * weight;
        BreakdownItem {
            category: category.to_string(),
            raw_score,
            weight,
            weighted_score: (weighted * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreResult {
    pub score: i64,
    pub breakdown: Vec<BreakdownItem>,
}

fn time_value(value: Option<&Value>) -> Option<f64> {
    let time = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (time != 0.0).then_some(time)
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => {
            let s = s.trim();
            !s.is_empty() && s != "false" && s != "0"
        }
        _ => false,
    }
}

/// Weighted score of one contribution. The result is the sum of the
/// breakdown rows rounded half away from zero.
pub fn calculate(factors: &Map<String, Value>) -> ScoreResult {
    let quality = match factors.get(FACTOR_QUALITY).and_then(Value::as_str) {
        Some("high") => 20,
        Some("medium") => 10,
        _ => 0,
    };
    let time = match time_value(factors.get(FACTOR_TIME)) {
        Some(t) if t < 30.0 => 15,
        Some(t) if t < 60.0 => 5,
        _ => 0,
    };
    let innovation = match factors.get(FACTOR_INNOVATION).and_then(Value::as_str) {
        Some("innovative") => 25,
        Some("improved") => 10,
        _ => 0,
    };
    let collaboration = if is_truthy(factors.get(FACTOR_COLLABORATION)) {
        15
    } else {
        0
    };

    let breakdown = vec![
        BreakdownItem::new("Base", BASE_SCORE, 1.0),
        BreakdownItem::new("Quality", quality, 1.2),
        BreakdownItem::new("Time", time, 0.8),
        BreakdownItem::new("Innovation", innovation, 1.5),
        BreakdownItem::new("Collaboration", collaboration, 1.0),
    ];
    let total: f64 = breakdown.iter().map(|b| b.weighted_score).sum();

    ScoreResult {
        score: total.round() as i64,
        breakdown,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn governance_index(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round1(values.iter().sum::<f64>() / values.len() as f64)
}

/// Shown for a dimension that has no stored metrics yet.
pub fn sample_governance_metrics(dimension: &str) -> GovernanceMetricsView {
    let labels = [
        "Code quality",
        "Documentation completeness",
        "Security compliance",
        "Performance efficiency",
        "Maintainability",
        "Scalability",
    ]
    .iter()
    .map(|l| l.to_string())
    .collect();
    match dimension {
        "global" => GovernanceMetricsView {
            labels,
            values: vec![80.0, 85.0, 92.0, 88.0, 78.0, 86.0],
            governance_index: 86.3,
        },
        _ => GovernanceMetricsView {
            labels,
            values: vec![85.0, 92.0, 88.0, 76.0, 90.0, 82.0],
            governance_index: 89.5,
        },
    }
}

fn id_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct GovernanceMetricInput {
    #[validate(required(message = "dimension is required"), length(min = 1))]
    pub dimension: Option<String>,
    #[validate(required(message = "metric_name is required"), length(min = 1))]
    pub metric_name: Option<String>,
    #[validate(required(message = "value is required"))]
    pub value: Option<f64>,
}

/// Calculator request body. Factor values are keyed by factor id next to
/// the optional `user_id`, `activity_id`, `criteria_id` and `notes`.
#[derive(Debug, Deserialize, Default)]
#[serde(transparent)]
pub struct CalculateInput(pub Map<String, Value>);

impl Validate for CalculateInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ScoreEntryParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_id: Option<String>,
    pub activity_id: Option<String>,
}

pub struct ScoringService<'a> {
    db: &'a Db,
    ctx: &'a Ctx,
}

impl<'a> ScoringService<'a> {
    pub fn new(db: &'a Db, ctx: &'a Ctx) -> Self {
        Self { db, ctx }
    }

    pub async fn criteria(&self) -> CtxResult<Vec<ScoringCriteriaView>> {
        let list = ScoringCriteriaDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .list()
        .await?;
        Ok(list.into_iter().map(ScoringCriteriaView::from).collect())
    }

    pub async fn factors(&self) -> CtxResult<Vec<ScoringFactorView>> {
        let list = ScoringFactorDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .list()
        .await?;
        Ok(list.into_iter().map(ScoringFactorView::from).collect())
    }

    /// Scores the submitted factors. When the body names an existing user
    /// and activity the score is stored and credited to the user.
    pub async fn calculate(&self, input: CalculateInput) -> CtxResult<CalculationView> {
        let body = input.0;
        let factors: Map<String, Value> = body
            .iter()
            .filter(|(k, _)| !RESERVED_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let result = calculate(&factors);

        let user_id = id_value(body.get("user_id"));
        let activity_id = id_value(body.get("activity_id"));
        let entry_id = match (user_id, activity_id) {
            (Some(user_id), Some(activity_id)) => {
                let notes = body
                    .get("notes")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                self.persist(
                    &user_id,
                    &activity_id,
                    id_value(body.get("criteria_id")),
                    result.score,
                    factors,
                    notes,
                )
                .await?
            }
            _ => None,
        };

        Ok(CalculationView {
            score: result.score,
            breakdown: result.breakdown,
            entry_id,
        })
    }

    async fn persist(
        &self,
        user_id: &str,
        activity_id: &str,
        criteria_id: Option<String>,
        score: i64,
        factors: Map<String, Value>,
        notes: String,
    ) -> CtxResult<Option<String>> {
        let (Ok(user), Ok(activity)) = (
            get_str_thing(local_user_entity::TABLE_NAME, user_id),
            get_str_thing(activity_entity::TABLE_NAME, activity_id),
        ) else {
            return Ok(None);
        };
        let user_exists = LocalUserDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .exists(&user)
        .await
        .is_ok();
        let activity_exists = ActivityDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .exists(&activity)
        .await
        .is_ok();
        if !user_exists || !activity_exists {
            return Ok(None);
        }

        let criteria = match criteria_id
            .and_then(|id| get_str_thing(scoring_criteria_entity::TABLE_NAME, &id).ok())
        {
            Some(thing) => {
                let found = ScoringCriteriaDbService {
                    db: self.db,
                    ctx: self.ctx,
                }
                .exists(&thing)
                .await
                .is_ok();
                found.then_some(thing)
            }
            None => None,
        };

        let entry = ScoreEntryDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .create_and_credit(ScoreEntry {
            id: None,
            user,
            activity: Some(activity),
            criteria,
            score,
            factors: Value::Object(factors),
            notes,
            r_created: None,
        })
        .await?;
        info!(req_id = %self.ctx.req_id(), score, "->> score entry stored");
        Ok(entry.id.as_ref().map(thing_key))
    }

    pub async fn entries(&self, params: ScoreEntryParams) -> CtxResult<ListPage<ScoreEntryView>> {
        let pagination =
            Pagination::new(params.page, params.per_page).map_err(CtxError::from(self.ctx))?;
        let user = params
            .user_id
            .map(|id| get_str_thing(local_user_entity::TABLE_NAME, &id))
            .transpose()
            .map_err(CtxError::from(self.ctx))?;
        let activity = params
            .activity_id
            .map(|id| get_str_thing(activity_entity::TABLE_NAME, &id))
            .transpose()
            .map_err(CtxError::from(self.ctx))?;
        let (items, total) = ScoreEntryDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .list(user, activity, &pagination)
        .await?;
        Ok(ListPage {
            items: items.into_iter().map(ScoreEntryView::from).collect(),
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }

    pub async fn governance_metrics(&self, dimension: Option<String>) -> CtxResult<GovernanceMetricsView> {
        let dimension = dimension
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| DEFAULT_DIMENSION.to_string());
        let metrics = GovernanceMetricDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .list_by_dimension(&dimension)
        .await?;
        if metrics.is_empty() {
            return Ok(sample_governance_metrics(&dimension));
        }
        let (labels, values): (Vec<String>, Vec<f64>) =
            metrics.into_iter().map(|m| (m.metric_name, m.value)).unzip();
        let governance_index = governance_index(&values);
        Ok(GovernanceMetricsView {
            labels,
            values,
            governance_index,
        })
    }

    pub async fn upsert_metric(&self, input: GovernanceMetricInput) -> CtxResult<GovernanceMetricView> {
        let (Some(dimension), Some(metric_name), Some(value)) =
            (input.dimension, input.metric_name, input.value)
        else {
            return Err(self.ctx.to_ctx_error(AppError::Generic {
                description: "dimension, metric_name and value are required".to_string(),
            }));
        };
        let metric = GovernanceMetricDbService {
            db: self.db,
            ctx: self.ctx,
        }
        .upsert(dimension.trim().to_string(), metric_name.trim().to_string(), value)
        .await?;
        Ok(GovernanceMetricView::from(metric))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn factors(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn weighted(result: &ScoreResult) -> Vec<f64> {
        result.breakdown.iter().map(|b| b.weighted_score).collect()
    }

    #[test]
    fn full_example_rounds_half_up() {
        let result = calculate(&factors(
            json!({"1": "high", "2": 20, "3": "innovative", "4": true}),
        ));
        assert_eq!(weighted(&result), vec![50.0, 24.0, 12.0, 37.5, 15.0]);
        assert_eq!(result.score, 139);
    }

    #[test]
    fn empty_input_is_base_score() {
        let result = calculate(&Map::new());
        assert_eq!(result.score, 50);
        assert_eq!(result.breakdown.len(), 5);
        assert_eq!(result.breakdown[0].category, "Base");
        assert!(result.breakdown[1..].iter().all(|b| b.raw_score == 0));
    }

    #[test]
    fn medium_values() {
        let result = calculate(&factors(
            json!({"1": "medium", "2": "45", "3": "improved", "4": false}),
        ));
        assert_eq!(weighted(&result), vec![50.0, 12.0, 4.0, 15.0, 0.0]);
        assert_eq!(result.score, 81);
    }

    #[test]
    fn time_edges() {
        let score_for = |t: Value| calculate(&factors(json!({ "2": t }))).breakdown[2].raw_score;
        assert_eq!(score_for(json!(29)), 15);
        assert_eq!(score_for(json!(30)), 5);
        assert_eq!(score_for(json!(59.5)), 5);
        assert_eq!(score_for(json!(60)), 0);
        assert_eq!(score_for(json!(0)), 0);
        assert_eq!(score_for(json!("abc")), 0);
        assert_eq!(score_for(json!(null)), 0);
    }

    #[test]
    fn collaboration_truthiness() {
        let raw_for = |v: Value| calculate(&factors(json!({ "4": v }))).breakdown[4].raw_score;
        assert_eq!(raw_for(json!(true)), 15);
        assert_eq!(raw_for(json!(1)), 15);
        assert_eq!(raw_for(json!("yes")), 15);
        assert_eq!(raw_for(json!(false)), 0);
        assert_eq!(raw_for(json!(0)), 0);
        assert_eq!(raw_for(json!("false")), 0);
        assert_eq!(raw_for(json!("")), 0);
    }

    #[test]
    fn score_is_rounded_sum_of_breakdown() {
        let qualities = ["low", "medium", "high"];
        let times = [json!(null), json!(10), json!(45), json!(90)];
        let innovations = ["standard", "improved", "innovative"];
        for q in qualities {
            for t in &times {
                for i in innovations {
                    for c in [true, false] {
                        let result = calculate(&factors(
                            json!({"1": q, "2": t, "3": i, "4": c}),
                        ));
                        let sum: f64 = weighted(&result).iter().sum();
                        assert_eq!(result.score, sum.round() as i64);
                    }
                }
            }
        }
    }

    #[test]
    fn governance_index_is_mean_rounded_to_one_decimal() {
        assert_eq!(governance_index(&[80.0, 85.0, 90.0]), 85.0);
        assert_eq!(governance_index(&[1.0, 2.0, 2.0]), 1.7);
        assert_eq!(governance_index(&[]), 0.0);
    }

    #[test]
    fn sample_metrics_by_dimension() {
        assert_eq!(sample_governance_metrics("global").governance_index, 86.3);
        assert_eq!(sample_governance_metrics("department").governance_index, 89.5);
        assert_eq!(sample_governance_metrics("team").governance_index, 89.5);
        assert_eq!(sample_governance_metrics("team").labels.len(), 6);
    }
}
