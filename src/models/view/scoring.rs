use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_or_empty, opt_key, to_utc};
use crate::entities::scoring::governance_metric_entity::GovernanceMetric;
use crate::entities::scoring::score_entry_entity::ScoreEntry;
use crate::entities::scoring::scoring_criteria_entity::ScoringCriteria;
use crate::entities::scoring::scoring_factor_entity::{FactorOption, FactorType, ScoringFactor};
use crate::services::scoring_service::BreakdownItem;

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoringCriteriaView {
    pub id: String,
    pub category: String,
    pub description: String,
    pub base_points: i64,
    pub weight: f64,
}

impl From<ScoringCriteria> for ScoringCriteriaView {
    fn from(c: ScoringCriteria) -> Self {
        ScoringCriteriaView {
            id: key_or_empty(c.id.as_ref()),
            category: c.category,
            description: c.description,
            base_points: c.base_points,
            weight: c.weight,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoringFactorView {
    pub id: String,
    pub label: String,
    pub description: String,
    #[serde(rename = "type")]
    pub factor_type: FactorType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FactorOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
}

impl From<ScoringFactor> for ScoringFactorView {
    fn from(f: ScoringFactor) -> Self {
        ScoringFactorView {
            id: key_or_empty(f.id.as_ref()),
            label: f.label,
            description: f.description,
            factor_type: f.factor_type,
            options: f.options,
            min: f.min,
            max: f.max,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScoreEntryView {
    pub id: String,
    pub user_id: String,
    pub activity_id: Option<String>,
    pub criteria_id: Option<String>,
    pub score: i64,
    pub factors: serde_json::Value,
    pub notes: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ScoreEntry> for ScoreEntryView {
    fn from(e: ScoreEntry) -> Self {
        ScoreEntryView {
            id: key_or_empty(e.id.as_ref()),
            user_id: key_or_empty(Some(&e.user)),
            activity_id: opt_key(e.activity.as_ref()),
            criteria_id: opt_key(e.criteria.as_ref()),
            score: e.score,
            factors: e.factors,
            notes: e.notes,
            created_at: to_utc(e.r_created),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalculationView {
    pub score: i64,
    pub breakdown: Vec<BreakdownItem>,
    /// Set when the result was stored as a score entry.
    pub entry_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceMetricsView {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub governance_index: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GovernanceMetricView {
    pub dimension: String,
    pub metric_name: String,
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl From<GovernanceMetric> for GovernanceMetricView {
    fn from(m: GovernanceMetric) -> Self {
        GovernanceMetricView {
            dimension: m.dimension,
            metric_name: m.metric_name,
            value: m.value,
            timestamp: to_utc(m.timestamp),
        }
    }
}
