use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_or_empty, opt_key, to_utc};
use crate::entities::reward::redemption_entity::{Redemption, RedemptionStatus};
use crate::entities::reward::reward_entity::Reward;
use crate::entities::reward::reward_suggestion_entity::{RewardSuggestion, SuggestionStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct RewardView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cost: i64,
    pub icon: Option<String>,
    pub available: bool,
    pub category: Option<String>,
    pub likes: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Reward> for RewardView {
    fn from(reward: Reward) -> Self {
        RewardView {
            id: key_or_empty(reward.id.as_ref()),
            name: reward.name,
            description: reward.description,
            cost: reward.cost,
            icon: reward.icon,
            available: reward.available,
            category: reward.category,
            likes: reward.likes,
            created_at: to_utc(reward.r_created),
            updated_at: to_utc(reward.r_updated),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RedemptionView {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub status: RedemptionStatus,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Redemption> for RedemptionView {
    fn from(redemption: Redemption) -> Self {
        RedemptionView {
            id: key_or_empty(redemption.id.as_ref()),
            user_id: key_or_empty(Some(&redemption.user)),
            reward_id: key_or_empty(Some(&redemption.reward)),
            status: redemption.status,
            timestamp: to_utc(redemption.timestamp),
            created_at: to_utc(redemption.r_created),
            updated_at: to_utc(redemption.r_updated),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikesView {
    pub likes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionView {
    pub id: String,
    pub user_id: Option<String>,
    pub reward_id: Option<String>,
    pub suggestion_text: String,
    pub suggested_value: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_new_reward: bool,
    pub status: SuggestionStatus,
    pub timestamp: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RewardSuggestion> for SuggestionView {
    fn from(s: RewardSuggestion) -> Self {
        SuggestionView {
            id: key_or_empty(s.id.as_ref()),
            user_id: opt_key(s.user.as_ref()),
            reward_id: opt_key(s.reward.as_ref()),
            suggestion_text: s.suggestion_text,
            suggested_value: s.suggested_value,
            name: s.name,
            description: s.description,
            category: s.category,
            is_new_reward: s.is_new_reward,
            status: s.status,
            timestamp: to_utc(s.timestamp),
            created_at: to_utc(s.r_created),
            updated_at: to_utc(s.r_updated),
        }
    }
}
