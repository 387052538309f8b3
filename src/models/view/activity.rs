use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_or_empty, opt_key, to_utc};
use crate::entities::activity::activity_entity::{Activity, ActivityStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct ActivityView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub points: i64,
    pub user_id: Option<String>,
    pub status: ActivityStatus,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Activity> for ActivityView {
    fn from(activity: Activity) -> Self {
        ActivityView {
            id: key_or_empty(activity.id.as_ref()),
            title: activity.title,
            description: activity.description,
            points: activity.points,
            user_id: opt_key(activity.user.as_ref()),
            status: activity.status,
            created_at: to_utc(activity.r_created),
            completed_at: to_utc(activity.completed_at),
            updated_at: to_utc(activity.r_updated),
        }
    }
}
