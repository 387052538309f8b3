use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{key_or_empty, to_utc};
use crate::entities::activity::activity_entity::TaskCounts;
use crate::entities::user_auth::local_user_entity::LocalUser;

#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub join_date: Option<DateTime<Utc>>,
    pub points: i64,
    pub level: i64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserView {
    pub fn new(user: LocalUser, counts: TaskCounts) -> Self {
        UserView {
            id: key_or_empty(user.id.as_ref()),
            name: user.name,
            email: user.email,
            department: user.department,
            position: user.position,
            phone: user.phone,
            join_date: to_utc(user.join_date),
            points: user.points,
            level: user.level,
            completed_tasks: counts.completed,
            pending_tasks: counts.pending,
            created_at: to_utc(user.r_created),
            updated_at: to_utc(user.r_updated),
        }
    }
}

/// Returned by register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedUserView {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementView {
    pub id: String,
    pub name: String,
    pub date: Option<DateTime<Utc>>,
    pub points: i64,
}
