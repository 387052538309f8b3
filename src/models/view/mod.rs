use chrono::{DateTime, Utc};
use surrealdb::sql::{Datetime, Thing};

use crate::middleware::utils::string_utils::thing_key;

pub mod activity;
pub mod reward;
pub mod scoring;
pub mod user;

pub(crate) fn to_utc(dt: Option<Datetime>) -> Option<DateTime<Utc>> {
    dt.map(|d| d.0)
}

pub(crate) fn opt_key(thing: Option<&Thing>) -> Option<String> {
    thing.map(thing_key)
}

pub(crate) fn key_or_empty(thing: Option<&Thing>) -> String {
    opt_key(thing).unwrap_or_default()
}
