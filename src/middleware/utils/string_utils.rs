use surrealdb::sql::Thing;

use crate::middleware::error::{AppError, AppResult};

/// Record id of `table` from a path or body id. Accepts the bare key
/// (`abc`) or the full record id (`table:abc`).
pub fn get_str_thing(table: &str, value: &str) -> AppResult<Thing> {
    let value = value.trim();
    let key = match value.split_once(':') {
        Some((tb, key)) if tb == table => key,
        _ => value,
    };
    if key.is_empty() {
        return Err(AppError::Generic {
            description: format!("Invalid {table} id"),
        });
    }
    Ok(Thing::from((table, key)))
}

pub fn get_string_thing(table: &str, value: String) -> AppResult<Thing> {
    get_str_thing(table, &value)
}

/// Key part of a record id as exposed in API payloads.
pub fn thing_key(thing: &Thing) -> String {
    thing.id.to_raw()
}

pub const LEN_OR_NONE: fn(v: String) -> Option<String> = |v| {
    let v = v.trim().to_string();
    if v.is_empty() {
        None
    } else {
        Some(v)
    }
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bare_and_prefixed_ids() {
        let bare = get_str_thing("reward", "abc").unwrap();
        let full = get_str_thing("reward", "reward:abc").unwrap();
        assert_eq!(bare, full);
        assert_eq!(thing_key(&bare), "abc");
        assert_eq!(bare.tb, "reward");
    }

    #[test]
    fn foreign_table_prefix_stays_in_key() {
        let thing = get_str_thing("reward", "activity:abc").unwrap();
        assert_eq!(thing.tb, "reward");
    }

    #[test]
    fn rejects_empty_id() {
        assert!(get_str_thing("reward", " ").is_err());
        assert!(get_str_thing("reward", "reward:").is_err());
    }

    #[test]
    fn len_or_none_trims() {
        assert_eq!(LEN_OR_NONE("  ".to_string()), None);
        assert_eq!(LEN_OR_NONE(" ai ".to_string()), Some("ai".to_string()));
    }
}
