use surrealdb::Response;

use crate::middleware::error::{AppError, AppResult};

/// Message of `THROW` statements that maps to a domain error.
pub const THROW_NOT_ENOUGH_POINTS: &str = "Not enough points";
pub const THROW_REWARD_UNAVAILABLE: &str = "Reward not available";

fn thrown_to_app_error(msg: &str) -> Option<AppError> {
    if msg.contains(THROW_NOT_ENOUGH_POINTS) {
        Some(AppError::NotEnoughPoints)
    } else if msg.contains(THROW_REWARD_UNAVAILABLE) {
        Some(AppError::RewardUnavailable)
    } else {
        None
    }
}

/// Turns errors of a cancelled `BEGIN/COMMIT` block into one `AppError`.
/// A thrown domain message wins over the "not executed" errors of the
/// other statements in the same transaction.
pub fn check_transaction_custom_error(query_response: &mut Response) -> AppResult<()> {
    let query_err = query_response
        .take_errors()
        .values()
        .fold(None, |ret, error| {
            if matches!(
                ret,
                Some(AppError::NotEnoughPoints) | Some(AppError::RewardUnavailable)
            ) {
                return ret;
            }

            match error {
                surrealdb::Error::Db(surrealdb::error::Db::Thrown(throw_val)) => {
                    thrown_to_app_error(throw_val).or_else(|| {
                        Some(AppError::Generic {
                            description: throw_val.clone(),
                        })
                    })
                }
                surrealdb::Error::Db(surrealdb::error::Db::QueryNotExecuted)
                | surrealdb::Error::Db(surrealdb::error::Db::QueryCancelled)
                    if ret.is_some() =>
                {
                    ret
                }
                _ => thrown_to_app_error(&error.to_string()).or(Some(AppError::SurrealDb {
                    source: error.to_string(),
                })),
            }
        });
    match query_err {
        None => Ok(()),
        Some(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thrown_messages_map_to_domain_errors() {
        assert_eq!(
            thrown_to_app_error("An error occurred: Not enough points"),
            Some(AppError::NotEnoughPoints)
        );
        assert_eq!(
            thrown_to_app_error(THROW_REWARD_UNAVAILABLE),
            Some(AppError::RewardUnavailable)
        );
        assert_eq!(thrown_to_app_error("something else"), None);
    }
}
