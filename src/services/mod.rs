pub mod activity_service;
pub mod auth_service;
pub mod reward_service;
pub mod scoring_service;
pub mod user_service;
