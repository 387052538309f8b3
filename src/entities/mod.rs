pub mod activity;
pub mod reward;
pub mod scoring;
pub mod user_auth;
