pub mod activity;
pub mod auth_routes;
pub mod health;
pub mod rewards;
pub mod scoring;
pub mod users;
