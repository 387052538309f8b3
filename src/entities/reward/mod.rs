pub mod redemption_entity;
pub mod reward_entity;
pub mod reward_suggestion_entity;
