pub mod governance_metric_entity;
pub mod score_entry_entity;
pub mod scoring_criteria_entity;
pub mod scoring_factor_entity;
