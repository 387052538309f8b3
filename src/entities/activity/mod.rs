pub mod activity_entity;
