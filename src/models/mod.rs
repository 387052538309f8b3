pub mod view;
pub mod web;
