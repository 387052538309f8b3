pub mod client;
pub mod surrdb_utils;
