pub mod models;
pub mod patch;
