pub mod cache;
pub mod predict_api;
pub mod types;
