pub mod manager;
pub mod models;
pub mod progress_store;
