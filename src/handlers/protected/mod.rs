pub mod auth;
pub mod catalog;
pub mod content;
pub mod enrollment;
pub mod review;
