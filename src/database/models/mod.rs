pub mod category;
pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod module;
pub mod profile;
pub mod review;
