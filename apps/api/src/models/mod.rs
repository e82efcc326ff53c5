pub mod application;
pub mod company;
pub mod file;
pub mod resume;
