pub mod project;
pub mod user;
