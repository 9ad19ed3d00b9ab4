pub mod admin;
pub mod auth;
pub mod category;
pub mod competition;
pub mod shared;
pub mod submission;
pub mod suggestion;
