
mod admin;
mod auth;
mod categories;
mod competitions;
mod votes;
