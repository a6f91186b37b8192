pub mod admin;
pub mod auth;
pub mod generation;
pub mod play;
pub mod rooms;
