//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Serialize` views for API responses where the row must not leak
//! - Insert DTOs where the row is created outside a draft

pub mod chapter;
pub mod escape_room;
pub mod hint;
pub mod session;
pub mod user;
