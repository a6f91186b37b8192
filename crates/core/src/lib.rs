//! Domain rules for the escape room service.
//!
//! Everything in this crate is pure: no I/O, no database access. The `db`
//! and `api` crates call into these modules to validate drafts, decide chapter
//! access, and plan nested edits.

pub mod answers;
pub mod authoring;
pub mod error;
pub mod generation;
pub mod hashing;
pub mod narration;
pub mod progress;
pub mod reconcile;
pub mod roles;
pub mod theme;
pub mod types;
