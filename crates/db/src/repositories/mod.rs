//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-row writes run inside a
//! transaction owned by the calling repository method.

pub mod chapter_repo;
pub mod escape_room_repo;
pub mod hint_repo;
pub mod session_repo;
pub mod user_repo;

pub use chapter_repo::ChapterRepo;
pub use escape_room_repo::EscapeRoomRepo;
pub use hint_repo::HintRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;

/// Transaction handle threaded through multi-table writes.
pub(crate) type PgTx<'c> = sqlx::Transaction<'c, sqlx::Postgres>;
