//! Repository implementations for database access
//!
//! Each repository borrows the pool and issues parameterized SQL only.

pub mod bible;
pub mod search;
pub mod users;
pub mod devotionals;

pub use bible::{BibleRepo, BibleStats, Book, ChapterVerse, Verse};
pub use search::{SearchHit, SearchPlan, SearchRepo, SearchStrategy};
pub use users::{NewUser, User, UserRecord, UserRepo};
pub use devotionals::{Devotional, DevotionalRepo, FavoriteVerse};
