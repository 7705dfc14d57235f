//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod scripture;
pub mod search;
pub mod account;
pub mod devotional;
pub mod pagination;

pub use validation::ValidationError;
pub use scripture::{BookName, ChapterNumber, VerseNumber};
pub use search::{SearchLimit, SearchQuery};
pub use account::{Email, Password, PersonName, Username};
pub use devotional::{Reflection, VerseIds};
pub use pagination::{Pagination, Paginated, PaginationParams};
