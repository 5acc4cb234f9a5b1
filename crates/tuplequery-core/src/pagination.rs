//! # Pagination
//!
//! Paging descriptors and page results for tuple queries.
//!
//! - [`Sort`]: ordered list of [`SortOrder`]s (property, direction, null handling)
//! - [`PageRequest`]: zero-based page index, page size and sort
//! - [`Pageable`]: either a [`PageRequest`] or unpaged (all rows, no sort)
//! - [`Page`]: one slice of results plus the total element count

mod page;
mod request;
mod sort;

pub use page::{Page, derive_total};
pub use request::{PageRequest, Pageable};
pub use sort::{Direction, NullHandling, Sort, SortOrder};
