//! # tuplequery core
//!
//! Fundamental types shared by the tuplequery crates:
//!
//! - **QueryValue**: dynamically typed value of a single result column
//! - **Tuple**: one loosely-typed result row, ordered by selection
//! - **Pagination**: `Sort`, `PageRequest`, `Pageable` and `Page`
//! - **Exception**: the core `Error` type shared by the other crates
//!
//! ## Example
//!
//! ```
//! use tuplequery_core::{Page, PageRequest, QueryValue, Sort, Tuple};
//!
//! let mut row = Tuple::new();
//! row.push("customer_id", QueryValue::Int(1));
//! row.push("sum", QueryValue::Int(150));
//!
//! let request = PageRequest::of(0, 20).unwrap().with_sort(Sort::by_desc("sum"));
//! let page = Page::new(vec![row], &request, 1);
//!
//! assert_eq!(page.total_elements(), 1);
//! assert_eq!(page.content()[0].get::<i64>("sum").unwrap(), 150);
//! ```

pub mod exception;
pub mod pagination;
pub mod tuple;
pub mod value;

pub use exception::{Error, Result};
pub use pagination::{
	Direction, NullHandling, Page, PageRequest, Pageable, Sort, SortOrder,
};
pub use tuple::Tuple;
pub use value::QueryValue;
