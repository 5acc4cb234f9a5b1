//! Page results

use super::request::PageRequest;
use serde::Serialize;

/// One page of query results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
	content: Vec<T>,
	/// Zero-based page index
	number: u64,
	/// Requested page size; equals the content length for unpaged results
	size: u64,
	/// Total matching elements across all pages
	total: u64,
}

impl<T> Page<T> {
	/// Creates a page for `request` with a known total element count
	///
	/// # Examples
	///
	/// ```
	/// use tuplequery_core::{Page, PageRequest};
	///
	/// let request = PageRequest::of(1, 2).unwrap();
	/// let page = Page::new(vec!["c", "d"], &request, 5);
	/// assert_eq!(page.total_pages(), 3);
	/// assert!(page.has_next());
	/// assert!(page.has_previous());
	/// ```
	pub fn new(content: Vec<T>, request: &PageRequest, total: u64) -> Self {
		Self {
			content,
			number: request.page(),
			size: request.size(),
			total,
		}
	}

	/// Single page holding every element
	pub fn unpaged(content: Vec<T>) -> Self {
		let total = content.len() as u64;
		Self {
			content,
			number: 0,
			size: total,
			total,
		}
	}

	pub fn content(&self) -> &[T] {
		&self.content
	}

	pub fn into_content(self) -> Vec<T> {
		self.content
	}

	pub fn number(&self) -> u64 {
		self.number
	}

	pub fn size(&self) -> u64 {
		self.size
	}

	pub fn number_of_elements(&self) -> usize {
		self.content.len()
	}

	pub fn total_elements(&self) -> u64 {
		self.total
	}

	pub fn total_pages(&self) -> u64 {
		if self.size == 0 {
			1
		} else {
			self.total.div_ceil(self.size)
		}
	}

	pub fn has_content(&self) -> bool {
		!self.content.is_empty()
	}

	pub fn has_next(&self) -> bool {
		self.number.saturating_add(1) < self.total_pages()
	}

	pub fn has_previous(&self) -> bool {
		self.number > 0
	}

	pub fn is_first(&self) -> bool {
		!self.has_previous()
	}

	pub fn is_last(&self) -> bool {
		!self.has_next()
	}

	/// Convert the content, keeping paging metadata
	pub fn map<U, F>(self, f: F) -> Page<U>
	where
		F: FnMut(T) -> U,
	{
		Page {
			content: self.content.into_iter().map(f).collect(),
			number: self.number,
			size: self.size,
			total: self.total,
		}
	}
}

/// Total element count derivable from the fetched page alone
///
/// Returns `None` when a count query is required: the page is full, or it is
/// empty past the first page.
///
/// # Examples
///
/// ```
/// use tuplequery_core::PageRequest;
/// use tuplequery_core::pagination::derive_total;
///
/// let first = PageRequest::of(0, 10).unwrap();
/// assert_eq!(derive_total(&first, 3), Some(3));
/// assert_eq!(derive_total(&first, 10), None);
///
/// let third = PageRequest::of(2, 10).unwrap();
/// assert_eq!(derive_total(&third, 4), Some(24));
/// assert_eq!(derive_total(&third, 0), None);
/// ```
pub fn derive_total(request: &PageRequest, content_len: usize) -> Option<u64> {
	let len = content_len as u64;
	let offset = request.offset().ok()?;
	if offset == 0 {
		if len < request.size() {
			return Some(len);
		}
		return None;
	}
	if len != 0 && len < request.size() {
		return Some(offset + len);
	}
	None
}
