//! Paging descriptors

use super::sort::Sort;
use crate::exception::{Error, Result};
use serde::{Deserialize, Serialize};

/// Request for one page of results
///
/// Pages are zero-based. A page size of zero is rejected.
///
/// # Examples
///
/// ```
/// use tuplequery_core::PageRequest;
///
/// let request = PageRequest::of(2, 25).unwrap();
/// assert_eq!(request.offset().unwrap(), 50);
/// assert!(PageRequest::of(0, 0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRequest")]
pub struct PageRequest {
	page: u64,
	size: u64,
	sort: Sort,
}

/// Wire form of [`PageRequest`], validated through [`PageRequest::of`]
#[derive(Deserialize)]
struct RawPageRequest {
	page: u64,
	size: u64,
	#[serde(default)]
	sort: Sort,
}

impl TryFrom<RawPageRequest> for PageRequest {
	type Error = Error;

	fn try_from(raw: RawPageRequest) -> Result<Self> {
		Ok(Self::of(raw.page, raw.size)?.with_sort(raw.sort))
	}
}

impl PageRequest {
	pub fn of(page: u64, size: u64) -> Result<Self> {
		if size == 0 {
			return Err(Error::InvalidPage(
				"Page size must be at least 1".to_string(),
			));
		}
		Ok(Self {
			page,
			size,
			sort: Sort::unsorted(),
		})
	}

	pub fn with_sort(mut self, sort: Sort) -> Self {
		self.sort = sort;
		self
	}

	pub fn page(&self) -> u64 {
		self.page
	}

	pub fn size(&self) -> u64 {
		self.size
	}

	pub fn sort(&self) -> &Sort {
		&self.sort
	}

	/// Number of rows skipped before this page
	pub fn offset(&self) -> Result<u64> {
		self.page.checked_mul(self.size).ok_or_else(|| {
			Error::InvalidPage(format!(
				"Offset of page {} with size {} overflows",
				self.page, self.size
			))
		})
	}

	/// Same page index and sort with a smaller page size
	pub fn with_size(mut self, size: u64) -> Result<Self> {
		if size == 0 {
			return Err(Error::InvalidPage(
				"Page size must be at least 1".to_string(),
			));
		}
		self.size = size;
		Ok(self)
	}

	pub fn next(&self) -> Self {
		Self {
			page: self.page.saturating_add(1),
			size: self.size,
			sort: self.sort.clone(),
		}
	}

	pub fn previous_or_first(&self) -> Self {
		Self {
			page: self.page.saturating_sub(1),
			size: self.size,
			sort: self.sort.clone(),
		}
	}
}

/// Paging descriptor: one page, or every row
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pageable {
	/// All matching rows, no offset, no limit and no sort
	#[default]
	Unpaged,
	Paged(PageRequest),
}

impl Pageable {
	pub fn unpaged() -> Self {
		Pageable::Unpaged
	}

	/// Shorthand for `Pageable::Paged(PageRequest::of(page, size)?)`
	pub fn of(page: u64, size: u64) -> Result<Self> {
		PageRequest::of(page, size).map(Pageable::Paged)
	}

	pub fn is_paged(&self) -> bool {
		matches!(self, Pageable::Paged(_))
	}

	pub fn is_unpaged(&self) -> bool {
		!self.is_paged()
	}

	pub fn request(&self) -> Option<&PageRequest> {
		match self {
			Pageable::Paged(request) => Some(request),
			Pageable::Unpaged => None,
		}
	}

	/// Sort of the paged request; unpaged requests are unsorted
	pub fn sort(&self) -> Sort {
		self.request()
			.map(|r| r.sort().clone())
			.unwrap_or_default()
	}
}

impl From<PageRequest> for Pageable {
	fn from(request: PageRequest) -> Self {
		Pageable::Paged(request)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_offset_overflow() {
		// Arrange
		let request = PageRequest::of(u64::MAX, 2).unwrap();

		// Act
		let result = request.offset();

		// Assert
		assert!(matches!(result, Err(Error::InvalidPage(_))));
	}

	#[rstest]
	#[case(r#"{"page": 1, "size": 0}"#, false)]
	#[case(r#"{"page": 1, "size": 5}"#, true)]
	fn test_deserialize_validates_size(#[case] json: &str, #[case] accepted: bool) {
		// Act
		let result = serde_json::from_str::<PageRequest>(json);

		// Assert
		assert_eq!(result.is_ok(), accepted, "{:?}", result);
		if let Ok(request) = result {
			assert_eq!(request.offset().unwrap(), 5);
			assert!(request.sort().is_unsorted());
		}
	}

	#[rstest]
	fn test_unpaged_has_no_sort() {
		// Arrange
		let pageable = Pageable::unpaged();

		// Assert
		assert!(pageable.is_unpaged());
		assert!(pageable.sort().is_unsorted());
		assert!(pageable.request().is_none());
	}

	#[rstest]
	fn test_previous_of_first_page_stays_first() {
		// Arrange
		let request = PageRequest::of(0, 10).unwrap();

		// Act
		let previous = request.previous_or_first();

		// Assert
		assert_eq!(previous.page(), 0);
		assert_eq!(request.next().page(), 1);
	}
}
