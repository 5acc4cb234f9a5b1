//! Core error type

/// Errors raised by the core value, row and pagination types
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	/// A page request could not be honoured (zero size, offset overflow, ...)
	#[error("Invalid page: {0}")]
	InvalidPage(String),

	/// A tuple has no column with the requested alias or position
	#[error("Column not found: {0}")]
	ColumnNotFound(String),

	/// A value could not be converted into the requested Rust type
	#[error("Type error: {0}")]
	TypeError(String),
}

/// Result alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
