//! Result type alias for tabops
//!
//! This module provides a convenient Result type alias that uses TabopsError
//! as the error type.

use super::errors::TabopsError;

/// Result type alias for tabops operations
///
/// # Examples
///
/// ```
/// use tabops::domain::result::Result;
/// use tabops::domain::errors::TabopsError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TabopsError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TabopsError>;
