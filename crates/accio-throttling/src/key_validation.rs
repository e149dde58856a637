//! Validation for the components of scoped rate-limit keys.

use crate::{ThrottleError, ThrottleResult};

/// Maximum length of a single key component in bytes.
pub const MAX_KEY_COMPONENT_LENGTH: usize = 256;

/// Delimiter between the scope and the identifier of a scoped key.
pub const KEY_DELIMITER: char = ':';

/// Validates a scope name: non-empty, bounded, no control characters and no
/// delimiter.
pub fn validate_scope(scope: &str) -> ThrottleResult<()> {
	validate_key_component(scope)?;
	if scope.contains(KEY_DELIMITER) {
		return Err(ThrottleError::InvalidKey(format!(
			"scope must not contain '{}'",
			KEY_DELIMITER
		)));
	}
	Ok(())
}

/// Validates an identifier (email, client id, ...). The delimiter is allowed
/// here since only the first delimiter of a scoped key separates the scope.
pub fn validate_key_component(component: &str) -> ThrottleResult<()> {
	if component.is_empty() {
		return Err(ThrottleError::InvalidKey(
			"key component must not be empty".to_string(),
		));
	}
	if component.len() > MAX_KEY_COMPONENT_LENGTH {
		return Err(ThrottleError::InvalidKey(format!(
			"key component exceeds {} bytes",
			MAX_KEY_COMPONENT_LENGTH
		)));
	}
	if component.chars().any(char::is_control) {
		return Err(ThrottleError::InvalidKey(
			"key component must not contain control characters".to_string(),
		));
	}
	Ok(())
}

/// Builds `scope:identifier` after validating both parts.
///
/// # Examples
///
/// ```
/// use accio_throttling::scoped_key;
///
/// assert_eq!(scoped_key("login", "user@example.com").unwrap(), "login:user@example.com");
/// assert!(scoped_key("", "user").is_err());
/// assert!(scoped_key("a:b", "user").is_err());
/// ```
pub fn scoped_key(scope: &str, identifier: &str) -> ThrottleResult<String> {
	validate_scope(scope)?;
	validate_key_component(identifier)?;
	Ok(format!("{}{}{}", scope, KEY_DELIMITER, identifier))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("login", "user@example.com")]
	#[case("search", "client-42")]
	#[case("contact", "203.0.113.7")]
	fn test_scoped_key_accepts_valid_components(#[case] scope: &str, #[case] identifier: &str) {
		// Act
		let key = scoped_key(scope, identifier);

		// Assert
		assert_eq!(key.unwrap(), format!("{}:{}", scope, identifier));
	}

	#[rstest]
	#[case("", "user")]
	#[case("login", "")]
	#[case("lo:gin", "user")]
	#[case("login", "user\nforged")]
	#[case("login\0", "user")]
	fn test_scoped_key_rejects_invalid_components(#[case] scope: &str, #[case] identifier: &str) {
		// Act
		let result = scoped_key(scope, identifier);

		// Assert
		assert!(matches!(result, Err(ThrottleError::InvalidKey(_))));
	}

	#[rstest]
	fn test_identifier_may_contain_delimiter() {
		// Arrange
		let identifier = "2001:db8::1";

		// Act
		let result = scoped_key("login", identifier);

		// Assert
		assert_eq!(result.unwrap(), "login:2001:db8::1");
	}

	#[rstest]
	fn test_component_length_is_bounded() {
		// Arrange
		let identifier = "a".repeat(MAX_KEY_COMPONENT_LENGTH + 1);

		// Act
		let result = validate_key_component(&identifier);

		// Assert
		assert!(result.is_err());
		assert!(validate_key_component(&identifier[1..]).is_ok());
	}
}
