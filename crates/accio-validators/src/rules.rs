//! Generic field rules combined with a per-kind validator.

use crate::{
	EmailValidator, PasswordValidator, TextValidator, UrlValidator, ValidationError,
	ValidationResult, Validator, file_upload::validate_filename,
};
use serde::{Deserialize, Serialize};

/// What kind of value a form field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
	Email,
	Password,
	Url,
	Text,
	Filename,
}

/// Presence and length rules for a form field. Lengths count characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRules {
	pub required: bool,
	pub min_length: Option<usize>,
	pub max_length: Option<usize>,
}

impl InputRules {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn required() -> Self {
		Self {
			required: true,
			..Self::default()
		}
	}

	pub fn with_min_length(mut self, min: usize) -> Self {
		self.min_length = Some(min);
		self
	}

	pub fn with_max_length(mut self, max: usize) -> Self {
		self.max_length = Some(max);
		self
	}

	/// Applies only the length bounds.
	pub fn check_length(&self, value: &str) -> ValidationResult {
		let mut result = ValidationResult::valid();
		let len = value.chars().count();
		if let Some(min) = self.min_length
			&& len < min
		{
			result.push_error(ValidationError::TooShort { min });
		}
		if let Some(max) = self.max_length
			&& len > max
		{
			result.push_error(ValidationError::TooLong { max });
		}
		result
	}
}

/// Validates a field value by its kind and rules.
///
/// An empty value fails only when the field is required; an optional empty
/// field skips every other check.
///
/// # Examples
///
/// ```
/// use accio_validators::{InputKind, InputRules, validate_input};
///
/// let rules = InputRules::required().with_max_length(100);
/// assert!(validate_input("user@example.com", InputKind::Email, &rules).is_valid());
/// assert!(!validate_input("", InputKind::Email, &rules).is_valid());
/// assert!(validate_input("", InputKind::Email, &InputRules::new()).is_valid());
/// ```
pub fn validate_input(value: &str, kind: InputKind, rules: &InputRules) -> ValidationResult {
	if value.is_empty() {
		return if rules.required {
			ValidationResult::invalid(ValidationError::Required)
		} else {
			ValidationResult::valid()
		};
	}

	let mut result = rules.check_length(value);
	result.merge(match kind {
		InputKind::Email => EmailValidator::new().validate(value),
		InputKind::Password => PasswordValidator::new().validate(value),
		InputKind::Url => UrlValidator::new().validate(value),
		InputKind::Text => TextValidator.validate(value),
		InputKind::Filename => validate_filename(value),
	});
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_required_empty_fails() {
		// Act
		let result = validate_input("", InputKind::Text, &InputRules::required());

		// Assert
		assert_eq!(result.errors(), [ValidationError::Required]);
	}

	#[rstest]
	#[case(InputKind::Email)]
	#[case(InputKind::Password)]
	#[case(InputKind::Url)]
	fn test_optional_empty_passes(#[case] kind: InputKind) {
		// Assert
		assert!(validate_input("", kind, &InputRules::new()).is_valid());
	}

	#[rstest]
	#[case("ab", Some(ValidationError::TooShort { min: 3 }))]
	#[case("abc", None)]
	#[case("abcde", None)]
	#[case("abcdef", Some(ValidationError::TooLong { max: 5 }))]
	fn test_length_bounds(#[case] value: &str, #[case] expected: Option<ValidationError>) {
		// Arrange
		let rules = InputRules::new().with_min_length(3).with_max_length(5);

		// Act
		let result = validate_input(value, InputKind::Text, &rules);

		// Assert
		assert_eq!(result.errors().first(), expected.as_ref());
	}

	#[rstest]
	fn test_kind_errors_follow_length_errors() {
		// Arrange
		let rules = InputRules::required().with_max_length(10);

		// Act
		let result = validate_input("<script>alert(1)</script>", InputKind::Text, &rules);

		// Assert
		assert_eq!(
			result.errors(),
			[
				ValidationError::TooLong { max: 10 },
				ValidationError::UnsafeContent
			]
		);
	}

	#[rstest]
	fn test_password_kind_reports_strength() {
		// Act
		let result = validate_input("Str0ng!Pass", InputKind::Password, &InputRules::required());

		// Assert
		assert!(result.is_valid());
		assert_eq!(result.strength(), Some(100));
	}
}
