//! Email address validation with optional domain typo suggestions.

use crate::{ValidationError, ValidationResult, Validator};
use regex::Regex;
use std::sync::OnceLock;

/// Maximum total length of an address (RFC 5321 path limit minus brackets)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Maximum length of the local part
pub const MAX_LOCAL_PART_LENGTH: usize = 64;

/// Frequent misspellings of popular mail domains and their corrections.
pub const DOMAIN_TYPOS: &[(&str, &str)] = &[
	("gmial.com", "gmail.com"),
	("gmai.com", "gmail.com"),
	("gmal.com", "gmail.com"),
	("gamil.com", "gmail.com"),
	("gnail.com", "gmail.com"),
	("gmail.co", "gmail.com"),
	("gmail.con", "gmail.com"),
	("yahooo.com", "yahoo.com"),
	("yaho.com", "yahoo.com"),
	("yahoo.co", "yahoo.com"),
	("hotmial.com", "hotmail.com"),
	("hotmai.com", "hotmail.com"),
	("hotmal.com", "hotmail.com"),
	("outlok.com", "outlook.com"),
	("outloo.com", "outlook.com"),
	("iclod.com", "icloud.com"),
];

fn email_regex() -> &'static Regex {
	static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
	EMAIL_REGEX.get_or_init(|| {
		Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
	})
}

/// Looks up the corrected domain for a known misspelling.
///
/// # Examples
///
/// ```
/// use accio_validators::email::suggest_domain;
///
/// assert_eq!(suggest_domain("GMIAL.com"), Some("gmail.com"));
/// assert_eq!(suggest_domain("example.com"), None);
/// ```
pub fn suggest_domain(domain: &str) -> Option<&'static str> {
	let domain = domain.to_ascii_lowercase();
	DOMAIN_TYPOS
		.iter()
		.find(|(typo, _)| *typo == domain)
		.map(|(_, fixed)| *fixed)
}

/// Email validator.
///
/// The basic form only checks syntax. [`EmailValidator::enhanced`] also
/// flags common domain misspellings and offers the corrected address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmailValidator {
	suggest_typos: bool,
}

impl EmailValidator {
	pub fn new() -> Self {
		Self {
			suggest_typos: false,
		}
	}

	pub fn enhanced() -> Self {
		Self {
			suggest_typos: true,
		}
	}

	fn check_syntax(email: &str) -> Option<ValidationError> {
		if email.is_empty() {
			return Some(ValidationError::Required);
		}
		if email.chars().any(char::is_whitespace) {
			return Some(ValidationError::EmailWhitespace);
		}
		if email.len() > MAX_EMAIL_LENGTH || !email_regex().is_match(email) {
			return Some(ValidationError::InvalidEmail);
		}

		let (local, domain) = email.rsplit_once('@')?;
		let malformed = local.len() > MAX_LOCAL_PART_LENGTH
			|| local.starts_with('.')
			|| local.ends_with('.')
			|| local.contains("..")
			|| domain.starts_with(['.', '-'])
			|| domain.contains("..");
		malformed.then_some(ValidationError::InvalidEmail)
	}
}

impl Default for EmailValidator {
	fn default() -> Self {
		Self::new()
	}
}

impl Validator<str> for EmailValidator {
	fn validate(&self, email: &str) -> ValidationResult {
		if let Some(error) = Self::check_syntax(email) {
			return ValidationResult::invalid(error);
		}

		if self.suggest_typos
			&& let Some((local, domain)) = email.rsplit_once('@')
			&& let Some(fixed) = suggest_domain(domain)
		{
			let suggestion = format!("{local}@{fixed}");
			return ValidationResult::invalid(ValidationError::DomainTypo {
				suggestion: suggestion.clone(),
			})
			.with_suggestion(suggestion);
		}

		ValidationResult::valid()
	}
}

/// Validates syntax only.
pub fn validate_email(email: &str) -> ValidationResult {
	EmailValidator::new().validate(email)
}

/// Validates syntax and flags misspelled well-known domains.
pub fn validate_email_enhanced(email: &str) -> ValidationResult {
	EmailValidator::enhanced().validate(email)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("test@example.com")]
	#[case("first.last+tag@sub.example.co.uk")]
	#[case("user_name%dept@example.io")]
	fn test_valid_addresses(#[case] email: &str) {
		// Act
		let result = validate_email(email);

		// Assert
		assert!(result.is_valid(), "{email} should be valid");
	}

	#[rstest]
	#[case("invalid-email")]
	#[case("user@")]
	#[case("@example.com")]
	#[case("user@example")]
	#[case("user@example.c")]
	#[case(".user@example.com")]
	#[case("us..er@example.com")]
	#[case("user@-example.com")]
	#[case("user@example..com")]
	fn test_invalid_addresses(#[case] email: &str) {
		// Act
		let result = validate_email(email);

		// Assert
		assert!(!result.is_valid(), "{email} should be rejected");
		assert_eq!(result.errors(), [ValidationError::InvalidEmail]);
	}

	#[rstest]
	#[case("test @example.com")]
	#[case(" test@example.com")]
	#[case("test@example.com\n")]
	fn test_whitespace_rejected(#[case] email: &str) {
		// Act
		let result = validate_email(email);

		// Assert
		assert_eq!(result.errors(), [ValidationError::EmailWhitespace]);
	}

	#[rstest]
	fn test_empty_is_required() {
		// Act
		let result = validate_email("");

		// Assert
		assert_eq!(result.errors(), [ValidationError::Required]);
	}

	#[rstest]
	fn test_overlong_local_part_rejected() {
		// Arrange
		let email = format!("{}@example.com", "a".repeat(MAX_LOCAL_PART_LENGTH + 1));

		// Act
		let result = validate_email(&email);

		// Assert
		assert!(!result.is_valid());
	}

	#[rstest]
	fn test_overlong_address_rejected() {
		// Arrange
		let email = format!("user@{}.com", "a".repeat(MAX_EMAIL_LENGTH));

		// Act
		let result = validate_email(&email);

		// Assert
		assert_eq!(result.errors(), [ValidationError::InvalidEmail]);
	}

	#[rstest]
	fn test_enhanced_suggests_domain_fix() {
		// Act
		let result = validate_email_enhanced("test@gmial.com");

		// Assert
		assert!(!result.is_valid());
		assert_eq!(result.suggestion(), Some("test@gmail.com"));
		assert_eq!(
			result.message().as_deref(),
			Some("Did you mean test@gmail.com?")
		);
	}

	#[rstest]
	fn test_basic_ignores_domain_typos() {
		// Act
		let result = validate_email("test@gmial.com");

		// Assert
		assert!(result.is_valid());
		assert_eq!(result.suggestion(), None);
	}

	#[rstest]
	fn test_enhanced_accepts_correct_domain() {
		// Act
		let result = validate_email_enhanced("test@gmail.com");

		// Assert
		assert!(result.is_valid());
	}
}
