//! URL validation.

use crate::{ValidationError, ValidationResult, Validator};
use url::Url;

/// Schemes accepted when none are configured explicitly
pub const DEFAULT_ALLOWED_SCHEMES: &[&str] = &["http", "https"];

/// Validates absolute URLs against a scheme allow-list.
///
/// # Examples
///
/// ```
/// use accio_validators::{UrlValidator, Validator};
///
/// let validator = UrlValidator::new();
/// assert!(validator.validate("https://example.com/path?q=1").is_valid());
/// assert!(!validator.validate("javascript:alert(1)").is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlValidator {
	allowed_schemes: Vec<String>,
}

impl UrlValidator {
	pub fn new() -> Self {
		Self::with_schemes(DEFAULT_ALLOWED_SCHEMES)
	}

	pub fn with_schemes<S: AsRef<str>>(schemes: &[S]) -> Self {
		Self {
			allowed_schemes: schemes
				.iter()
				.map(|s| s.as_ref().to_ascii_lowercase())
				.collect(),
		}
	}

	pub fn allowed_schemes(&self) -> &[String] {
		&self.allowed_schemes
	}
}

impl Default for UrlValidator {
	fn default() -> Self {
		Self::new()
	}
}

impl Validator<str> for UrlValidator {
	fn validate(&self, value: &str) -> ValidationResult {
		let value = value.trim();
		if value.is_empty() {
			return ValidationResult::invalid(ValidationError::Required);
		}

		let Ok(parsed) = Url::parse(value) else {
			return ValidationResult::invalid(ValidationError::InvalidUrl);
		};

		// Url normalizes the scheme to lowercase
		if !self.allowed_schemes.iter().any(|s| s == parsed.scheme()) {
			return ValidationResult::invalid(ValidationError::UnsupportedUrlScheme {
				scheme: parsed.scheme().to_string(),
			});
		}

		match parsed.host_str() {
			Some(host) if !host.is_empty() => ValidationResult::valid(),
			_ => ValidationResult::invalid(ValidationError::UrlMissingHost),
		}
	}
}

/// Validates an http(s) URL.
pub fn validate_url(value: &str) -> ValidationResult {
	UrlValidator::new().validate(value)
}
