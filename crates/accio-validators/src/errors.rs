//! Validation failures and the verdict type returned by every validator.

use serde::Serialize;
use thiserror::Error;

/// A single reason an input was rejected.
///
/// The `Display` text is the user-facing message shown next to the field.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum ValidationError {
	#[error("This field is required")]
	Required,

	#[error("Must be at least {min} characters")]
	TooShort { min: usize },

	#[error("Must be at most {max} characters")]
	TooLong { max: usize },

	#[error("Please enter a valid email address")]
	InvalidEmail,

	#[error("Email address must not contain spaces")]
	EmailWhitespace,

	#[error("Did you mean {suggestion}?")]
	DomainTypo { suggestion: String },

	#[error("Password must be at least {min} characters long")]
	PasswordTooShort { min: usize },

	#[error("Password must contain a lowercase letter")]
	PasswordMissingLowercase,

	#[error("Password must contain an uppercase letter")]
	PasswordMissingUppercase,

	#[error("Password must contain a number")]
	PasswordMissingDigit,

	#[error("Password must contain a special character")]
	PasswordMissingSpecial,

	#[error("Password must not repeat the same character three times in a row")]
	PasswordRepeatedCharacters,

	#[error("This password is too common")]
	CommonPassword,

	#[error("Please enter a valid URL")]
	InvalidUrl,

	#[error("URL scheme '{scheme}' is not allowed")]
	UnsupportedUrlScheme { scheme: String },

	#[error("URL must include a host")]
	UrlMissingHost,

	#[error("File is too large ({size_bytes} bytes, maximum {max_bytes} bytes)")]
	FileTooLarge { size_bytes: u64, max_bytes: u64 },

	#[error("File is empty")]
	EmptyFile,

	#[error("File type '{mime_type}' is not allowed")]
	MimeTypeNotAllowed { mime_type: String },

	#[error("File name contains invalid characters")]
	UnsafeFilename,

	#[error("File name must be at most {max} characters")]
	FilenameTooLong { max: usize },

	#[error("Input contains potentially unsafe content")]
	UnsafeContent,
}

/// Verdict of a validation call.
///
/// Built fresh on every call. Valid exactly when no error was recorded;
/// warnings never affect validity.
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
	errors: Vec<ValidationError>,
	warnings: Vec<String>,
	strength: Option<u8>,
	suggestion: Option<String>,
}

impl ValidationResult {
	/// A passing verdict with no messages.
	pub fn valid() -> Self {
		Self::default()
	}

	/// A failing verdict carrying one error.
	///
	/// # Examples
	///
	/// ```
	/// use accio_validators::{ValidationError, ValidationResult};
	///
	/// let result = ValidationResult::invalid(ValidationError::Required);
	/// assert!(!result.is_valid());
	/// assert_eq!(result.message().as_deref(), Some("This field is required"));
	/// ```
	pub fn invalid(error: ValidationError) -> Self {
		let mut result = Self::default();
		result.push_error(error);
		result
	}

	pub fn is_valid(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn errors(&self) -> &[ValidationError] {
		&self.errors
	}

	pub fn warnings(&self) -> &[String] {
		&self.warnings
	}

	/// Password strength score (0-100), when the validator computes one.
	pub fn strength(&self) -> Option<u8> {
		self.strength
	}

	/// Suggested correction, e.g. an email address with a fixed domain.
	pub fn suggestion(&self) -> Option<&str> {
		self.suggestion.as_deref()
	}

	/// Error messages in the order they were recorded.
	pub fn messages(&self) -> Vec<String> {
		self.errors.iter().map(ToString::to_string).collect()
	}

	/// Single-message form: the first error, if any.
	pub fn message(&self) -> Option<String> {
		self.errors.first().map(ToString::to_string)
	}

	pub fn push_error(&mut self, error: ValidationError) {
		self.errors.push(error);
	}

	pub fn push_warning(&mut self, warning: impl Into<String>) {
		self.warnings.push(warning.into());
	}

	pub fn with_strength(mut self, strength: u8) -> Self {
		self.strength = Some(strength.min(100));
		self
	}

	pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
		self.suggestion = Some(suggestion.into());
		self
	}

	/// Appends the messages of `other`; its strength and suggestion win when set.
	pub fn merge(&mut self, other: ValidationResult) {
		self.errors.extend(other.errors);
		self.warnings.extend(other.warnings);
		if other.strength.is_some() {
			self.strength = other.strength;
		}
		if other.suggestion.is_some() {
			self.suggestion = other.suggestion;
		}
	}

	/// Converts to a `Result`, keeping only the first error.
	pub fn into_result(self) -> Result<(), ValidationError> {
		match self.errors.into_iter().next() {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}
