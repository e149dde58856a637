//! Password strength scoring.
//!
//! A password is graded against six criteria. The score is the share of
//! criteria met, scaled to 0-100. It is accepted when enough criteria are
//! met (five by default) and it is not one of the well-known common
//! passwords.

use crate::{ValidationError, ValidationResult, Validator};
use serde::Serialize;

/// Default minimum length criterion
pub const DEFAULT_MIN_LENGTH: usize = 8;

/// Default number of criteria that must be met
pub const DEFAULT_MIN_CRITERIA: usize = 5;

/// Total number of criteria a password is graded on
pub const CRITERIA_COUNT: usize = 6;

/// Passwords rejected regardless of score (compared case-insensitively).
pub const COMMON_PASSWORDS: &[&str] = &[
	"password",
	"password1",
	"password123",
	"passw0rd",
	"123456",
	"12345678",
	"123456789",
	"1234567890",
	"qwerty",
	"qwerty123",
	"abc123",
	"letmein",
	"welcome",
	"welcome1",
	"admin",
	"admin123",
	"iloveyou",
	"monkey",
	"dragon",
	"111111",
	"sunshine",
	"football",
];

/// Which of the six criteria a password satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PasswordCriteria {
	pub min_length: bool,
	pub lowercase: bool,
	pub uppercase: bool,
	pub digit: bool,
	pub special: bool,
	pub no_repeats: bool,
}

impl PasswordCriteria {
	/// Grades `password`; length is counted in characters.
	pub fn evaluate(password: &str, min_length: usize) -> Self {
		Self {
			min_length: password.chars().count() >= min_length,
			lowercase: password.chars().any(char::is_lowercase),
			uppercase: password.chars().any(char::is_uppercase),
			digit: password.chars().any(|c| c.is_ascii_digit()),
			special: password
				.chars()
				.any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
			no_repeats: !has_triple_repeat(password),
		}
	}

	pub fn met(&self) -> usize {
		[
			self.min_length,
			self.lowercase,
			self.uppercase,
			self.digit,
			self.special,
			self.no_repeats,
		]
		.into_iter()
		.filter(|met| *met)
		.count()
	}

	/// Score in 0..=100, rounded to the nearest integer.
	pub fn score(&self) -> u8 {
		((self.met() * 100 + CRITERIA_COUNT / 2) / CRITERIA_COUNT) as u8
	}

	fn unmet(&self, min_length: usize) -> Vec<ValidationError> {
		let mut errors = Vec::new();
		if !self.min_length {
			errors.push(ValidationError::PasswordTooShort { min: min_length });
		}
		if !self.lowercase {
			errors.push(ValidationError::PasswordMissingLowercase);
		}
		if !self.uppercase {
			errors.push(ValidationError::PasswordMissingUppercase);
		}
		if !self.digit {
			errors.push(ValidationError::PasswordMissingDigit);
		}
		if !self.special {
			errors.push(ValidationError::PasswordMissingSpecial);
		}
		if !self.no_repeats {
			errors.push(ValidationError::PasswordRepeatedCharacters);
		}
		errors
	}
}

fn has_triple_repeat(password: &str) -> bool {
	let chars: Vec<char> = password.chars().collect();
	chars.windows(3).any(|w| w[0] == w[1] && w[1] == w[2])
}

/// Is `password` on the common-password blocklist?
pub fn is_common_password(password: &str) -> bool {
	let lowered = password.to_lowercase();
	COMMON_PASSWORDS.iter().any(|common| *common == lowered)
}

/// Coarse strength label derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PasswordStrength {
	VeryWeak,
	Weak,
	Fair,
	Strong,
	VeryStrong,
}

impl PasswordStrength {
	pub fn from_score(score: u8) -> Self {
		match score {
			0..=20 => Self::VeryWeak,
			21..=40 => Self::Weak,
			41..=60 => Self::Fair,
			61..=85 => Self::Strong,
			_ => Self::VeryStrong,
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			Self::VeryWeak => "Very weak",
			Self::Weak => "Weak",
			Self::Fair => "Fair",
			Self::Strong => "Strong",
			Self::VeryStrong => "Very strong",
		}
	}
}

/// Password validator with configurable thresholds.
///
/// # Examples
///
/// ```
/// use accio_validators::{PasswordValidator, Validator};
///
/// let validator = PasswordValidator::new();
/// let strong = validator.validate("C0rrect-Horse");
/// assert!(strong.is_valid());
/// assert_eq!(strong.strength(), Some(100));
///
/// let weak = validator.validate("weak");
/// assert!(!weak.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordValidator {
	min_length: usize,
	min_criteria: usize,
}

impl PasswordValidator {
	pub fn new() -> Self {
		Self {
			min_length: DEFAULT_MIN_LENGTH,
			min_criteria: DEFAULT_MIN_CRITERIA,
		}
	}

	pub fn with_min_length(mut self, min_length: usize) -> Self {
		self.min_length = min_length;
		self
	}

	/// Sets how many criteria must be met, clamped to `1..=6`.
	pub fn with_min_criteria(mut self, min_criteria: usize) -> Self {
		self.min_criteria = min_criteria.clamp(1, CRITERIA_COUNT);
		self
	}

	pub fn min_length(&self) -> usize {
		self.min_length
	}

	pub fn min_criteria(&self) -> usize {
		self.min_criteria
	}

	/// Strength label for `password` under this validator's length rule.
	pub fn strength(&self, password: &str) -> PasswordStrength {
		PasswordStrength::from_score(PasswordCriteria::evaluate(password, self.min_length).score())
	}
}

impl Default for PasswordValidator {
	fn default() -> Self {
		Self::new()
	}
}

impl Validator<str> for PasswordValidator {
	fn validate(&self, password: &str) -> ValidationResult {
		if password.is_empty() {
			return ValidationResult::invalid(ValidationError::Required).with_strength(0);
		}

		let criteria = PasswordCriteria::evaluate(password, self.min_length);
		let common = is_common_password(password);
		let score = if common { 0 } else { criteria.score() };

		let mut result = ValidationResult::valid().with_strength(score);
		let unmet = criteria.unmet(self.min_length);

		if common {
			result.push_error(ValidationError::CommonPassword);
		}
		if criteria.met() < self.min_criteria {
			for error in unmet {
				result.push_error(error);
			}
		} else {
			for error in unmet {
				result.push_warning(error.to_string());
			}
		}

		result
	}
}

/// Validates with the default thresholds (length 8, five of six criteria).
pub fn validate_password(password: &str) -> ValidationResult {
	PasswordValidator::new().validate(password)
}
