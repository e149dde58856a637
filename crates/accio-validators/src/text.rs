//! Free-text checks for script injection markers.

use crate::{ValidationError, ValidationResult, Validator};
use regex::Regex;
use std::sync::OnceLock;

fn injection_patterns() -> &'static [Regex] {
	static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
	PATTERNS.get_or_init(|| {
		vec![
			Regex::new(r"(?i)<\s*script").unwrap(),
			Regex::new(r"(?i)javascript\s*:").unwrap(),
			Regex::new(r"(?i)\bon[a-z]+\s*=").unwrap(),
		]
	})
}

/// Does `text` contain a `<script` tag, a `javascript:` URL or an inline
/// event handler such as `onclick=`?
pub fn contains_script_injection(text: &str) -> bool {
	injection_patterns().iter().any(|p| p.is_match(text))
}

/// Rejects text carrying script injection markers. Empty text passes; use
/// [`InputRules`](crate::InputRules) to require a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextValidator;

impl Validator<str> for TextValidator {
	fn validate(&self, text: &str) -> ValidationResult {
		if contains_script_injection(text) {
			ValidationResult::invalid(ValidationError::UnsafeContent)
		} else {
			ValidationResult::valid()
		}
	}
}

pub fn validate_text(text: &str) -> ValidationResult {
	TextValidator.validate(text)
}
