//! A contact form handled through the facade with settings-driven components.

use accio::conf::SecuritySettings;
use accio::prelude::*;
use accio::validators::FileUpload;
use accio_integration_tests::contact_form_settings;
use rstest::{fixture, rstest};

#[fixture]
fn settings() -> SecuritySettings {
	contact_form_settings()
}

#[rstest]
fn test_contact_message_is_validated_then_sanitized(settings: SecuritySettings) {
	// Arrange
	let rules = InputRules::required().with_max_length(2000);
	let message = "Hello <b>team</b>, please call me back.";

	// Act
	let verdict = validate_input(message, InputKind::Text, &rules);
	let clean = sanitize(message, &settings.sanitize.to_options());

	// Assert
	assert!(verdict.is_valid());
	assert_eq!(clean, "Hello &lt;b&gt;team&lt;/b&gt;, please ca");
	assert!(clean.chars().count() <= 40);
}

#[rstest]
fn test_script_in_message_is_rejected(settings: SecuritySettings) {
	// Act
	let verdict = validate_input(
		"<script>alert(1)</script>",
		InputKind::Text,
		&InputRules::required(),
	);
	let clean = sanitize("<script>alert(1)</script>", &settings.sanitize.to_options());

	// Assert
	assert_eq!(verdict.errors(), [ValidationError::UnsafeContent]);
	assert_eq!(clean, "");
}

#[rstest]
fn test_contact_form_throttled_by_settings(settings: SecuritySettings) {
	// Arrange
	let limiter = RateLimiter::new(settings.throttle.contact.to_config());
	let key = accio::throttling::scoped_key("contact", "ada@example.com").unwrap();

	// Act
	let decisions: Vec<bool> = (0..3).map(|_| limiter.attempt(&key).allowed).collect();

	// Assert
	assert_eq!(decisions, vec![true, true, false]);
}

#[rstest]
fn test_attachment_checked_against_upload_settings(settings: SecuritySettings) {
	// Arrange
	let validator = settings.upload.to_validator();
	let upload = FileUpload::new("notes.pdf", 4096, "application/pdf");

	// Act
	let verdict = validator.validate(&upload);

	// Assert
	assert!(!verdict.is_valid());
	assert_eq!(verdict.errors().len(), 2);
}

#[rstest]
fn test_csrf_token_round_trip_through_prelude() {
	// Arrange
	let csrf = CsrfTokenManager::new(MemorySessionStorage::new());
	let token: CsrfToken = csrf.generate().unwrap();

	// Act
	let first = csrf.consume(token.as_str());
	let second = csrf.consume(token.as_str());

	// Assert
	assert!(first);
	assert!(!second);
}
