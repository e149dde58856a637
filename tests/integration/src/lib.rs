//! Shared fixtures for the Accio integration tests.

use accio::conf::SecuritySettings;

/// Settings for a contact form: two submissions per five minutes, a short
/// sanitizer limit and plain-text attachments up to 1 KiB.
pub const CONTACT_FORM_SETTINGS: &str = r#"
[throttle.contact]
max_attempts = 2
window_secs = 300

[sanitize]
max_length = 40

[upload]
max_size_bytes = 1024
allowed_mime_types = ["text/plain"]
"#;

/// Parses and validates [`CONTACT_FORM_SETTINGS`].
pub fn contact_form_settings() -> SecuritySettings {
	let settings = SecuritySettings::from_toml_str(CONTACT_FORM_SETTINGS)
		.expect("contact form settings must parse");
	settings
		.validate()
		.expect("contact form settings must be valid");
	settings
}
