//! `ACCIO_` environment variable overrides.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ACCIO_THROTTLE_{AUTH,CONTACT,SEARCH}_MAX_ATTEMPTS` | `throttle.*.max_attempts` |
//! | `ACCIO_THROTTLE_{AUTH,CONTACT,SEARCH}_WINDOW_SECS` | `throttle.*.window_secs` |
//! | `ACCIO_THROTTLE_{AUTH,CONTACT,SEARCH}_BACKOFF` | `throttle.*.backoff` |
//! | `ACCIO_SANITIZE_ALLOW_HTML` | `sanitize.allow_html` |
//! | `ACCIO_SANITIZE_MAX_LENGTH` | `sanitize.max_length` |
//! | `ACCIO_SANITIZE_STRIP_SCRIPTS` | `sanitize.strip_scripts` |
//! | `ACCIO_SANITIZE_PRESERVE_LINE_BREAKS` | `sanitize.preserve_line_breaks` |
//! | `ACCIO_PASSWORD_MIN_LENGTH` | `password.min_length` |
//! | `ACCIO_PASSWORD_MIN_CRITERIA` | `password.min_criteria` |
//! | `ACCIO_UPLOAD_MAX_SIZE_BYTES` | `upload.max_size_bytes` |
//! | `ACCIO_UPLOAD_ALLOWED_MIME_TYPES` | `upload.allowed_mime_types` (comma separated) |
//! | `ACCIO_CSRF_SESSION_KEY` | `csrf.session_key` |

use crate::settings::{RatePolicy, SecuritySettings};
use crate::SettingsError;
use std::str::FromStr;

/// Prefix shared by every recognised variable
pub const ENV_PREFIX: &str = "ACCIO_";

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T, SettingsError> {
	raw.trim()
		.parse()
		.map_err(|_| SettingsError::ParseError(format!("{key}: invalid number '{raw}'")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, SettingsError> {
	match raw.trim().to_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Ok(true),
		"false" | "0" | "no" | "off" => Ok(false),
		_ => Err(SettingsError::ParseError(format!(
			"{key}: invalid boolean '{raw}'"
		))),
	}
}

/// Reads variables through `lookup` and applies every one that is set.
pub(crate) fn apply<F>(mut settings: SecuritySettings, lookup: F) -> Result<SecuritySettings, SettingsError>
where
	F: Fn(&str) -> Option<String>,
{
	let mut applied = 0usize;
	let mut var = |name: &str| {
		let key = format!("{ENV_PREFIX}{name}");
		let value = lookup(&key);
		if value.is_some() {
			applied += 1;
		}
		value.map(|v| (key, v))
	};

	let policies: [(&str, &mut RatePolicy); 3] = [
		("AUTH", &mut settings.throttle.auth),
		("CONTACT", &mut settings.throttle.contact),
		("SEARCH", &mut settings.throttle.search),
	];
	for (scope, policy) in policies {
		if let Some((key, raw)) = var(&format!("THROTTLE_{scope}_MAX_ATTEMPTS")) {
			policy.max_attempts = parse_number(&key, &raw)?;
		}
		if let Some((key, raw)) = var(&format!("THROTTLE_{scope}_WINDOW_SECS")) {
			policy.window_secs = parse_number(&key, &raw)?;
		}
		if let Some((key, raw)) = var(&format!("THROTTLE_{scope}_BACKOFF")) {
			policy.backoff = parse_bool(&key, &raw)?;
		}
	}

	if let Some((key, raw)) = var("SANITIZE_ALLOW_HTML") {
		settings.sanitize.allow_html = parse_bool(&key, &raw)?;
	}
	if let Some((key, raw)) = var("SANITIZE_MAX_LENGTH") {
		settings.sanitize.max_length = parse_number(&key, &raw)?;
	}
	if let Some((key, raw)) = var("SANITIZE_STRIP_SCRIPTS") {
		settings.sanitize.strip_scripts = parse_bool(&key, &raw)?;
	}
	if let Some((key, raw)) = var("SANITIZE_PRESERVE_LINE_BREAKS") {
		settings.sanitize.preserve_line_breaks = parse_bool(&key, &raw)?;
	}

	if let Some((key, raw)) = var("PASSWORD_MIN_LENGTH") {
		settings.password.min_length = parse_number(&key, &raw)?;
	}
	if let Some((key, raw)) = var("PASSWORD_MIN_CRITERIA") {
		settings.password.min_criteria = parse_number(&key, &raw)?;
	}

	if let Some((key, raw)) = var("UPLOAD_MAX_SIZE_BYTES") {
		settings.upload.max_size_bytes = parse_number(&key, &raw)?;
	}
	if let Some((_, raw)) = var("UPLOAD_ALLOWED_MIME_TYPES") {
		settings.upload.allowed_mime_types = raw
			.split(',')
			.map(|s| s.trim().to_string())
			.filter(|s| !s.is_empty())
			.collect();
	}

	if let Some((_, raw)) = var("CSRF_SESSION_KEY") {
		settings.csrf.session_key = raw;
	}

	if applied > 0 {
		tracing::info!(overrides = applied, "applied environment overrides to security settings");
	}

	Ok(settings)
}
