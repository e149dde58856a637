//! Security settings for forms: throttling policies, sanitizer policy,
//! password strength thresholds, upload limits and the CSRF session key.
//!
//! Settings can be loaded from a TOML or JSON file, from `ACCIO_`
//! environment variables, or built in code, and are converted into the
//! runtime types of the validator, sanitizer and throttling crates.

use crate::SettingsError;
use accio_security::SanitizeOptions;
use accio_throttling::ThrottleConfig;
use accio_validators::{FileUploadValidator, PasswordValidator};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level security settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuritySettings {
	#[serde(default)]
	pub throttle: ThrottleSettings,

	#[serde(default)]
	pub sanitize: SanitizeSettings,

	#[serde(default)]
	pub password: PasswordSettings,

	#[serde(default)]
	pub upload: UploadSettings,

	#[serde(default)]
	pub csrf: CsrfSettings,
}

impl Default for SecuritySettings {
	fn default() -> Self {
		Self {
			throttle: ThrottleSettings::default(),
			sanitize: SanitizeSettings::default(),
			password: PasswordSettings::default(),
			upload: UploadSettings::default(),
			csrf: CsrfSettings::default(),
		}
	}
}

impl SecuritySettings {
	/// Create new settings with defaults
	pub fn new() -> Self {
		Self::default()
	}

	/// Parse settings from TOML text. Missing sections keep their defaults.
	///
	/// # Examples
	///
	/// ```
	/// use accio_conf::SecuritySettings;
	///
	/// let settings = SecuritySettings::from_toml_str(r#"
	/// [throttle.auth]
	/// max_attempts = 10
	/// window_secs = 120
	/// backoff = false
	/// "#).unwrap();
	///
	/// assert_eq!(settings.throttle.auth.max_attempts, 10);
	/// assert_eq!(settings.throttle.contact.max_attempts, 3);
	/// ```
	pub fn from_toml_str(contents: &str) -> Result<Self, SettingsError> {
		toml::from_str(contents)
			.map_err(|e| SettingsError::ParseError(format!("TOML parse error: {}", e)))
	}

	/// Load settings from a `.toml` or `.json` file
	pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
		let path = path.into();
		let contents = std::fs::read_to_string(&path).map_err(|e| {
			SettingsError::FileError(format!("Failed to read {}: {}", path.display(), e))
		})?;

		let settings = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml_str(&contents)?,
			Some("json") => serde_json::from_str(&contents)
				.map_err(|e| SettingsError::ParseError(format!("JSON parse error: {}", e)))?,
			_ => {
				return Err(SettingsError::UnsupportedFormat(
					"Supported formats: .toml, .json".to_string(),
				));
			}
		};

		tracing::info!(path = %path.display(), "loaded security settings");
		Ok(settings)
	}

	/// Defaults overridden by `ACCIO_` environment variables
	pub fn from_env() -> Result<Self, SettingsError> {
		Self::default().apply_env()
	}

	/// Override fields from `ACCIO_` environment variables
	pub fn apply_env(self) -> Result<Self, SettingsError> {
		crate::env::apply(self, |key| std::env::var(key).ok())
	}

	/// Validate settings
	pub fn validate(&self) -> Result<(), SettingsError> {
		for (name, policy) in [
			("auth", &self.throttle.auth),
			("contact", &self.throttle.contact),
			("search", &self.throttle.search),
		] {
			policy.validate(name)?;
		}

		if self.sanitize.max_length == 0 {
			return Err(SettingsError::ValidationError(
				"sanitize.max_length must be greater than 0".to_string(),
			));
		}

		if !(1..=6).contains(&self.password.min_criteria) {
			return Err(SettingsError::ValidationError(format!(
				"password.min_criteria must be between 1 and 6, got {}",
				self.password.min_criteria
			)));
		}

		if self.upload.allowed_mime_types.is_empty() {
			return Err(SettingsError::ValidationError(
				"upload.allowed_mime_types must not be empty".to_string(),
			));
		}

		if self.csrf.session_key.trim().is_empty() {
			return Err(SettingsError::ValidationError(
				"csrf.session_key must not be empty".to_string(),
			));
		}

		Ok(())
	}
}

/// Rate limit policies per form
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleSettings {
	#[serde(default = "RatePolicy::auth")]
	pub auth: RatePolicy,

	#[serde(default = "RatePolicy::contact")]
	pub contact: RatePolicy,

	#[serde(default = "RatePolicy::search")]
	pub search: RatePolicy,
}

impl Default for ThrottleSettings {
	fn default() -> Self {
		Self {
			auth: RatePolicy::auth(),
			contact: RatePolicy::contact(),
			search: RatePolicy::search(),
		}
	}
}

/// One rate limit policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePolicy {
	pub max_attempts: u32,
	pub window_secs: u64,
	#[serde(default)]
	pub backoff: bool,
}

impl RatePolicy {
	pub fn auth() -> Self {
		Self::from_config(&ThrottleConfig::auth())
	}

	pub fn contact() -> Self {
		Self::from_config(&ThrottleConfig::contact())
	}

	pub fn search() -> Self {
		Self::from_config(&ThrottleConfig::search())
	}

	fn from_config(config: &ThrottleConfig) -> Self {
		Self {
			max_attempts: config.max_attempts,
			window_secs: config.window.as_secs(),
			backoff: config.backoff,
		}
	}

	pub fn to_config(&self) -> ThrottleConfig {
		ThrottleConfig::new(self.max_attempts, Duration::from_secs(self.window_secs))
			.with_backoff(self.backoff)
	}

	fn validate(&self, name: &str) -> Result<(), SettingsError> {
		if self.max_attempts == 0 {
			return Err(SettingsError::ValidationError(format!(
				"throttle.{name}.max_attempts must be greater than 0"
			)));
		}
		if self.window_secs == 0 {
			return Err(SettingsError::ValidationError(format!(
				"throttle.{name}.window_secs must be greater than 0"
			)));
		}
		Ok(())
	}
}

/// Sanitizer policy
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeSettings {
	pub allow_html: bool,
	pub max_length: usize,
	pub strip_scripts: bool,
	pub preserve_line_breaks: bool,
}

impl Default for SanitizeSettings {
	fn default() -> Self {
		let options = SanitizeOptions::default();
		Self {
			allow_html: options.allow_html,
			max_length: options.max_length,
			strip_scripts: options.strip_scripts,
			preserve_line_breaks: options.preserve_line_breaks,
		}
	}
}

impl SanitizeSettings {
	pub fn to_options(&self) -> SanitizeOptions {
		SanitizeOptions::default()
			.with_allow_html(self.allow_html)
			.with_max_length(self.max_length)
			.with_strip_scripts(self.strip_scripts)
			.with_preserve_line_breaks(self.preserve_line_breaks)
	}
}

/// Password strength thresholds
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordSettings {
	pub min_length: usize,
	pub min_criteria: usize,
}

impl Default for PasswordSettings {
	fn default() -> Self {
		let validator = PasswordValidator::default();
		Self {
			min_length: validator.min_length(),
			min_criteria: validator.min_criteria(),
		}
	}
}

impl PasswordSettings {
	pub fn to_validator(&self) -> PasswordValidator {
		PasswordValidator::new()
			.with_min_length(self.min_length)
			.with_min_criteria(self.min_criteria)
	}
}

/// Upload limits
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
	pub max_size_bytes: u64,
	pub allowed_mime_types: Vec<String>,
}

impl Default for UploadSettings {
	fn default() -> Self {
		let validator = FileUploadValidator::default();
		Self {
			max_size_bytes: validator.max_size(),
			allowed_mime_types: validator.allowed_mime_types().to_vec(),
		}
	}
}

impl UploadSettings {
	pub fn to_validator(&self) -> FileUploadValidator {
		FileUploadValidator::new()
			.with_max_size(self.max_size_bytes)
			.with_mime_types(&self.allowed_mime_types)
	}
}

/// CSRF settings
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfSettings {
	pub session_key: String,
}

impl Default for CsrfSettings {
	fn default() -> Self {
		Self {
			session_key: accio_security::CSRF_SESSION_KEY.to_string(),
		}
	}
}
