//! # Accio Conf
//!
//! Security configuration for Accio forms.
//!
//! Settings start from defaults that match the built-in presets and can be
//! overridden from a TOML/JSON file or from `ACCIO_` environment variables.
//! Call [`SecuritySettings::validate`] before building runtime components.
//!
//! ## Example
//!
//! ```
//! use accio_conf::SecuritySettings;
//!
//! let settings = SecuritySettings::from_toml_str("[sanitize]\nmax_length = 200").unwrap();
//! settings.validate().unwrap();
//!
//! let options = settings.sanitize.to_options();
//! assert_eq!(options.max_length, 200);
//! ```

pub mod env;
pub mod settings;

pub use settings::{
	CsrfSettings, PasswordSettings, RatePolicy, SanitizeSettings, SecuritySettings,
	ThrottleSettings, UploadSettings,
};

/// Settings error
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("File error: {0}")]
	FileError(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Unsupported format: {0}")]
	UnsupportedFormat(String),
}
