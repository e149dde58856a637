//! # Accio Validators
//!
//! Pure, side-effect-free validators for user-supplied form data. Each call
//! returns a fresh [`ValidationResult`] listing every problem found.
//!
//! ## Available Validators
//!
//! - **Email**: syntax checks, optional domain typo suggestions
//! - **Password**: six-criteria strength score and common-password blocklist
//! - **Url**: absolute http(s) URLs with a host
//! - **FileUpload**: size limit, MIME allow-list and safe file names
//! - **Text**: script injection markers
//! - **Rules**: required/length rules combined with any of the above
//!
//! ## Example
//!
//! ```
//! use accio_validators::{validate_email, validate_password};
//!
//! assert!(validate_email("test@example.com").is_valid());
//!
//! let weak = validate_password("weak");
//! assert!(!weak.is_valid());
//! assert!(weak.strength().unwrap() < 50);
//! ```

pub mod email;
pub mod errors;
pub mod file_upload;
pub mod password;
pub mod rules;
pub mod text;
pub mod uri;

pub use email::{EmailValidator, validate_email, validate_email_enhanced};
pub use errors::{ValidationError, ValidationResult};
pub use file_upload::{
	FileUpload, FileUploadValidator, MAX_UPLOAD_SIZE, validate_file_upload, validate_filename,
};
pub use password::{PasswordCriteria, PasswordStrength, PasswordValidator, validate_password};
pub use rules::{InputKind, InputRules, validate_input};
pub use text::{TextValidator, contains_script_injection, validate_text};
pub use uri::{UrlValidator, validate_url};

/// Trait for validators that inspect a value and report every problem found.
pub trait Validator<T: ?Sized> {
	fn validate(&self, value: &T) -> ValidationResult;
}
