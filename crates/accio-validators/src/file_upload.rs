//! File upload validation: size, MIME type and file name.
//!
//! Every check runs and all failures are reported together, so a form can
//! show the user everything that is wrong with an upload at once.

use crate::{ValidationError, ValidationResult, Validator};
use serde::{Deserialize, Serialize};

/// Default upload size limit (10 MiB)
pub const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;

/// Longest accepted file name, in characters
pub const MAX_FILENAME_LENGTH: usize = 255;

/// MIME types accepted by default
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
	"application/pdf",
	"application/json",
	"text/plain",
	"text/markdown",
	"text/csv",
	"image/jpeg",
	"image/png",
	"image/gif",
	"image/webp",
];

/// Characters that are never accepted in an uploaded file name.
const FORBIDDEN_FILENAME_CHARS: &[char] = &[
	'/', '\\', ':', '*', '?', '"', '<', '>', '|', ';', '&', '$', '`',
];

/// Client-declared metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpload {
	pub name: String,
	pub size: u64,
	pub mime_type: String,
}

impl FileUpload {
	pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			size,
			mime_type: mime_type.into(),
		}
	}
}

/// Strips parameters and case from a MIME type: `Text/Plain; charset=utf-8` -> `text/plain`.
fn essence(mime_type: &str) -> String {
	mime_type
		.split(';')
		.next()
		.unwrap_or_default()
		.trim()
		.to_ascii_lowercase()
}

/// Validates uploads against a size limit and a MIME allow-list.
///
/// # Examples
///
/// ```
/// use accio_validators::{FileUpload, FileUploadValidator, Validator};
///
/// let validator = FileUploadValidator::new();
/// let report = FileUpload::new("report.pdf", 2048, "application/pdf");
/// assert!(validator.validate(&report).is_valid());
///
/// let script = FileUpload::new("run.sh", 2048, "application/x-sh");
/// assert!(!validator.validate(&script).is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUploadValidator {
	max_size: u64,
	allowed_mime_types: Vec<String>,
}

impl FileUploadValidator {
	pub fn new() -> Self {
		Self {
			max_size: MAX_UPLOAD_SIZE,
			allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
				.iter()
				.map(|m| (*m).to_string())
				.collect(),
		}
	}

	pub fn with_max_size(mut self, max_size: u64) -> Self {
		self.max_size = max_size;
		self
	}

	/// Size limit expressed in mebibytes, saturating at `u64::MAX` bytes.
	pub fn with_max_size_mb(self, mb: u64) -> Self {
		self.with_max_size(mb.saturating_mul(1024 * 1024))
	}

	pub fn with_mime_types<S: AsRef<str>>(mut self, mime_types: &[S]) -> Self {
		self.allowed_mime_types = mime_types.iter().map(|m| essence(m.as_ref())).collect();
		self
	}

	pub fn max_size(&self) -> u64 {
		self.max_size
	}

	pub fn allowed_mime_types(&self) -> &[String] {
		&self.allowed_mime_types
	}

	pub fn is_mime_type_allowed(&self, mime_type: &str) -> bool {
		let essence = essence(mime_type);
		self.allowed_mime_types.iter().any(|m| *m == essence)
	}

	fn check_size(&self, size: u64, result: &mut ValidationResult) {
		if size == 0 {
			result.push_error(ValidationError::EmptyFile);
		} else if size > self.max_size {
			result.push_error(ValidationError::FileTooLarge {
				size_bytes: size,
				max_bytes: self.max_size,
			});
		}
	}

	fn check_mime_type(&self, mime_type: &str, result: &mut ValidationResult) {
		if !self.is_mime_type_allowed(mime_type) {
			result.push_error(ValidationError::MimeTypeNotAllowed {
				mime_type: mime_type.to_string(),
			});
		}
	}
}

impl Default for FileUploadValidator {
	fn default() -> Self {
		Self::new()
	}
}

impl Validator<FileUpload> for FileUploadValidator {
	fn validate(&self, upload: &FileUpload) -> ValidationResult {
		let mut result = validate_filename(&upload.name);
		self.check_size(upload.size, &mut result);
		self.check_mime_type(&upload.mime_type, &mut result);
		result
	}
}

/// Checks a file name for path separators, shell metacharacters, control
/// characters and excessive length.
pub fn validate_filename(name: &str) -> ValidationResult {
	let mut result = ValidationResult::valid();

	if name.trim().is_empty() {
		result.push_error(ValidationError::Required);
		return result;
	}
	if name == "." || name == ".."
		|| name
			.chars()
			.any(|c| c.is_control() || FORBIDDEN_FILENAME_CHARS.contains(&c))
	{
		result.push_error(ValidationError::UnsafeFilename);
	}
	if name.chars().count() > MAX_FILENAME_LENGTH {
		result.push_error(ValidationError::FilenameTooLong {
			max: MAX_FILENAME_LENGTH,
		});
	}

	result
}

/// Validates with the default limit and allow-list.
pub fn validate_file_upload(upload: &FileUpload) -> ValidationResult {
	FileUploadValidator::new().validate(upload)
}
