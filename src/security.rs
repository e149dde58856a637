//! Sanitization and CSRF protection module.
//!
//! # Examples
//!
//! ```rust
//! use accio::security::sanitize_default;
//!
//! assert_eq!(sanitize_default("<b>hi</b>"), "&lt;b&gt;hi&lt;/b&gt;");
//! ```

pub use accio_security::*;
