//! Input validation module.
//!
//! # Examples
//!
//! ```rust
//! use accio::validators::validate_email;
//!
//! assert!(validate_email("ada@example.com").is_valid());
//! ```

pub use accio_validators::*;
