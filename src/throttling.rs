//! Rate limiting module.

pub use accio_throttling::*;
