//! Guarded authentication flows.

pub use accio_auth::*;
