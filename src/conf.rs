//! Security settings module.
//!
//! Settings are read from defaults, TOML or JSON files and `ACCIO_`
//! environment variables. See [`SecuritySettings`].

pub use accio_conf::*;
