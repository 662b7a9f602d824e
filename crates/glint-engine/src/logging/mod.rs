//! Logger setup.
//!
//! Everything in the crate logs through the `log` facade. Binaries call
//! [`init_logging`] once at startup to route it to `env_logger`.

mod init;

pub use init::{init_logging, LoggingConfig};
