//! Logger setup for uniforge binaries and tests.
//!
//! Library code only talks to the `log` facade; `init_logging` installs
//! `env_logger` behind it with filters suited to uniform-buffer work.

mod init;

pub use init::{init_logging, LoggingConfig, DEFAULT_FILTER};
