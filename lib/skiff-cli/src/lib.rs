pub mod cmd;
pub mod errors;
pub mod poll;
pub mod settings;

pub use errors::{CliResult, SkiffCliError};

/// User agent sent with every provider call.
pub const USER_AGENT: &str = concat!("skiff/", env!("CARGO_PKG_VERSION"));
