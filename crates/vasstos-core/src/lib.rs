pub mod config;
pub mod error;
pub mod locale;
pub mod types;

pub use config::VasstosConfig;
pub use error::{CoreError, Result};
pub use types::*;
