pub mod app;
pub mod defaults;
pub mod error;
pub mod guard;
pub mod loader;
pub mod tool;

pub use crate::constants::CONFIG_PATH;

pub use app::AppConfig;
pub use error::ConfigError;
pub use guard::{GuardConfig, UnknownToolReply};
pub use tool::ToolConfig;
