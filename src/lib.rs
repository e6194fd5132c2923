pub mod config;
pub mod data;
pub mod ecs;
pub mod error;
pub mod map;
pub mod render;
pub mod scheduler;
pub mod scripted_input;
pub mod session;

pub use config::GameConfig;
pub use error::{ConfigError, WorldError};
pub use session::{InputSource, Key, Outcome, Session};
