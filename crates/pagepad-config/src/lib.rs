pub mod config;

pub use config::{EditorConfig, CONFIG_ENV_VAR};
