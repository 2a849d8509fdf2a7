pub mod config;
pub mod manager;


pub use config::{OutputMethod, PreviewMode, Settings, SettingsLayer};
pub use manager::SettingsManager;
