//! Run configuration for glbak

pub mod settings;

pub use settings::{ConfigError, Settings, SettingsArgs};
