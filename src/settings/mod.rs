//! User settings persisted in SQLite, with change notification.

pub mod listener;
pub mod migrations;
pub mod store;

pub use listener::ChangeListener;
pub use store::{default_settings, keys, SettingChange, SettingsStore};
