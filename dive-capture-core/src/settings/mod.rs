pub mod store;

pub use store::{apply_smart_defaults, SettingsPatch, SettingsStore, WorkstationSettings};
