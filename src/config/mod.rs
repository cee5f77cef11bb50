//! Project configuration loaded from `.plugvault.toml`.

pub mod settings;

pub use settings::Settings;
