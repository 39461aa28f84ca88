pub mod memory_settings;
pub mod toml_settings;
