pub mod audit;
pub mod directory;
pub mod settings;
