pub mod directory;
pub mod reader;
pub mod settings;
pub mod sink;
pub mod subscriber;
