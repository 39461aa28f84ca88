pub mod content_engine;
pub mod event_bus;
pub mod markup;
pub mod media_engine;
pub mod pending_state;
pub mod request;
pub mod router;
pub mod session_engine;
pub mod taxonomy_engine;
