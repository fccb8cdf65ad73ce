//! HTTP API handlers for lifer-quiz

pub mod health;
pub mod list;
pub mod quiz;
pub mod saved_lists;
pub mod search;
pub mod sounds;
pub mod sse;

pub use health::health_routes;
pub use list::list_routes;
pub use quiz::quiz_routes;
pub use saved_lists::saved_list_routes;
pub use search::search_routes;
pub use sounds::sounds_routes;
pub use sse::event_stream;
