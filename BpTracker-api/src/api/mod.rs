pub mod handlers;
pub mod routes;


pub use handlers::{shared, SharedTracker};
pub use routes::create_app;
