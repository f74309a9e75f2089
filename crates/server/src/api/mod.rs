pub mod availability;
pub mod catalog;
pub mod handlers;
pub mod media_server;
pub mod middleware;
pub mod routes;
pub mod settings;
pub mod sync;

pub use routes::create_router;
