//! HTTP handlers.

pub mod dispatch_handler;
pub mod health_handler;

pub use dispatch_handler::dispatch_routes;
pub use health_handler::health_routes;
