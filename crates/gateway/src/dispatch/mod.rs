//! Action dispatch over the organization services.

mod dispatcher;
mod request;

pub use dispatcher::Dispatcher;
pub use request::{AssignmentAction, Request, UnitAction};
