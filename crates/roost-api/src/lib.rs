//! Roost API Library
//!
//! HTTP boundary for the Twitter proxy: handlers, middleware, and application setup.

pub mod constants;
pub mod error;
mod extract;
mod handlers;
pub mod middleware;
pub mod multipart;
pub mod response;
pub mod setup;
pub mod state;
pub mod telemetry;

pub use error::{ErrorBody, HttpAppError};
pub use response::SuccessBody;
