//! HTTP routes of the function container.

pub mod invoke;

pub use invoke::{AUTH_ERROR_BODY, InvokeResponse};
