//! Ordered start-up initializers.

mod error;
mod registry;

pub use error::InitError;
pub use registry::{InitRegistry, InitResult, Registration, SharedState};
