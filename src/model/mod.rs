mod client;
mod types;

pub use client::{HttpModelBackend, ModelBackend};
pub use types::BackendPredictRequest;
