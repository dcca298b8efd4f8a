pub mod analyze;
pub mod config;
pub mod discover;
pub mod enrich;
pub mod error;
pub mod http_client;
pub mod model;
pub mod pipeline;
pub mod probe;
pub mod store;
pub mod utils;

// re-export the types most callers need
pub use crate::config::{Config, Credentials};
pub use crate::error::{ReconError, StoreError};
pub use crate::model::*;
pub use crate::pipeline::ReconPipeline;
