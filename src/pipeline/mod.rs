pub mod orchestrator;

pub use orchestrator::{capped_hosts, ReconPipeline, UNKNOWN_ERROR};
