//! Guide generation pipeline: fetch, extract, normalize, assemble

pub mod orchestrator;

pub use orchestrator::{GuideOrchestrator, GuideOutput, GuideStatistics};
