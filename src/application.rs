//! Application layer module
//!
//! This module contains the search pipeline orchestrator, its error
//! taxonomy and the data transfer objects handed to callers.

pub mod dto;
pub mod error;
pub mod pipeline_stage;
pub mod search_pipeline;

pub use dto::{ErrorResponse, SearchResponse};
pub use error::SearchError;
pub use pipeline_stage::{PipelineStage, StageTracker};
pub use search_pipeline::SearchPipeline;
