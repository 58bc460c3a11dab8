pub mod pipeline;

pub use pipeline::{flatten_content, IngestError, IngestPipeline, PollError};
