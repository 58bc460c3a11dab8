pub mod extract;
pub mod llm;
pub mod prompts;
pub mod recommend;

pub use extract::{ExtractError, ExtractedRfp, ProposalExtractor, RfpExtractor};
pub use llm::{LlmClient, LlmError, OllamaClient};
pub use recommend::RecommendationGenerator;
