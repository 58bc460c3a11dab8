//! Structured extraction from free text via the model boundary.
//!
//! Both extractors share the same contract: one chat call, then a two-step
//! parse of the reply. Text that is not JSON at all and JSON that does not
//! match the expected shape are distinct failures, so callers can tell a
//! chatty model from a drifting schema.

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use procura_core::domain::proposal::ParsedProposal;
use procura_core::domain::rfp::Specifications;

use crate::llm::{LlmClient, LlmError};
use crate::prompts;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("model reply is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("model reply is valid JSON but does not match the {schema} schema: {source}")]
    SchemaMismatch { schema: &'static str, source: serde_json::Error },
}

fn parse_reply<T: serde::de::DeserializeOwned>(
    schema: &'static str,
    reply: &str,
) -> Result<T, ExtractError> {
    let trimmed = reply.trim();
    let value: serde_json::Value =
        serde_json::from_str(trimmed).map_err(ExtractError::InvalidJson)?;
    serde_json::from_value(value)
        .map_err(|source| ExtractError::SchemaMismatch { schema, source })
}

/// What the model returns for an RFP request: a short title plus the full
/// specification block, in one JSON object.
#[derive(Clone, Debug, Deserialize)]
pub struct ExtractedRfp {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(flatten)]
    pub specifications: Specifications,
}

impl ExtractedRfp {
    pub fn title_or_default(&self) -> String {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or("Procurement Request")
            .to_string()
    }
}

pub struct RfpExtractor {
    llm: Arc<dyn LlmClient>,
}

impl RfpExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, user_input: &str) -> Result<ExtractedRfp, ExtractError> {
        let user_prompt = format!("Parse this procurement request: \"{user_input}\"");
        let reply = self.llm.chat(prompts::RFP_SYSTEM_PROMPT, &user_prompt).await?;
        parse_reply("rfp", &reply)
    }
}

pub struct ProposalExtractor {
    llm: Arc<dyn LlmClient>,
}

impl ProposalExtractor {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// `content` is the flattened email: plain-text body plus labeled
    /// text-attachment blocks.
    pub async fn extract(&self, content: &str) -> Result<ParsedProposal, ExtractError> {
        let user_prompt = format!("Parse this vendor proposal email:\n\n{content}");
        let reply = self.llm.chat(prompts::PROPOSAL_SYSTEM_PROMPT, &user_prompt).await?;
        parse_reply("proposal", &reply)
    }
}
