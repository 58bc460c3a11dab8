use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::proposal::Proposal;
use crate::domain::rfp::RfpId;
use crate::domain::vendor::Vendor;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alternative {
    pub vendor_name: String,
    #[serde(default)]
    pub why_consider: Option<String>,
}

/// The model's ranked verdict for one RFP. Never persisted; recomputed on
/// every comparison request from the current proposal scores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_vendor: String,
    pub overall_reasoning: String,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<Alternative>,
    #[serde(default)]
    pub decision: Option<String>,
}

impl Recommendation {
    /// Degraded-but-well-formed stand-in used when the model reply cannot be
    /// parsed. The comparison page renders this instead of erroring.
    pub fn fallback() -> Self {
        Self {
            recommended_vendor: "Unable to generate recommendation".to_string(),
            overall_reasoning: "The analysis response could not be interpreted.".to_string(),
            key_strengths: Vec::new(),
            risk_factors: Vec::new(),
            alternatives: Vec::new(),
            decision: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredProposal {
    pub vendor: Vendor,
    pub proposal: Proposal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub rfp_id: RfpId,
    pub total_proposals: usize,
    pub proposals: Vec<ScoredProposal>,
    pub recommendation: Recommendation,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::Recommendation;

    #[test]
    fn fallback_is_well_formed_with_empty_lists() {
        let fallback = Recommendation::fallback();
        assert!(!fallback.recommended_vendor.is_empty());
        assert!(fallback.key_strengths.is_empty());
        assert!(fallback.risk_factors.is_empty());
        assert!(fallback.alternatives.is_empty());
    }

    #[test]
    fn recommendation_parses_from_llm_wire_shape() {
        let raw = r#"{
            "recommendedVendor": "TechNova Systems",
            "overallReasoning": "Best balance of price and compliance.",
            "keyStrengths": ["price", "warranty"],
            "riskFactors": ["lead time"],
            "alternatives": [{ "vendorName": "Global IT", "whyConsider": "faster delivery" }],
            "decision": "Choose TechNova."
        }"#;
        let parsed: Recommendation = serde_json::from_str(raw).expect("wire shape parses");
        assert_eq!(parsed.recommended_vendor, "TechNova Systems");
        assert_eq!(parsed.alternatives.len(), 1);
    }
}
