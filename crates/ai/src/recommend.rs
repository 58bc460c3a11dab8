//! AI-ranked vendor comparison for one RFP.

use std::sync::Arc;

use tracing::warn;

use procura_core::domain::recommendation::{Recommendation, ScoredProposal};
use procura_core::domain::rfp::Rfp;

use crate::llm::{LlmClient, LlmError};
use crate::prompts;

pub struct RecommendationGenerator {
    llm: Arc<dyn LlmClient>,
}

impl RecommendationGenerator {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// One model call over all scored proposals. A reply that cannot be
    /// parsed degrades to [`Recommendation::fallback`] instead of failing —
    /// the comparison page always renders. Transport failures still
    /// propagate.
    pub async fn generate(
        &self,
        rfp: &Rfp,
        scored: &[ScoredProposal],
    ) -> Result<Recommendation, LlmError> {
        let summaries = scored
            .iter()
            .map(|entry| proposal_summary(entry))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n");

        let user_prompt = format!(
            "RFP Requirements:\n\
             Budget: {budget} {currency}\n\
             Delivery Required: {deadline}\n\
             Key Items: {items}\n\n\
             Vendor Proposals:\n{summaries}\n\n\
             Based on the scores and details above, which vendor should we choose and why?",
            budget = rfp.specifications.budget.total,
            currency = rfp.specifications.budget.currency,
            deadline = rfp.specifications.delivery_terms.deadline.as_deref().unwrap_or("TBD"),
            items = rfp
                .specifications
                .items
                .iter()
                .map(|item| item.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        );

        let reply = self.llm.chat(prompts::RECOMMENDATION_SYSTEM_PROMPT, &user_prompt).await?;

        match serde_json::from_str::<Recommendation>(reply.trim()) {
            Ok(recommendation) => Ok(recommendation),
            Err(error) => {
                warn!(
                    event_name = "ai.recommendation.unparseable_reply",
                    rfp_id = %rfp.id,
                    error = %error,
                    "model recommendation was not valid JSON; serving fallback"
                );
                Ok(Recommendation::fallback())
            }
        }
    }
}

fn proposal_summary(entry: &ScoredProposal) -> String {
    let parsed = &entry.proposal.parsed;
    let pricing = &parsed.pricing;
    let delivery = &parsed.delivery_details;
    let terms = &parsed.terms;
    let compliance = &parsed.compliance;

    let breakdown = if pricing.breakdown.is_empty() {
        "N/A".to_string()
    } else {
        pricing
            .breakdown
            .iter()
            .map(|line| {
                format!(
                    "{} @ {} {}/unit",
                    line.item_name,
                    pricing.currency,
                    line.unit_price.map(|price| price.to_string()).unwrap_or_else(|| "N/A".into())
                )
            })
            .collect::<Vec<_>>()
            .join(", ")
    };

    let shipping = delivery
        .shipping_cost
        .map(|cost| cost.to_string())
        .unwrap_or_else(|| "Included".to_string());
    let specs_not_matched = if compliance.specs_not_matched.is_empty() {
        "None".to_string()
    } else {
        compliance.specs_not_matched.join(", ")
    };
    let overall = entry
        .proposal
        .scores
        .as_ref()
        .map(|scores| scores.overall.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    format!(
        "**Vendor: {name}** ({email})\n\n\
         Pricing:\n\
         - Total: {currency} {total}\n\
         - Breakdown: {breakdown}\n\
         - Discounts: {discounts}\n\n\
         Delivery:\n\
         - Lead Time: {lead_time}\n\
         - Estimated Delivery: {estimated}\n\
         - Shipping Cost: {shipping}\n\n\
         Terms:\n\
         - Payment: {payment}\n\
         - Warranty: {warranty}\n\
         - Support: {support}\n\n\
         Compliance:\n\
         - Specs Matched: {matched}\n\
         - Specs Not Matched: {specs_not_matched}\n\n\
         Overall Score: {overall}/100",
        name = entry.vendor.name,
        email = entry.vendor.email,
        currency = pricing.currency,
        total = pricing.total_price,
        discounts = parsed.pricing.discounts.as_deref().unwrap_or("None"),
        lead_time = delivery.lead_time.as_deref().unwrap_or("N/A"),
        estimated = delivery.estimated_date.as_deref().unwrap_or("N/A"),
        payment = terms.payment_terms.as_deref().unwrap_or("Net 30"),
        warranty = terms.warranty.as_deref().unwrap_or("12 months"),
        support = terms.support_level.as_deref().unwrap_or("Standard"),
        matched = compliance.specs_matched.len(),
    )
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use procura_core::domain::proposal::{
        Compliance, DeliveryDetails, ParsedProposal, Pricing, Proposal, Terms,
    };
    use procura_core::domain::recommendation::ScoredProposal;
    use procura_core::domain::rfp::{Budget, Rfp, RfpItem, Specifications};
    use procura_core::domain::vendor::Vendor;
    use procura_core::scoring::ScoreCard;

    use crate::llm::{LlmClient, LlmError};

    use super::RecommendationGenerator;

    struct CannedLlm {
        reply: &'static str,
    }

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn chat(&self, _system: &str, user: &str) -> Result<String, LlmError> {
            // Summaries must reach the model.
            assert!(user.contains("Vendor Proposals:"));
            Ok(self.reply.to_string())
        }
    }

    fn rfp() -> Rfp {
        Rfp::new(
            "Office Laptops".to_string(),
            "20 laptops".to_string(),
            Specifications {
                items: vec![RfpItem {
                    name: "Laptop".to_string(),
                    quantity: 20,
                    specs: BTreeMap::new(),
                }],
                budget: Budget { total: 50_000.0, currency: "USD".to_string() },
                delivery_terms: Default::default(),
                payment_terms: Default::default(),
                warranty: Default::default(),
            },
        )
    }

    fn scored_proposal(rfp: &Rfp) -> ScoredProposal {
        let vendor = Vendor::new("TechNova".to_string(), "sales@technova.com", None, None);
        let mut proposal = Proposal::from_email(
            rfp.id.clone(),
            vendor.id.clone(),
            "body".to_string(),
            Vec::new(),
            ParsedProposal {
                pricing: Pricing {
                    breakdown: Vec::new(),
                    total_price: 45_000.0,
                    discounts: None,
                    currency: "USD".to_string(),
                },
                delivery_details: DeliveryDetails::default(),
                terms: Terms::default(),
                compliance: Compliance::default(),
            },
        );
        proposal.apply_scores(ScoreCard::from_subscores(73, 100, 100, 50));
        ScoredProposal { vendor, proposal }
    }

    #[tokio::test]
    async fn well_formed_reply_becomes_a_recommendation() {
        let generator = RecommendationGenerator::new(Arc::new(CannedLlm {
            reply: r#"{
                "recommendedVendor": "TechNova",
                "overallReasoning": "Best overall score.",
                "keyStrengths": ["price"],
                "riskFactors": [],
                "alternatives": [],
                "decision": "Choose TechNova."
            }"#,
        }));
        let rfp = rfp();

        let recommendation =
            generator.generate(&rfp, &[scored_proposal(&rfp)]).await.expect("generates");
        assert_eq!(recommendation.recommended_vendor, "TechNova");
    }

    #[tokio::test]
    async fn unparseable_reply_degrades_to_fallback_instead_of_failing() {
        let generator = RecommendationGenerator::new(Arc::new(CannedLlm {
            reply: "I think TechNova looks strongest overall, here's why...",
        }));
        let rfp = rfp();

        let recommendation =
            generator.generate(&rfp, &[scored_proposal(&rfp)]).await.expect("degrades, not errors");
        assert_eq!(recommendation.recommended_vendor, "Unable to generate recommendation");
        assert!(recommendation.key_strengths.is_empty());
    }
}
