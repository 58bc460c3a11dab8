use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::rfp::RfpId;
use crate::domain::vendor::VendorId;
use crate::scoring::ScoreCard;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProposalId(pub String);

impl ProposalId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string()[..24].to_string())
    }
}

impl std::fmt::Display for ProposalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Parsed,
    Evaluated,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parsed => "parsed",
            Self::Evaluated => "evaluated",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "parsed" => Some(Self::Parsed),
            "evaluated" => Some(Self::Evaluated),
            _ => None,
        }
    }
}

/// One line of the vendor's itemized pricing, as extracted from the email.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingLine {
    pub item_name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub subtotal: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    #[serde(default)]
    pub breakdown: Vec<PricingLine>,
    /// Required: the scoring function has no meaningful output without it.
    pub total_price: f64,
    #[serde(default)]
    pub discounts: Option<String>,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
    #[serde(default)]
    pub estimated_date: Option<String>,
    #[serde(default)]
    pub lead_time: Option<String>,
    #[serde(default)]
    pub shipping_cost: Option<f64>,
    #[serde(default)]
    pub conditions: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Terms {
    #[serde(default)]
    pub payment_terms: Option<String>,
    #[serde(default)]
    pub warranty: Option<String>,
    #[serde(default)]
    pub support_level: Option<String>,
    #[serde(default)]
    pub sla: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compliance {
    #[serde(default)]
    pub specs_matched: Vec<String>,
    #[serde(default)]
    pub specs_not_matched: Vec<String>,
    #[serde(default)]
    pub additional_offerings: Vec<String>,
}

/// The structured payload an extractor recovers from a vendor's free-text
/// reply. Field names mirror the JSON contract given to the language model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedProposal {
    pub pricing: Pricing,
    pub delivery_details: DeliveryDetails,
    pub terms: Terms,
    pub compliance: Compliance,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl EmailAttachment {
    pub fn is_text(&self) -> bool {
        self.content_type.contains("text")
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    pub rfp_id: RfpId,
    pub vendor_id: VendorId,
    pub raw_email_body: String,
    pub raw_attachments: Vec<EmailAttachment>,
    pub parsed: ParsedProposal,
    pub scores: Option<ScoreCard>,
    pub status: ProposalStatus,
    pub received_at: DateTime<Utc>,
}

impl Proposal {
    pub fn from_email(
        rfp_id: RfpId,
        vendor_id: VendorId,
        raw_email_body: String,
        raw_attachments: Vec<EmailAttachment>,
        parsed: ParsedProposal,
    ) -> Self {
        Self {
            id: ProposalId::generate(),
            rfp_id,
            vendor_id,
            raw_email_body,
            raw_attachments,
            parsed,
            scores: None,
            status: ProposalStatus::Parsed,
            received_at: Utc::now(),
        }
    }

    /// Scoring happens once, at ingestion time; a scored proposal is
    /// considered evaluated and is never re-scored.
    pub fn apply_scores(&mut self, scores: ScoreCard) {
        self.scores = Some(scores);
        self.status = ProposalStatus::Evaluated;
    }
}
