use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::proposal::ProposalId;
use crate::domain::vendor::VendorId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RfpId(pub String);

impl RfpId {
    /// New ids are 24 lowercase hex characters so they can travel in mail
    /// subject lines and be recovered by the correlation matcher.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..24].to_string())
    }
}

impl std::fmt::Display for RfpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfpStatus {
    Draft,
    Sent,
    ResponsesReceived,
}

impl RfpStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::ResponsesReceived => "responses_received",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "responses_received" => Some(Self::ResponsesReceived),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfpItem {
    pub name: String,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub total: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTerms {
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub lead_time_days: Option<u32>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTerms {
    #[serde(default)]
    pub net_days: Option<u32>,
    #[serde(default)]
    pub milestone: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warranty {
    #[serde(default)]
    pub period: Option<u32>,
    #[serde(default)]
    pub coverage: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specifications {
    #[serde(default)]
    pub items: Vec<RfpItem>,
    pub budget: Budget,
    #[serde(default)]
    pub delivery_terms: DeliveryTerms,
    #[serde(default)]
    pub payment_terms: PaymentTerms,
    #[serde(default)]
    pub warranty: Warranty,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rfp {
    pub id: RfpId,
    pub title: String,
    pub description: String,
    pub specifications: Specifications,
    pub status: RfpStatus,
    pub vendors: Vec<VendorId>,
    pub proposals: Vec<ProposalId>,
    pub created_at: DateTime<Utc>,
}

impl Rfp {
    pub fn new(title: String, description: String, specifications: Specifications) -> Self {
        Self {
            id: RfpId::generate(),
            title,
            description,
            specifications,
            status: RfpStatus::Draft,
            vendors: Vec::new(),
            proposals: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn can_transition_to(&self, next: RfpStatus) -> bool {
        matches!(
            (self.status, next),
            (RfpStatus::Draft, RfpStatus::Sent)
                | (RfpStatus::Draft, RfpStatus::ResponsesReceived)
                | (RfpStatus::Sent, RfpStatus::ResponsesReceived)
        )
    }

    pub fn transition_to(&mut self, next: RfpStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidRfpTransition { from: self.status, to: next })
    }

    /// Records an accepted proposal: appends the reference (once) and moves
    /// the lifecycle to `responses_received` when it is not there already.
    pub fn record_proposal(&mut self, proposal_id: ProposalId) {
        if !self.proposals.contains(&proposal_id) {
            self.proposals.push(proposal_id);
        }
        if self.status != RfpStatus::ResponsesReceived {
            let _ = self.transition_to(RfpStatus::ResponsesReceived);
        }
    }
}
