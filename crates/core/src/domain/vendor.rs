use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::proposal::ProposalId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VendorId(pub String);

impl VendorId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string()[..24].to_string())
    }
}

impl std::fmt::Display for VendorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorStatus {
    Active,
    Inactive,
}

impl VendorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

/// Canonical form used for inbound-mail sender matching: trimmed and
/// case-folded. Vendor emails are stored in this form.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub email: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub status: VendorStatus,
    pub previous_proposals: Vec<ProposalId>,
    pub created_at: DateTime<Utc>,
}

impl Vendor {
    pub fn new(
        name: String,
        email: &str,
        contact_person: Option<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            id: VendorId::generate(),
            name,
            email: normalize_email(email),
            contact_person,
            phone,
            status: VendorStatus::Active,
            previous_proposals: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn record_proposal(&mut self, proposal_id: ProposalId) {
        if !self.previous_proposals.contains(&proposal_id) {
            self.previous_proposals.push(proposal_id);
        }
    }
}
