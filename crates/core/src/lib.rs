pub mod config;
pub mod correlation;
pub mod domain;
pub mod errors;
pub mod scoring;

pub use correlation::{extract_rfp_id, rfp_mail_subject};
pub use domain::proposal::{
    Compliance, DeliveryDetails, EmailAttachment, ParsedProposal, Pricing, PricingLine, Proposal,
    ProposalId, ProposalStatus, Terms,
};
pub use domain::recommendation::{Alternative, Comparison, Recommendation, ScoredProposal};
pub use domain::rfp::{
    Budget, DeliveryTerms, PaymentTerms, Rfp, RfpId, RfpItem, RfpStatus, Specifications, Warranty,
};
pub use domain::vendor::{normalize_email, Vendor, VendorId, VendorStatus};
pub use errors::DomainError;
pub use scoring::{evaluate_proposal, ScoreCard, ScoreWeights, ScoringError};
