use async_trait::async_trait;
use thiserror::Error;

use procura_core::domain::proposal::{Proposal, ProposalId};
use procura_core::domain::rfp::{Rfp, RfpId};
use procura_core::domain::vendor::{Vendor, VendorId};

pub mod memory;
pub mod proposal;
pub mod rfp;
pub mod vendor;

pub use memory::{InMemoryProposalRepository, InMemoryRfpRepository, InMemoryVendorRepository};
pub use proposal::SqlProposalRepository;
pub use rfp::SqlRfpRepository;
pub use vendor::SqlVendorRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("a proposal already exists for rfp `{rfp_id}` and vendor `{vendor_id}`")]
    DuplicateProposal { rfp_id: String, vendor_id: String },
}

#[async_trait]
pub trait RfpRepository: Send + Sync {
    async fn save(&self, rfp: &Rfp) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &RfpId) -> Result<Option<Rfp>, RepositoryError>;
    async fn list_newest_first(&self) -> Result<Vec<Rfp>, RepositoryError>;
}

#[async_trait]
pub trait VendorRepository: Send + Sync {
    async fn save(&self, vendor: &Vendor) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &VendorId) -> Result<Option<Vendor>, RepositoryError>;
    /// Lookup by normalized (trimmed, case-folded) address; callers may pass
    /// the raw sender address.
    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, RepositoryError>;
    async fn list_all(&self) -> Result<Vec<Vendor>, RepositoryError>;
    async fn list_by_ids(&self, ids: &[VendorId]) -> Result<Vec<Vendor>, RepositoryError>;
    async fn delete(&self, id: &VendorId) -> Result<bool, RepositoryError>;
}

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Inserts a new proposal. A second proposal for the same (rfp, vendor)
    /// pair fails with [`RepositoryError::DuplicateProposal`].
    async fn insert(&self, proposal: &Proposal) -> Result<(), RepositoryError>;
    async fn find_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, RepositoryError>;
    async fn find_by_rfp_and_vendor(
        &self,
        rfp_id: &RfpId,
        vendor_id: &VendorId,
    ) -> Result<Option<Proposal>, RepositoryError>;
    async fn list_for_rfp_newest_first(
        &self,
        rfp_id: &RfpId,
    ) -> Result<Vec<Proposal>, RepositoryError>;
}
