//! In-memory repositories for tests and for wiring experiments without a
//! database file. Behavior mirrors the SQL implementations, including the
//! duplicate-proposal constraint.

use std::collections::HashMap;
use std::sync::Mutex;

use procura_core::domain::proposal::{Proposal, ProposalId};
use procura_core::domain::rfp::{Rfp, RfpId};
use procura_core::domain::vendor::{normalize_email, Vendor, VendorId};

use super::{ProposalRepository, RepositoryError, RfpRepository, VendorRepository};

#[derive(Default)]
pub struct InMemoryRfpRepository {
    rfps: Mutex<HashMap<RfpId, Rfp>>,
}

impl InMemoryRfpRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RfpRepository for InMemoryRfpRepository {
    async fn save(&self, rfp: &Rfp) -> Result<(), RepositoryError> {
        let mut rfps = self.rfps.lock().expect("rfp store lock");
        rfps.insert(rfp.id.clone(), rfp.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RfpId) -> Result<Option<Rfp>, RepositoryError> {
        let rfps = self.rfps.lock().expect("rfp store lock");
        Ok(rfps.get(id).cloned())
    }

    async fn list_newest_first(&self) -> Result<Vec<Rfp>, RepositoryError> {
        let rfps = self.rfps.lock().expect("rfp store lock");
        let mut listed: Vec<Rfp> = rfps.values().cloned().collect();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }
}

#[derive(Default)]
pub struct InMemoryVendorRepository {
    vendors: Mutex<HashMap<VendorId, Vendor>>,
}

impl InMemoryVendorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VendorRepository for InMemoryVendorRepository {
    async fn save(&self, vendor: &Vendor) -> Result<(), RepositoryError> {
        let mut vendors = self.vendors.lock().expect("vendor store lock");
        let normalized = normalize_email(&vendor.email);
        let conflicting = vendors
            .values()
            .any(|existing| existing.id != vendor.id && existing.email == normalized);
        if conflicting {
            return Err(RepositoryError::Decode(format!(
                "vendor email `{normalized}` is already registered"
            )));
        }

        let mut stored = vendor.clone();
        stored.email = normalized;
        vendors.insert(stored.id.clone(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &VendorId) -> Result<Option<Vendor>, RepositoryError> {
        let vendors = self.vendors.lock().expect("vendor store lock");
        Ok(vendors.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, RepositoryError> {
        let normalized = normalize_email(email);
        let vendors = self.vendors.lock().expect("vendor store lock");
        Ok(vendors.values().find(|vendor| vendor.email == normalized).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let vendors = self.vendors.lock().expect("vendor store lock");
        let mut listed: Vec<Vendor> = vendors.values().cloned().collect();
        listed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listed)
    }

    async fn list_by_ids(&self, ids: &[VendorId]) -> Result<Vec<Vendor>, RepositoryError> {
        let vendors = self.vendors.lock().expect("vendor store lock");
        Ok(ids.iter().filter_map(|id| vendors.get(id).cloned()).collect())
    }

    async fn delete(&self, id: &VendorId) -> Result<bool, RepositoryError> {
        let mut vendors = self.vendors.lock().expect("vendor store lock");
        Ok(vendors.remove(id).is_some())
    }
}

#[derive(Default)]
pub struct InMemoryProposalRepository {
    proposals: Mutex<HashMap<ProposalId, Proposal>>,
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn insert(&self, proposal: &Proposal) -> Result<(), RepositoryError> {
        let mut proposals = self.proposals.lock().expect("proposal store lock");
        let duplicate = proposals.values().any(|existing| {
            existing.rfp_id == proposal.rfp_id && existing.vendor_id == proposal.vendor_id
        });
        if duplicate {
            return Err(RepositoryError::DuplicateProposal {
                rfp_id: proposal.rfp_id.0.clone(),
                vendor_id: proposal.vendor_id.0.clone(),
            });
        }

        proposals.insert(proposal.id.clone(), proposal.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, RepositoryError> {
        let proposals = self.proposals.lock().expect("proposal store lock");
        Ok(proposals.get(id).cloned())
    }

    async fn find_by_rfp_and_vendor(
        &self,
        rfp_id: &RfpId,
        vendor_id: &VendorId,
    ) -> Result<Option<Proposal>, RepositoryError> {
        let proposals = self.proposals.lock().expect("proposal store lock");
        Ok(proposals
            .values()
            .find(|proposal| &proposal.rfp_id == rfp_id && &proposal.vendor_id == vendor_id)
            .cloned())
    }

    async fn list_for_rfp_newest_first(
        &self,
        rfp_id: &RfpId,
    ) -> Result<Vec<Proposal>, RepositoryError> {
        let proposals = self.proposals.lock().expect("proposal store lock");
        let mut listed: Vec<Proposal> =
            proposals.values().filter(|proposal| &proposal.rfp_id == rfp_id).cloned().collect();
        listed.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        Ok(listed)
    }
}
