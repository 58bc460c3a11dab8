//! Demo vendor dataset for local development and walkthroughs.

use procura_core::domain::vendor::Vendor;

use crate::repositories::{RepositoryError, SqlVendorRepository, VendorRepository};
use crate::DbPool;

/// Presence of this address is the idempotency marker for the whole dataset.
const SEED_SENTINEL_EMAIL: &str = "sales@technova-systems.com";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: usize,
    pub already_seeded: bool,
}

pub fn demo_vendors() -> Vec<Vendor> {
    vec![
        Vendor::new(
            "TechNova Systems".to_string(),
            "sales@technova-systems.com",
            Some("Alice Johnson".to_string()),
            Some("+1-415-555-1020".to_string()),
        ),
        Vendor::new(
            "Global IT Solutions".to_string(),
            "rfp@globalitsolutions.co",
            Some("Rahul Mehta".to_string()),
            Some("+91-22-5555-2200".to_string()),
        ),
        Vendor::new(
            "Prime Hardware Supplies".to_string(),
            "quotes@primehardware.example",
            Some("Priya Nair".to_string()),
            Some("+1-212-555-7845".to_string()),
        ),
    ]
}

/// Inserts the demo vendors once; reruns are no-ops.
pub async fn seed_vendors(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
    let repository = SqlVendorRepository::new(pool.clone());

    if repository.find_by_email(SEED_SENTINEL_EMAIL).await?.is_some() {
        return Ok(SeedResult { inserted: 0, already_seeded: true });
    }

    let vendors = demo_vendors();
    let inserted = vendors.len();
    for vendor in &vendors {
        repository.save(vendor).await?;
    }

    Ok(SeedResult { inserted, already_seeded: false })
}
