use sqlx::{sqlite::SqliteRow, Row};

use procura_core::domain::proposal::ProposalId;
use procura_core::domain::vendor::{normalize_email, Vendor, VendorId, VendorStatus};

use super::rfp::{from_json, parse_timestamp, to_json};
use super::{RepositoryError, VendorRepository};
use crate::DbPool;

pub struct SqlVendorRepository {
    pool: DbPool,
}

impl SqlVendorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const VENDOR_COLUMNS: &str = "id,
                name,
                email,
                contact_person,
                phone,
                status,
                previous_proposal_ids_json,
                created_at";

#[async_trait::async_trait]
impl VendorRepository for SqlVendorRepository {
    async fn save(&self, vendor: &Vendor) -> Result<(), RepositoryError> {
        let previous_proposal_ids_json =
            to_json("previous_proposal_ids", &vendor.previous_proposals)?;

        sqlx::query(
            "INSERT INTO vendor (
                id,
                name,
                email,
                contact_person,
                phone,
                status,
                previous_proposal_ids_json,
                created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                contact_person = excluded.contact_person,
                phone = excluded.phone,
                status = excluded.status,
                previous_proposal_ids_json = excluded.previous_proposal_ids_json",
        )
        .bind(&vendor.id.0)
        .bind(&vendor.name)
        .bind(normalize_email(&vendor.email))
        .bind(vendor.contact_person.as_deref())
        .bind(vendor.phone.as_deref())
        .bind(vendor.status.as_str())
        .bind(previous_proposal_ids_json)
        .bind(vendor.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &VendorId) -> Result<Option<Vendor>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {VENDOR_COLUMNS} FROM vendor WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(vendor_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Vendor>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {VENDOR_COLUMNS} FROM vendor WHERE email = ?"))
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;

        row.map(vendor_from_row).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Vendor>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {VENDOR_COLUMNS} FROM vendor ORDER BY name ASC"))
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(vendor_from_row).collect()
    }

    async fn list_by_ids(&self, ids: &[VendorId]) -> Result<Vec<Vendor>, RepositoryError> {
        let mut vendors = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(vendor) = self.find_by_id(id).await? {
                vendors.push(vendor);
            }
        }
        Ok(vendors)
    }

    async fn delete(&self, id: &VendorId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM vendor WHERE id = ?")
            .bind(&id.0)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn vendor_from_row(row: SqliteRow) -> Result<Vendor, RepositoryError> {
    let status_raw = row.try_get::<String, _>("status")?;
    let status = VendorStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown vendor status `{status_raw}`")))?;

    let previous_proposals: Vec<ProposalId> = from_json(
        "previous_proposal_ids_json",
        row.try_get("previous_proposal_ids_json")?,
    )?;

    Ok(Vendor {
        id: VendorId(row.try_get("id")?),
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        contact_person: row.try_get("contact_person")?,
        phone: row.try_get("phone")?,
        status,
        previous_proposals,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use procura_core::domain::vendor::Vendor;

    use super::SqlVendorRepository;
    use crate::repositories::VendorRepository;
    use crate::{connect_with_settings, migrations};

    async fn repository() -> SqlVendorRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");
        SqlVendorRepository::new(pool)
    }

    #[tokio::test]
    async fn lookup_by_email_is_case_and_whitespace_insensitive() {
        let repository = repository().await;
        let vendor = Vendor::new(
            "TechNova Systems".to_string(),
            "sales@technova-systems.com",
            Some("Alice Johnson".to_string()),
            Some("+1-415-555-1020".to_string()),
        );
        repository.save(&vendor).await.expect("save");

        let found = repository
            .find_by_email("  Sales@TechNova-Systems.COM ")
            .await
            .expect("query")
            .expect("vendor matched");
        assert_eq!(found.id, vendor.id);
    }

    #[tokio::test]
    async fn unknown_sender_matches_no_vendor() {
        let repository = repository().await;
        let missing = repository.find_by_email("stranger@example.com").await.expect("query");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_schema() {
        let repository = repository().await;
        let first = Vendor::new("TechNova".to_string(), "sales@technova.com", None, None);
        let second = Vendor::new("Impostor".to_string(), "SALES@technova.com", None, None);

        repository.save(&first).await.expect("save first");
        assert!(repository.save(&second).await.is_err(), "same normalized email must conflict");
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed() {
        let repository = repository().await;
        let vendor = Vendor::new("TechNova".to_string(), "sales@technova.com", None, None);
        repository.save(&vendor).await.expect("save");

        assert!(repository.delete(&vendor.id).await.expect("delete"));
        assert!(!repository.delete(&vendor.id).await.expect("second delete"));
    }

    #[tokio::test]
    async fn list_by_ids_skips_unknown_references() {
        let repository = repository().await;
        let vendor = Vendor::new("TechNova".to_string(), "sales@technova.com", None, None);
        repository.save(&vendor).await.expect("save");

        let listed = repository
            .list_by_ids(&[
                vendor.id.clone(),
                procura_core::domain::vendor::VendorId("missing".to_string()),
            ])
            .await
            .expect("list");
        assert_eq!(listed.len(), 1);
    }
}
