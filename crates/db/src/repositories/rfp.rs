use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use procura_core::domain::proposal::ProposalId;
use procura_core::domain::rfp::{Rfp, RfpId, RfpStatus, Specifications};
use procura_core::domain::vendor::VendorId;

use super::{RepositoryError, RfpRepository};
use crate::DbPool;

pub struct SqlRfpRepository {
    pool: DbPool,
}

impl SqlRfpRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const RFP_COLUMNS: &str = "id,
                title,
                description,
                specifications_json,
                status,
                vendor_ids_json,
                proposal_ids_json,
                created_at";

#[async_trait::async_trait]
impl RfpRepository for SqlRfpRepository {
    async fn save(&self, rfp: &Rfp) -> Result<(), RepositoryError> {
        let specifications_json = to_json("specifications", &rfp.specifications)?;
        let vendor_ids_json = to_json("vendor_ids", &rfp.vendors)?;
        let proposal_ids_json = to_json("proposal_ids", &rfp.proposals)?;

        sqlx::query(
            "INSERT INTO rfp (
                id,
                title,
                description,
                specifications_json,
                status,
                vendor_ids_json,
                proposal_ids_json,
                created_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                specifications_json = excluded.specifications_json,
                status = excluded.status,
                vendor_ids_json = excluded.vendor_ids_json,
                proposal_ids_json = excluded.proposal_ids_json",
        )
        .bind(&rfp.id.0)
        .bind(&rfp.title)
        .bind(&rfp.description)
        .bind(specifications_json)
        .bind(rfp.status.as_str())
        .bind(vendor_ids_json)
        .bind(proposal_ids_json)
        .bind(rfp.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: &RfpId) -> Result<Option<Rfp>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {RFP_COLUMNS} FROM rfp WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(rfp_from_row).transpose()
    }

    async fn list_newest_first(&self) -> Result<Vec<Rfp>, RepositoryError> {
        let rows =
            sqlx::query(&format!("SELECT {RFP_COLUMNS} FROM rfp ORDER BY created_at DESC"))
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(rfp_from_row).collect()
    }
}

fn rfp_from_row(row: SqliteRow) -> Result<Rfp, RepositoryError> {
    let status_raw = row.try_get::<String, _>("status")?;
    let status = RfpStatus::parse(&status_raw)
        .ok_or_else(|| RepositoryError::Decode(format!("unknown rfp status `{status_raw}`")))?;

    let specifications: Specifications =
        from_json("specifications_json", row.try_get("specifications_json")?)?;
    let vendors: Vec<VendorId> = from_json("vendor_ids_json", row.try_get("vendor_ids_json")?)?;
    let proposals: Vec<ProposalId> =
        from_json("proposal_ids_json", row.try_get("proposal_ids_json")?)?;

    Ok(Rfp {
        id: RfpId(row.try_get("id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        specifications,
        status,
        vendors,
        proposals,
        created_at: parse_timestamp("created_at", row.try_get("created_at")?)?,
    })
}

pub(crate) fn to_json<T: serde::Serialize>(
    field: &str,
    value: &T,
) -> Result<String, RepositoryError> {
    serde_json::to_string(value)
        .map_err(|error| RepositoryError::Decode(format!("could not encode {field}: {error}")))
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    field: &str,
    raw: String,
) -> Result<T, RepositoryError> {
    serde_json::from_str(&raw)
        .map_err(|error| RepositoryError::Decode(format!("could not decode {field}: {error}")))
}

pub(crate) fn parse_timestamp(field: &str, raw: String) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(&raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|error| RepositoryError::Decode(format!("invalid {field} timestamp: {error}")))
}
