use sqlx::{sqlite::SqliteRow, Row};

use procura_core::domain::proposal::{
    EmailAttachment, ParsedProposal, Proposal, ProposalId, ProposalStatus,
};
use procura_core::domain::rfp::RfpId;
use procura_core::domain::vendor::VendorId;
use procura_core::scoring::ScoreCard;

use super::rfp::{from_json, parse_timestamp, to_json};
use super::{ProposalRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProposalRepository {
    pool: DbPool,
}

impl SqlProposalRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const PROPOSAL_COLUMNS: &str = "id,
                rfp_id,
                vendor_id,
                raw_email_body,
                raw_attachments_json,
                parsed_json,
                scores_json,
                status,
                received_at";

#[async_trait::async_trait]
impl ProposalRepository for SqlProposalRepository {
    async fn insert(&self, proposal: &Proposal) -> Result<(), RepositoryError> {
        let raw_attachments_json = to_json("raw_attachments", &proposal.raw_attachments)?;
        let parsed_json = to_json("parsed", &proposal.parsed)?;
        let scores_json = proposal
            .scores
            .as_ref()
            .map(|scores| to_json("scores", scores))
            .transpose()?;

        let result = sqlx::query(
            "INSERT INTO proposal (
                id,
                rfp_id,
                vendor_id,
                raw_email_body,
                raw_attachments_json,
                parsed_json,
                scores_json,
                status,
                received_at
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&proposal.id.0)
        .bind(&proposal.rfp_id.0)
        .bind(&proposal.vendor_id.0)
        .bind(&proposal.raw_email_body)
        .bind(raw_attachments_json)
        .bind(parsed_json)
        .bind(scores_json)
        .bind(proposal.status.as_str())
        .bind(proposal.received_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_error)) if db_error.is_unique_violation() => {
                Err(RepositoryError::DuplicateProposal {
                    rfp_id: proposal.rfp_id.0.clone(),
                    vendor_id: proposal.vendor_id.0.clone(),
                })
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn find_by_id(&self, id: &ProposalId) -> Result<Option<Proposal>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PROPOSAL_COLUMNS} FROM proposal WHERE id = ?"))
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.map(proposal_from_row).transpose()
    }

    async fn find_by_rfp_and_vendor(
        &self,
        rfp_id: &RfpId,
        vendor_id: &VendorId,
    ) -> Result<Option<Proposal>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposal WHERE rfp_id = ? AND vendor_id = ?"
        ))
        .bind(&rfp_id.0)
        .bind(&vendor_id.0)
        .fetch_optional(&self.pool)
        .await?;

        row.map(proposal_from_row).transpose()
    }

    async fn list_for_rfp_newest_first(
        &self,
        rfp_id: &RfpId,
    ) -> Result<Vec<Proposal>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {PROPOSAL_COLUMNS} FROM proposal
             WHERE rfp_id = ?
             ORDER BY received_at DESC"
        ))
        .bind(&rfp_id.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(proposal_from_row).collect()
    }
}

fn proposal_from_row(row: SqliteRow) -> Result<Proposal, RepositoryError> {
    let status_raw = row.try_get::<String, _>("status")?;
    let status = ProposalStatus::parse(&status_raw).ok_or_else(|| {
        RepositoryError::Decode(format!("unknown proposal status `{status_raw}`"))
    })?;

    let raw_attachments: Vec<EmailAttachment> =
        from_json("raw_attachments_json", row.try_get("raw_attachments_json")?)?;
    let parsed: ParsedProposal = from_json("parsed_json", row.try_get("parsed_json")?)?;
    let scores: Option<ScoreCard> = row
        .try_get::<Option<String>, _>("scores_json")?
        .map(|raw| from_json("scores_json", raw))
        .transpose()?;

    Ok(Proposal {
        id: ProposalId(row.try_get("id")?),
        rfp_id: RfpId(row.try_get("rfp_id")?),
        vendor_id: VendorId(row.try_get("vendor_id")?),
        raw_email_body: row.try_get("raw_email_body")?,
        raw_attachments,
        parsed,
        scores,
        status,
        received_at: parse_timestamp("received_at", row.try_get("received_at")?)?,
    })
}
