//! The proposal ingestion pipeline.
//!
//! One poll cycle: sweep the mailbox for unseen replies, fan the matched
//! messages out through extraction + scoring + persistence, and return the
//! proposals that were created. Mailbox failures abort the cycle; everything
//! that goes wrong inside a single message's pipeline is logged and the
//! cycle carries on.

use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tracing::{debug, info, warn};

use procura_ai::extract::{ExtractError, ProposalExtractor};
use procura_core::correlation::extract_rfp_id;
use procura_core::domain::proposal::{EmailAttachment, Proposal};
use procura_core::domain::rfp::RfpId;
use procura_core::scoring::{evaluate_proposal, ScoringError};
use procura_db::repositories::{
    ProposalRepository, RepositoryError, RfpRepository, VendorRepository,
};
use procura_mail::inbox::{InboundEmail, InboxError, Mailbox};

#[derive(Debug, Error)]
pub enum PollError {
    #[error("mailbox sweep failed: {0}")]
    Inbox(#[from] InboxError),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("reply references rfp `{rfp_id}` which does not exist")]
    RfpNotFound { rfp_id: RfpId },
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub struct IngestPipeline {
    mailbox: Arc<dyn Mailbox>,
    extractor: ProposalExtractor,
    rfps: Arc<dyn RfpRepository>,
    vendors: Arc<dyn VendorRepository>,
    proposals: Arc<dyn ProposalRepository>,
    poll_window: Duration,
    max_concurrent: usize,
}

impl IngestPipeline {
    pub fn new(
        mailbox: Arc<dyn Mailbox>,
        extractor: ProposalExtractor,
        rfps: Arc<dyn RfpRepository>,
        vendors: Arc<dyn VendorRepository>,
        proposals: Arc<dyn ProposalRepository>,
        poll_window_hours: u64,
        max_concurrent: u32,
    ) -> Self {
        Self {
            mailbox,
            extractor,
            rfps,
            vendors,
            proposals,
            poll_window: Duration::hours(poll_window_hours.min(i64::MAX as u64) as i64),
            max_concurrent: max_concurrent.max(1) as usize,
        }
    }

    /// Runs one poll cycle and returns the proposals it created. Ordering of
    /// the result follows completion order of the per-message pipelines and
    /// must not be relied upon.
    pub async fn poll_once(&self) -> Result<Vec<Proposal>, PollError> {
        let since = Utc::now() - self.poll_window;
        let emails = self.mailbox.sweep_unseen(since).await?;

        if emails.is_empty() {
            debug!(event_name = "ingest.poll.no_unseen_mail", "poll cycle found nothing new");
            return Ok(Vec::new());
        }

        info!(
            event_name = "ingest.poll.sweep_complete",
            unseen = emails.len(),
            "processing unseen replies"
        );

        let outcomes = stream::iter(emails)
            .map(|email| async move {
                let uid = email.uid;
                (uid, self.ingest_message(email).await)
            })
            .buffer_unordered(self.max_concurrent)
            .collect::<Vec<_>>()
            .await;

        let mut created = Vec::new();
        for (uid, outcome) in outcomes {
            match outcome {
                Ok(Some(proposal)) => created.push(proposal),
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        event_name = "ingest.poll.message_failed",
                        uid,
                        error = %error,
                        "reply dropped; poll cycle continues"
                    );
                }
            }
        }

        info!(
            event_name = "ingest.poll.cycle_complete",
            created = created.len(),
            "poll cycle finished"
        );
        Ok(created)
    }

    /// Per-message pipeline. `Ok(None)` is a deliberate skip (unknown sender,
    /// no correlation key, duplicate); errors are the caller's to isolate.
    async fn ingest_message(&self, email: InboundEmail) -> Result<Option<Proposal>, IngestError> {
        let Some(mut vendor) = self.vendors.find_by_email(&email.from_address).await? else {
            debug!(
                event_name = "ingest.message.unknown_sender",
                uid = email.uid,
                "sender does not match a vendor; skipping"
            );
            return Ok(None);
        };

        let Some(rfp_id) = extract_rfp_id(&email.subject) else {
            debug!(
                event_name = "ingest.message.no_correlation_key",
                uid = email.uid,
                vendor_id = %vendor.id,
                "subject carries no rfp identifier; skipping"
            );
            return Ok(None);
        };

        if self.proposals.find_by_rfp_and_vendor(&rfp_id, &vendor.id).await?.is_some() {
            info!(
                event_name = "ingest.message.duplicate_proposal",
                uid = email.uid,
                rfp_id = %rfp_id,
                vendor_id = %vendor.id,
                "proposal already exists for this rfp and vendor; skipping"
            );
            return Ok(None);
        }

        let Some(mut rfp) = self.rfps.find_by_id(&rfp_id).await? else {
            return Err(IngestError::RfpNotFound { rfp_id });
        };

        let content = flatten_content(&email.body_text, &email.attachments);
        let parsed = self.extractor.extract(&content).await?;
        let scores = evaluate_proposal(&rfp.specifications, &parsed)?;

        let mut proposal = Proposal::from_email(
            rfp_id,
            vendor.id.clone(),
            email.body_text,
            email.attachments,
            parsed,
        );
        proposal.apply_scores(scores);

        match self.proposals.insert(&proposal).await {
            Ok(()) => {}
            Err(RepositoryError::DuplicateProposal { rfp_id, vendor_id }) => {
                // A concurrent cycle got there first; treat like the lookup skip.
                info!(
                    event_name = "ingest.message.duplicate_proposal_race",
                    uid = email.uid,
                    rfp_id,
                    vendor_id,
                    "lost duplicate race on insert; skipping"
                );
                return Ok(None);
            }
            Err(error) => return Err(error.into()),
        }

        rfp.record_proposal(proposal.id.clone());
        self.rfps.save(&rfp).await?;

        vendor.record_proposal(proposal.id.clone());
        self.vendors.save(&vendor).await?;

        info!(
            event_name = "ingest.message.proposal_created",
            proposal_id = %proposal.id,
            rfp_id = %proposal.rfp_id,
            vendor_id = %proposal.vendor_id,
            overall = proposal.scores.as_ref().map(|scores| scores.overall),
            "proposal created and scored"
        );

        Ok(Some(proposal))
    }
}

/// Flattens an email into one extraction input: the plain-text body followed
/// by each attachment as a labeled block. Only text-typed attachment
/// contents are included.
pub fn flatten_content(body: &str, attachments: &[EmailAttachment]) -> String {
    let mut content = body.to_string();

    for attachment in attachments {
        content.push_str("\n\n[Attachment: ");
        content.push_str(&attachment.filename);
        content.push(']');
        if attachment.is_text() {
            if let Some(text) = &attachment.content {
                content.push('\n');
                content.push_str(text);
            }
        }
    }

    content
}
