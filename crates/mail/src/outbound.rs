//! Outbound RFP mail over SMTP.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use procura_core::config::MailConfig;
use procura_core::correlation::rfp_mail_subject;
use procura_core::domain::rfp::Rfp;
use procura_core::domain::vendor::{Vendor, VendorId};

use crate::template::render_rfp_email;

#[derive(Debug, Error)]
pub enum OutboundError {
    #[error("invalid mail address `{address}`: {source}")]
    Address { address: String, source: lettre::address::AddressError },
    #[error("could not compose message: {0}")]
    Compose(#[from] lettre::error::Error),
    #[error("smtp transport failure: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("could not render rfp email body: {0}")]
    Template(#[from] tera::Error),
}

/// Send-one-message boundary. Implementations own the transport details;
/// callers only provide addressee, subject, and an HTML body.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_html(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), OutboundError>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    pub fn new(config: &MailConfig) -> Result<Self, OutboundError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self { transport, from_address: config.sender_address().to_string() })
    }
}

fn parse_address(raw: &str) -> Result<lettre::message::Mailbox, OutboundError> {
    raw.parse().map_err(|source| OutboundError::Address { address: raw.to_string(), source })
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send_html(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), OutboundError> {
        let from = parse_address(&self.from_address)?;
        let message = Message::builder()
            .from(from.clone())
            .reply_to(from)
            .to(parse_address(to)?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())?;

        self.transport.send(message).await?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SendStatus {
    Sent,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub vendor_id: VendorId,
    pub email: String,
    pub status: SendStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Sends one RFP to a batch of vendors. Per-vendor failures are recorded and
/// never abort the batch; partial success is the normal outcome.
pub struct RfpMailer {
    transport: Arc<dyn MailTransport>,
}

impl RfpMailer {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    pub async fn send_rfp_to_vendors(&self, rfp: &Rfp, vendors: &[Vendor]) -> Vec<SendOutcome> {
        let subject = rfp_mail_subject(rfp);
        let body = match render_rfp_email(rfp) {
            Ok(body) => body,
            Err(error) => {
                warn!(
                    event_name = "mail.outbound.render_failed",
                    rfp_id = %rfp.id,
                    error = %error,
                    "rfp email body could not be rendered"
                );
                let message = OutboundError::from(error).to_string();
                return vendors
                    .iter()
                    .map(|vendor| SendOutcome {
                        vendor_id: vendor.id.clone(),
                        email: vendor.email.clone(),
                        status: SendStatus::Failed,
                        error: Some(message.clone()),
                    })
                    .collect();
            }
        };

        let mut outcomes = Vec::with_capacity(vendors.len());
        for vendor in vendors {
            match self.transport.send_html(&vendor.email, &subject, &body).await {
                Ok(()) => {
                    info!(
                        event_name = "mail.outbound.sent",
                        rfp_id = %rfp.id,
                        vendor_id = %vendor.id,
                        "rfp mail sent"
                    );
                    outcomes.push(SendOutcome {
                        vendor_id: vendor.id.clone(),
                        email: vendor.email.clone(),
                        status: SendStatus::Sent,
                        error: None,
                    });
                }
                Err(error) => {
                    warn!(
                        event_name = "mail.outbound.send_failed",
                        rfp_id = %rfp.id,
                        vendor_id = %vendor.id,
                        error = %error,
                        "rfp mail failed for vendor"
                    );
                    outcomes.push(SendOutcome {
                        vendor_id: vendor.id.clone(),
                        email: vendor.email.clone(),
                        status: SendStatus::Failed,
                        error: Some(error.to_string()),
                    });
                }
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use procura_core::domain::rfp::{Budget, Rfp, RfpItem, Specifications};
    use procura_core::domain::vendor::Vendor;

    use super::{MailTransport, OutboundError, RfpMailer, SendStatus};

    struct FlakyTransport;

    #[async_trait]
    impl MailTransport for FlakyTransport {
        async fn send_html(
            &self,
            to: &str,
            subject: &str,
            _html_body: &str,
        ) -> Result<(), OutboundError> {
            assert!(subject.starts_with("Request for Proposal:"));
            if to.contains("invalid") {
                return Err(OutboundError::Address {
                    address: to.to_string(),
                    source: "missing domain".parse::<lettre::Address>().unwrap_err(),
                });
            }
            Ok(())
        }
    }

    fn rfp() -> Rfp {
        Rfp::new(
            "Office Laptops".to_string(),
            "20 laptops".to_string(),
            Specifications {
                items: vec![RfpItem {
                    name: "Laptop".to_string(),
                    quantity: 20,
                    specs: BTreeMap::new(),
                }],
                budget: Budget { total: 50_000.0, currency: "USD".to_string() },
                delivery_terms: Default::default(),
                payment_terms: Default::default(),
                warranty: Default::default(),
            },
        )
    }

    #[tokio::test]
    async fn mixed_batch_reports_per_vendor_outcomes_without_failing() {
        let mailer = RfpMailer::new(Arc::new(FlakyTransport));
        let vendors = vec![
            Vendor::new("A".to_string(), "a@example.com", None, None),
            Vendor::new("B".to_string(), "invalid-address", None, None),
            Vendor::new("C".to_string(), "c@example.com", None, None),
        ];

        let outcomes = mailer.send_rfp_to_vendors(&rfp(), &vendors).await;

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].status, SendStatus::Sent);
        assert_eq!(outcomes[1].status, SendStatus::Failed);
        assert!(outcomes[1].error.as_deref().is_some_and(|e| !e.is_empty()));
        assert_eq!(outcomes[2].status, SendStatus::Sent);
    }

    #[tokio::test]
    async fn empty_vendor_list_is_an_empty_batch() {
        let mailer = RfpMailer::new(Arc::new(FlakyTransport));
        let outcomes = mailer.send_rfp_to_vendors(&rfp(), &[]).await;
        assert!(outcomes.is_empty());
    }
}
