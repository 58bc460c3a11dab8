//! Inbound mailbox access.
//!
//! Each sweep is a cold start: connect, search unseen mail inside the window,
//! fetch and decode, flag seen, disconnect. Messages are flagged seen at
//! sweep time — whatever the downstream pipeline decides, a message is never
//! picked up twice.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use procura_core::config::MailConfig;
use procura_core::domain::proposal::EmailAttachment;

use crate::message::parse_inbound;

#[derive(Debug, Error)]
pub enum InboxError {
    #[error("could not reach mailbox host: {0}")]
    Connect(#[from] std::io::Error),
    #[error("tls negotiation failed: {0}")]
    Tls(#[from] async_native_tls::Error),
    #[error("imap failure: {0}")]
    Imap(#[from] async_imap::error::Error),
    #[error("message decode failure: {0}")]
    Parse(String),
}

/// One decoded inbound message, ready for the ingestion pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct InboundEmail {
    pub uid: u32,
    pub from_address: String,
    pub subject: String,
    pub body_text: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Mailbox boundary: collect-and-flag the unseen messages newer than
/// `since`. Connection or search failures fail the whole sweep; a single
/// undecodable message is logged and dropped.
#[async_trait]
pub trait Mailbox: Send + Sync {
    async fn sweep_unseen(&self, since: DateTime<Utc>) -> Result<Vec<InboundEmail>, InboxError>;
}

pub struct ImapMailbox {
    host: String,
    port: u16,
    username: String,
    password: SecretString,
}

impl ImapMailbox {
    pub fn new(config: &MailConfig) -> Self {
        Self {
            host: config.imap_host.clone(),
            port: config.imap_port,
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }
}

/// IMAP SEARCH dates are day-granular `dd-Mon-yyyy`.
fn imap_since(since: DateTime<Utc>) -> String {
    since.format("%d-%b-%Y").to_string()
}

#[async_trait]
impl Mailbox for ImapMailbox {
    async fn sweep_unseen(&self, since: DateTime<Utc>) -> Result<Vec<InboundEmail>, InboxError> {
        let tcp = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let tls = async_native_tls::TlsConnector::new();
        let tls_stream = tls.connect(&self.host, tcp).await?;

        let client = async_imap::Client::new(tls_stream);
        let mut session = client
            .login(&self.username, self.password.expose_secret())
            .await
            .map_err(|(error, _client)| error)?;

        session.select("INBOX").await?;

        let query = format!("UNSEEN SINCE {}", imap_since(since));
        let uids = session.uid_search(&query).await?;
        if uids.is_empty() {
            session.logout().await.ok();
            return Ok(Vec::new());
        }

        let uid_set =
            uids.iter().map(u32::to_string).collect::<Vec<_>>().join(",");

        let mut emails = Vec::with_capacity(uids.len());
        {
            let mut fetch_stream = session.uid_fetch(&uid_set, "(UID RFC822)").await?;
            while let Some(fetched) = fetch_stream.try_next().await? {
                let uid = match fetched.uid {
                    Some(uid) => uid,
                    None => continue,
                };
                let body = match fetched.body() {
                    Some(body) => body,
                    None => continue,
                };
                match parse_inbound(uid, body) {
                    Ok(email) => emails.push(email),
                    Err(error) => {
                        warn!(
                            event_name = "mail.inbox.undecodable_message",
                            uid,
                            error = %error,
                            "skipping message that could not be decoded"
                        );
                    }
                }
            }
        }

        // Flag everything the search returned, decodable or not.
        {
            let store_stream = session.uid_store(&uid_set, "+FLAGS (\\Seen)").await?;
            store_stream.try_collect::<Vec<_>>().await?;
        }

        debug!(
            event_name = "mail.inbox.sweep_complete",
            unseen = uids.len(),
            decoded = emails.len(),
            "mailbox sweep finished"
        );

        session.logout().await.ok();
        Ok(emails)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::imap_since;

    #[test]
    fn search_dates_use_imap_day_format() {
        let since = chrono::Utc.with_ymd_and_hms(2026, 8, 4, 18, 30, 0).unwrap();
        assert_eq!(imap_since(since), "04-Aug-2026");
    }
}
