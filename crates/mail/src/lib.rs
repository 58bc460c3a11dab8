pub mod inbox;
pub mod message;
pub mod outbound;
pub mod template;

pub use inbox::{ImapMailbox, InboundEmail, InboxError, Mailbox};
pub use message::parse_inbound;
pub use outbound::{
    MailTransport, OutboundError, RfpMailer, SendOutcome, SendStatus, SmtpMailer,
};
pub use template::render_rfp_email;
