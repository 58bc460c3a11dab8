//! MIME decoding of raw inbound messages.

use mail_parser::{MessageParser, MimeHeaders};

use procura_core::domain::proposal::EmailAttachment;

use crate::inbox::{InboundEmail, InboxError};

/// Decodes a raw RFC 822 message into the fields the ingestion pipeline
/// needs: sender, subject, plain-text body, and attachments. Text-typed
/// attachment contents are kept; binary attachments keep only their metadata.
pub fn parse_inbound(uid: u32, raw: &[u8]) -> Result<InboundEmail, InboxError> {
    let message = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| InboxError::Parse(format!("message {uid} could not be parsed as MIME")))?;

    let from_address = message
        .from()
        .and_then(|from| from.first())
        .and_then(|sender| sender.address())
        .map(str::to_string)
        .unwrap_or_default();

    let subject = message.subject().unwrap_or_default().to_string();

    let body_text = message
        .body_text(0)
        .map(|text| text.to_string())
        .or_else(|| message.body_html(0).map(|html| html.to_string()))
        .unwrap_or_default();

    let attachments = message
        .attachments()
        .map(|part| {
            let content_type = part
                .content_type()
                .map(|ct| match ct.subtype() {
                    Some(subtype) => format!("{}/{}", ct.ctype(), subtype),
                    None => ct.ctype().to_string(),
                })
                .unwrap_or_else(|| "application/octet-stream".to_string());

            let is_text = content_type.contains("text");
            EmailAttachment {
                filename: part.attachment_name().unwrap_or("attachment").to_string(),
                content_type,
                content: is_text
                    .then(|| part.text_contents().map(str::to_string))
                    .flatten(),
            }
        })
        .collect();

    Ok(InboundEmail { uid, from_address, subject, body_text, attachments })
}

#[cfg(test)]
mod tests {
    use super::parse_inbound;

    fn raw_message(subject: &str) -> Vec<u8> {
        format!(
            "From: Alice Johnson <Sales@TechNova-Systems.com>\r\n\
             To: procurement@example.com\r\n\
             Subject: {subject}\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: text/plain; charset=utf-8\r\n\
             \r\n\
             We can supply 20 laptops for $45,000. Lead time 3 weeks.\r\n"
        )
        .into_bytes()
    }

    #[test]
    fn decodes_sender_subject_and_body() {
        let email = parse_inbound(7, &raw_message("Re: Request for Proposal")).expect("parses");

        assert_eq!(email.uid, 7);
        assert_eq!(email.from_address, "Sales@TechNova-Systems.com");
        assert_eq!(email.subject, "Re: Request for Proposal");
        assert!(email.body_text.contains("$45,000"));
        assert!(email.attachments.is_empty());
    }

    #[test]
    fn keeps_text_attachment_content_and_binary_metadata_only() {
        let raw = concat!(
            "From: sales@technova.com\r\n",
            "Subject: Re: proposal\r\n",
            "MIME-Version: 1.0\r\n",
            "Content-Type: multipart/mixed; boundary=\"b1\"\r\n",
            "\r\n",
            "--b1\r\n",
            "Content-Type: text/plain\r\n",
            "\r\n",
            "See attached pricing.\r\n",
            "--b1\r\n",
            "Content-Type: text/csv\r\n",
            "Content-Disposition: attachment; filename=\"pricing.csv\"\r\n",
            "\r\n",
            "item,price\r\nlaptop,1200\r\n",
            "--b1\r\n",
            "Content-Type: application/pdf\r\n",
            "Content-Disposition: attachment; filename=\"brochure.pdf\"\r\n",
            "Content-Transfer-Encoding: base64\r\n",
            "\r\n",
            "JVBERi0xLjQK\r\n",
            "--b1--\r\n",
        )
        .as_bytes();

        let email = parse_inbound(1, raw).expect("parses");
        assert_eq!(email.attachments.len(), 2);

        let csv = &email.attachments[0];
        assert_eq!(csv.filename, "pricing.csv");
        assert!(csv.content.as_deref().is_some_and(|c| c.contains("laptop,1200")));

        let pdf = &email.attachments[1];
        assert_eq!(pdf.filename, "brochure.pdf");
        assert!(pdf.content.is_none());
    }

    #[test]
    fn garbage_bytes_are_a_parse_error() {
        // mail-parser is lenient; a completely empty message is the reliable
        // unparseable case.
        assert!(parse_inbound(1, b"").is_err());
    }
}
