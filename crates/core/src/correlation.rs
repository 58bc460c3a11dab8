//! Subject-line correlation between outbound RFP mail and inbound replies.
//!
//! The RFP identifier is embedded in the outbound subject and recovered from
//! reply subjects as the first 24-character hexadecimal substring. A reply
//! whose subject loses the identifier is unmatchable and will be skipped.

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::domain::rfp::{Rfp, RfpId};

fn rfp_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)[a-f0-9]{24}").expect("valid rfp id pattern"))
}

/// Extracts the first 24-hex-char identifier from a subject line, lowercased
/// to match stored ids. Returns `None` when no identifier is present.
pub fn extract_rfp_id(subject: &str) -> Option<RfpId> {
    rfp_id_pattern()
        .find(subject)
        .map(|found| RfpId(found.as_str().to_ascii_lowercase()))
}

/// Subject for outbound RFP mail; the trailing id is the correlation key.
pub fn rfp_mail_subject(rfp: &Rfp) -> String {
    format!("Request for Proposal: {} - {}", rfp.title, rfp.id)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::domain::rfp::{Budget, Rfp, RfpItem, Specifications};

    use super::{extract_rfp_id, rfp_mail_subject};

    #[test]
    fn extracts_identifier_from_reply_subject() {
        let id = extract_rfp_id("Re: Request for Proposal: Laptops - 64f1a2b3c4d5e6f708192a3b");
        assert_eq!(id.expect("id present").0, "64f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn uppercase_identifiers_are_folded_to_stored_form() {
        let id = extract_rfp_id("RE: 64F1A2B3C4D5E6F708192A3B");
        assert_eq!(id.expect("id present").0, "64f1a2b3c4d5e6f708192a3b");
    }

    #[test]
    fn subject_without_identifier_matches_nothing() {
        assert!(extract_rfp_id("Re: our proposal for the laptop order").is_none());
        assert!(extract_rfp_id("").is_none());
    }

    #[test]
    fn short_hex_runs_are_not_identifiers() {
        assert!(extract_rfp_id("order ref abc123 deadbeef").is_none());
    }

    #[test]
    fn outbound_subject_round_trips_through_extraction() {
        let rfp = Rfp::new(
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
        );

        let subject = rfp_mail_subject(&rfp);
        let recovered = extract_rfp_id(&subject).expect("subject carries the id");
        assert_eq!(recovered, rfp.id);
    }
}
