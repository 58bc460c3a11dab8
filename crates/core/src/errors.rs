use thiserror::Error;

use crate::domain::rfp::RfpStatus;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid rfp transition from {from:?} to {to:?}")]
    InvalidRfpTransition { from: RfpStatus, to: RfpStatus },
    #[error("domain invariant violation: {0}")]
    InvariantViolation(String),
}

#[cfg(test)]
mod tests {
    use crate::domain::rfp::RfpStatus;
    use crate::errors::DomainError;

    #[test]
    fn transition_error_names_both_states() {
        let error = DomainError::InvalidRfpTransition {
            from: RfpStatus::ResponsesReceived,
            to: RfpStatus::Draft,
        };
        let message = error.to_string();
        assert!(message.contains("ResponsesReceived"));
        assert!(message.contains("Draft"));
    }
}
