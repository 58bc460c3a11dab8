//! Proposal scoring against RFP requirements.
//!
//! Four piecewise-linear sub-scores (price, delivery, compliance, support)
//! combined into a weighted overall score. Pure arithmetic: no I/O, no state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::proposal::ParsedProposal;
use crate::domain::rfp::Specifications;

/// Weights for the overall score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub price: f64,
    pub delivery: f64,
    pub compliance: f64,
    pub support: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { price: 0.30, delivery: 0.25, compliance: 0.35, support: 0.10 }
    }
}

const PRICE_OVER_BUDGET_SCORE: f64 = 30.0;
const PRICE_AT_BUDGET_SCORE: f64 = 70.0;
const DEFAULT_LEAD_TIME_DAYS: u32 = 30;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("rfp has no required items; compliance cannot be computed")]
    NoRequiredItems,
    #[error("rfp budget total must be positive")]
    NonPositiveBudget,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCard {
    pub price_score: u8,
    pub delivery_score: u8,
    pub compliance_score: u8,
    pub support_score: u8,
    pub overall: u8,
    pub reasoning: String,
}

impl ScoreCard {
    pub fn from_subscores(price: u8, delivery: u8, compliance: u8, support: u8) -> Self {
        Self::combine(price, delivery, compliance, support, ScoreWeights::default())
    }

    fn combine(price: u8, delivery: u8, compliance: u8, support: u8, weights: ScoreWeights) -> Self {
        let overall = (f64::from(price) * weights.price
            + f64::from(delivery) * weights.delivery
            + f64::from(compliance) * weights.compliance
            + f64::from(support) * weights.support)
            .round() as u8;

        Self {
            price_score: price,
            delivery_score: delivery,
            compliance_score: compliance,
            support_score: support,
            overall,
            reasoning: format!(
                "Price: {price}/100 | Delivery: {delivery}/100 | Compliance: {compliance}/100 | Support: {support}/100"
            ),
        }
    }
}

/// Scores a parsed proposal against the owning RFP's specifications.
///
/// Total for well-formed input; empty item lists and non-positive budgets are
/// rejected up front instead of surfacing as divide-by-zero artifacts.
pub fn evaluate_proposal(
    specifications: &Specifications,
    parsed: &ParsedProposal,
) -> Result<ScoreCard, ScoringError> {
    if specifications.items.is_empty() {
        return Err(ScoringError::NoRequiredItems);
    }
    if specifications.budget.total <= 0.0 {
        return Err(ScoringError::NonPositiveBudget);
    }

    let price = price_score(parsed.pricing.total_price, specifications.budget.total);
    let delivery = delivery_score(
        parsed.delivery_details.lead_time.as_deref(),
        specifications.delivery_terms.lead_time_days,
    );
    let compliance =
        compliance_score(parsed.compliance.specs_matched.len(), specifications.items.len());
    let support = support_score(
        parsed.terms.warranty.as_deref(),
        parsed.terms.sla.as_deref(),
    );

    Ok(ScoreCard::combine(
        price.round() as u8,
        delivery.round() as u8,
        compliance.round() as u8,
        support.round() as u8,
        ScoreWeights::default(),
    ))
}

/// Over budget is a flat 30, exactly at budget a flat 70, and under budget
/// interpolates from 70 toward 100 as the savings fraction grows.
fn price_score(proposed_price: f64, budget_total: f64) -> f64 {
    if proposed_price > budget_total {
        return PRICE_OVER_BUDGET_SCORE;
    }
    if proposed_price == budget_total {
        return PRICE_AT_BUDGET_SCORE;
    }

    let savings_fraction = (budget_total - proposed_price) / budget_total;
    PRICE_AT_BUDGET_SCORE + savings_fraction * (100.0 - PRICE_AT_BUDGET_SCORE)
}

/// Lead time within the requirement is a 100; more than 1.5x the requirement
/// is a flat 30; in between decays linearly.
fn delivery_score(lead_time: Option<&str>, required_lead_time_days: Option<u32>) -> f64 {
    let lead_days = lead_time.and_then(leading_integer).unwrap_or(DEFAULT_LEAD_TIME_DAYS);
    let required_days = required_lead_time_days.unwrap_or(DEFAULT_LEAD_TIME_DAYS).max(1);

    let lead = f64::from(lead_days);
    let required = f64::from(required_days);

    if lead <= required {
        return 100.0;
    }
    if lead > required * 1.5 {
        return 30.0;
    }
    100.0 - ((lead - required) / required) * 70.0
}

fn compliance_score(matched: usize, total_items: usize) -> f64 {
    let matched = matched.min(total_items);
    (matched as f64 / total_items as f64) * 100.0
}

fn support_score(warranty: Option<&str>, sla: Option<&str>) -> f64 {
    let mut score: f64 = 50.0;
    if warranty.is_some_and(|text| text.contains("24")) {
        score += 30.0;
    }
    if sla.is_some_and(|text| !text.trim().is_empty()) {
        score += 20.0;
    }
    score.min(100.0)
}

/// Leading-integer parse of free text, so "3 weeks" reads as 3. Returns
/// `None` when the text does not start with digits.
fn leading_integer(text: &str) -> Option<u32> {
    let trimmed = text.trim_start();
    let digits: String = trimmed.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}
