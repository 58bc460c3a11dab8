//! HTML rendering for outbound RFP mail.

use std::sync::OnceLock;

use serde::Serialize;
use tera::{Context, Tera};

use procura_core::domain::rfp::Rfp;

const RFP_EMAIL_TEMPLATE: &str = "rfp_email.html";

fn templates() -> &'static Tera {
    static TEMPLATES: OnceLock<Tera> = OnceLock::new();
    TEMPLATES.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_template(
            RFP_EMAIL_TEMPLATE,
            include_str!("../../../templates/rfp_email.html"),
        )
        .expect("embedded rfp email template is valid");
        tera
    })
}

#[derive(Serialize)]
struct ItemSpec<'a> {
    key: &'a str,
    value: &'a str,
}

#[derive(Serialize)]
struct ItemView<'a> {
    name: &'a str,
    quantity: u32,
    specs: Vec<ItemSpec<'a>>,
}

/// Renders the fixed RFP email body. Missing specification fields fall back
/// to the placeholders vendors are used to seeing ("N/A", "TBD").
pub fn render_rfp_email(rfp: &Rfp) -> Result<String, tera::Error> {
    let specifications = &rfp.specifications;

    let items: Vec<ItemView<'_>> = specifications
        .items
        .iter()
        .map(|item| ItemView {
            name: &item.name,
            quantity: item.quantity,
            specs: item
                .specs
                .iter()
                .map(|(key, value)| ItemSpec { key: key.as_str(), value: value.as_str() })
                .collect(),
        })
        .collect();

    let deadline = specifications.delivery_terms.deadline.as_deref().unwrap_or("TBD");

    let mut context = Context::new();
    context.insert("title", &rfp.title);
    context.insert("items", &items);
    context.insert("budget_currency", &specifications.budget.currency);
    context.insert("budget_total", &format_amount(specifications.budget.total));
    context.insert("deadline", deadline);
    context.insert(
        "lead_time_days",
        &specifications
            .delivery_terms
            .lead_time_days
            .map(|days| days.to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    );
    context.insert("net_days", &specifications.payment_terms.net_days.unwrap_or(30));
    context.insert("warranty_period", &specifications.warranty.period.unwrap_or(12));
    context.insert(
        "warranty_coverage",
        specifications.warranty.coverage.as_deref().unwrap_or("hardware coverage"),
    );
    context.insert(
        "submit_by",
        specifications.delivery_terms.deadline.as_deref().unwrap_or("the specified date"),
    );

    templates().render(RFP_EMAIL_TEMPLATE, &context)
}

fn format_amount(total: f64) -> String {
    if total <= 0.0 {
        return "N/A".to_string();
    }
    if total.fract() == 0.0 {
        format!("{}", total as i64)
    } else {
        format!("{total:.2}")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use procura_core::domain::rfp::{
        Budget, DeliveryTerms, PaymentTerms, Rfp, RfpItem, Specifications, Warranty,
    };

    use super::render_rfp_email;

    fn rfp(deadline: Option<&str>) -> Rfp {
        Rfp::new(
            "Office Laptops".to_string(),
            "20 laptops".to_string(),
            Specifications {
                items: vec![RfpItem {
                    name: "Laptop".to_string(),
                    quantity: 20,
                    specs: BTreeMap::from([("memory".to_string(), "16GB RAM".to_string())]),
                }],
                budget: Budget { total: 50_000.0, currency: "USD".to_string() },
                delivery_terms: DeliveryTerms {
                    deadline: deadline.map(str::to_string),
                    lead_time_days: Some(30),
                    location: None,
                },
                payment_terms: PaymentTerms { net_days: Some(45), milestone: None },
                warranty: Warranty { period: Some(24), coverage: None },
            },
        )
    }

    #[test]
    fn rendered_body_embeds_items_budget_and_terms() {
        let html = render_rfp_email(&rfp(Some("2026-09-30"))).expect("renders");

        assert!(html.contains("Office Laptops"));
        assert!(html.contains("<strong>Laptop</strong>"));
        assert!(html.contains("memory: 16GB RAM"));
        assert!(html.contains("USD 50000"));
        assert!(html.contains("2026-09-30"));
        assert!(html.contains("Net 45"));
        assert!(html.contains("Minimum 24 months hardware coverage"));
    }

    #[test]
    fn missing_deadline_falls_back_to_placeholders() {
        let html = render_rfp_email(&rfp(None)).expect("renders");
        assert!(html.contains("TBD"));
        assert!(html.contains("the specified date"));
    }
}
