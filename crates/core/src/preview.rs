//! Read-only document preview shown on the template section, and its text rendering.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::document::{
    grand_total, BasicInfo, DocumentKind, DocumentRecord, DocumentTemplate, LineItem, Terms,
};
use crate::domain::locale::{Language, TextDirection};
use crate::errors::ApplicationError;
use crate::wizard::{SectionInput, SectionKind, WizardSession};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PreviewLine {
    pub position: usize,
    pub name: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Everything a preview template can show. Absent values are empty strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentPreview {
    pub kind: DocumentKind,
    pub kind_name: String,
    pub template: DocumentTemplate,
    pub direction: TextDirection,
    pub title: String,
    pub reference: String,
    pub date: String,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: String,
    pub lines: Vec<PreviewLine>,
    pub payment_terms: String,
    pub delivery_terms: String,
    pub additional_notes: String,
    pub grand_total: Decimal,
}

impl DocumentPreview {
    /// Reads the confirmed sections of an open session.
    pub fn from_session(session: &WizardSession, language: Language) -> Self {
        let accumulated = session.accumulated();
        let template = accumulated.template().unwrap_or_else(|| pending_template(session));
        Self::build(
            session.kind(),
            template,
            language,
            accumulated.basic_info(),
            accumulated.line_items().unwrap_or_default(),
            accumulated.terms(),
        )
    }

    pub fn from_record(record: &DocumentRecord, language: Language) -> Self {
        Self::build(
            record.kind,
            record.template,
            language,
            Some(&record.basic),
            &record.items,
            Some(&record.terms),
        )
    }

    fn build(
        kind: DocumentKind,
        template: DocumentTemplate,
        language: Language,
        basic: Option<&BasicInfo>,
        items: &[LineItem],
        terms: Option<&Terms>,
    ) -> Self {
        let lines = items
            .iter()
            .enumerate()
            .map(|(index, item)| PreviewLine {
                position: index + 1,
                name: item.name.clone(),
                description: item.description.clone().unwrap_or_default(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total(),
            })
            .collect();

        Self {
            kind,
            kind_name: kind.display_name().to_owned(),
            template,
            direction: language.direction(),
            title: basic.map(|basic| basic.title.clone()).unwrap_or_default(),
            reference: basic.map(|basic| basic.reference.clone()).unwrap_or_default(),
            date: basic.map(|basic| basic.date.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            client_name: basic.map(|basic| basic.client_name.clone()).unwrap_or_default(),
            client_email: basic.map(|basic| basic.client_email.clone()).unwrap_or_default(),
            client_phone: basic.and_then(|basic| basic.client_phone.clone()).unwrap_or_default(),
            lines,
            payment_terms: terms.map(|terms| terms.payment_terms.clone()).unwrap_or_default(),
            delivery_terms: terms.and_then(|terms| terms.delivery_terms.clone()).unwrap_or_default(),
            additional_notes: terms
                .and_then(|terms| terms.additional_notes.clone())
                .unwrap_or_default(),
            grand_total: grand_total(items),
        }
    }
}

fn pending_template(session: &WizardSession) -> DocumentTemplate {
    match session.section_input(SectionKind::TemplateChoice) {
        SectionInput::TemplateChoice(choice) => {
            DocumentTemplate::from_str(&choice.template).unwrap_or(DocumentTemplate::Standard)
        }
        _ => DocumentTemplate::Standard,
    }
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("preview template error: {0}")]
    Template(String),
}

impl From<PreviewError> for ApplicationError {
    fn from(error: PreviewError) -> Self {
        Self::Preview(error.to_string())
    }
}

/// Renders previews with the built-in text templates, one per [`DocumentTemplate`].
#[derive(Clone, Debug)]
pub struct PreviewRenderer {
    tera: Tera,
}

impl PreviewRenderer {
    pub fn new() -> Result<Self, PreviewError> {
        let mut tera = Tera::default();
        tera.register_filter("money", money_filter);
        tera.add_raw_templates(vec![
            ("standard.txt.tera", include_str!("../templates/preview/standard.txt.tera")),
            ("professional.txt.tera", include_str!("../templates/preview/professional.txt.tera")),
            ("minimal.txt.tera", include_str!("../templates/preview/minimal.txt.tera")),
            ("detailed.txt.tera", include_str!("../templates/preview/detailed.txt.tera")),
        ])
        .map_err(|error| PreviewError::Template(error.to_string()))?;
        Ok(Self { tera })
    }

    pub fn render(&self, preview: &DocumentPreview) -> Result<String, PreviewError> {
        let context = Context::from_serialize(preview)
            .map_err(|error| PreviewError::Template(error.to_string()))?;
        self.tera
            .render(&format!("{}.txt.tera", preview.template.as_str()), &context)
            .map_err(|error| PreviewError::Template(error.to_string()))
    }
}

/// Two-decimal money formatting. Amounts arrive as decimal strings and never pass through floats.
fn money_filter(value: &tera::Value, _args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
    let amount = match value {
        tera::Value::String(text) => Decimal::from_str(text),
        tera::Value::Number(number) => Decimal::from_str(&number.to_string()),
        tera::Value::Null => Ok(Decimal::ZERO),
        other => return Err(tera::Error::msg(format!("money filter cannot format {other}"))),
    }
    .map_err(|error| tera::Error::msg(format!("money filter: {error}")))?;

    Ok(tera::Value::String(format!("{:.2}", amount.round_dp(2))))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{NaiveDate, Utc};
    use rand::rngs::mock::StepRng;
    use rust_decimal::Decimal;

    use super::{money_filter, DocumentPreview, PreviewRenderer};
    use crate::config::WizardConfig;
    use crate::domain::document::{DocumentKind, DocumentTemplate};
    use crate::domain::locale::{Language, TextDirection};
    use crate::domain::principal::PrincipalId;
    use crate::wizard::{
        BasicInfoInput, LineItemInput, LineItemsInput, SectionDefaults, SectionInput,
        TemplateChoiceInput, TermsInput, WizardSession,
    };

    fn item(name: &str, quantity: i64, cents: i64) -> LineItemInput {
        LineItemInput {
            name: name.to_string(),
            description: None,
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    fn session_at_template_section() -> WizardSession {
        let mut rng = StepRng::new(77, 0);
        let defaults = SectionDefaults::build(
            DocumentKind::Quotation,
            &WizardConfig::default(),
            NaiveDate::from_ymd_opt(2024, 3, 9).expect("date"),
            &mut rng,
        );
        let mut session = WizardSession::initialize(DocumentKind::Quotation, defaults);
        let inputs = [
            SectionInput::BasicInfo(BasicInfoInput {
                title: "Kitchen Refit".to_string(),
                reference: "QUOTATION-77".to_string(),
                date: "2024-03-09".to_string(),
                client_name: "Bayt Homes".to_string(),
                client_email: "orders@bayt.example".to_string(),
                client_phone: Some("+971 4 000 0000".to_string()),
            }),
            SectionInput::LineItems(LineItemsInput {
                items: vec![item("Cabinet", 2, 1050), item("Handle set", 1, 525)],
            }),
            SectionInput::Terms(TermsInput {
                payment_terms: "50% upfront".to_string(),
                delivery_terms: Some("Two weeks".to_string()),
                additional_notes: None,
            }),
        ];
        for input in &inputs {
            session.advance(input).expect("advance");
        }
        session
    }

    #[test]
    fn preview_reads_accumulated_sections() {
        let session = session_at_template_section();
        let preview = DocumentPreview::from_session(&session, Language::English);

        assert_eq!(preview.title, "Kitchen Refit");
        assert_eq!(preview.lines.len(), 2);
        assert_eq!(preview.lines[0].line_total, Decimal::new(2100, 2));
        assert_eq!(preview.grand_total, Decimal::new(2625, 2));
        assert_eq!(preview.template, DocumentTemplate::Standard);
        assert_eq!(preview.direction, TextDirection::Ltr);
        assert!(preview.additional_notes.is_empty());
    }

    #[test]
    fn preview_total_matches_finalized_total() {
        let mut session = session_at_template_section();
        session
            .advance(&SectionInput::TemplateChoice(TemplateChoiceInput {
                template: "professional".to_string(),
            }))
            .expect("template");
        let before = DocumentPreview::from_session(&session, Language::Arabic);

        let record =
            session.assemble_record(PrincipalId("user-1".to_string()), Utc::now()).expect("record");
        let after = DocumentPreview::from_record(&record, Language::Arabic);

        assert_eq!(before.grand_total, record.grand_total);
        assert_eq!(before, after);
        assert_eq!(after.template, DocumentTemplate::Professional);
        assert_eq!(after.direction, TextDirection::Rtl);
    }

    #[test]
    fn every_template_renders_the_total() {
        let renderer = PreviewRenderer::new().expect("renderer");
        let mut preview =
            DocumentPreview::from_session(&session_at_template_section(), Language::English);

        for template in DocumentTemplate::ALL {
            preview.template = template;
            let text = renderer.render(&preview).expect("render");
            assert!(text.contains("26.25"), "{template:?} output: {text}");
            assert!(text.contains("Kitchen Refit"), "{template:?} output: {text}");
        }
    }

    #[test]
    fn standard_template_lists_line_totals() {
        let renderer = PreviewRenderer::new().expect("renderer");
        let preview =
            DocumentPreview::from_session(&session_at_template_section(), Language::English);
        let text = renderer.render(&preview).expect("render");

        assert!(text.contains("1. Cabinet  2 x 10.50 = 21.00"));
        assert!(text.contains("2. Handle set  1 x 5.25 = 5.25"));
        assert!(text.contains("Delivery terms: Two weeks"));
        assert!(!text.contains("Notes:"));
    }

    #[test]
    fn empty_session_previews_without_failing() {
        let mut rng = StepRng::new(1, 0);
        let defaults = SectionDefaults::build(
            DocumentKind::PurchaseOrder,
            &WizardConfig::default(),
            NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
            &mut rng,
        );
        let session = WizardSession::initialize(DocumentKind::PurchaseOrder, defaults);
        let preview = DocumentPreview::from_session(&session, Language::English);

        assert!(preview.lines.is_empty());
        assert_eq!(preview.grand_total, Decimal::ZERO);
        let text = PreviewRenderer::new().expect("renderer").render(&preview).expect("render");
        assert!(text.contains("Total: 0.00"));
    }

    #[test]
    fn money_filter_keeps_exact_cents() {
        let args = HashMap::new();
        let formatted =
            money_filter(&tera::Value::String("0.1".to_string()), &args).expect("format");
        assert_eq!(formatted, tera::Value::String("0.10".to_string()));

        let summed = Decimal::new(1, 1) + Decimal::new(2, 1);
        let formatted =
            money_filter(&tera::Value::String(summed.to_string()), &args).expect("format");
        assert_eq!(formatted, tera::Value::String("0.30".to_string()));

        assert!(money_filter(&tera::Value::Bool(true), &args).is_err());
    }
}
