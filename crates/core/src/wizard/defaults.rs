use chrono::{NaiveDate, Utc};
use rand::Rng;

use crate::config::WizardConfig;
use crate::domain::document::DocumentKind;
use crate::wizard::sections::{
    BasicInfoInput, LineItemInput, LineItemsInput, SectionInput, SectionKind,
    TemplateChoiceInput, TermsInput,
};

/// Pre-populated input for every section of a new wizard session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionDefaults {
    pub basic_info: BasicInfoInput,
    pub line_items: LineItemsInput,
    pub terms: TermsInput,
    pub template_choice: TemplateChoiceInput,
}

impl SectionDefaults {
    /// Today's date and a random reference suffix.
    pub fn generate(kind: DocumentKind, settings: &WizardConfig) -> Self {
        let mut rng = rand::thread_rng();
        Self::build(kind, settings, Utc::now().date_naive(), &mut rng)
    }

    pub fn build<R: Rng + ?Sized>(
        kind: DocumentKind,
        settings: &WizardConfig,
        today: NaiveDate,
        rng: &mut R,
    ) -> Self {
        let suffix = rng.gen_range(0..settings.reference_suffix_max.max(1));
        Self {
            basic_info: BasicInfoInput {
                reference: reference_number(kind, suffix),
                date: today.format("%Y-%m-%d").to_string(),
                ..BasicInfoInput::default()
            },
            line_items: LineItemsInput { items: vec![LineItemInput::blank()] },
            terms: TermsInput {
                payment_terms: settings.default_payment_terms.clone(),
                ..TermsInput::default()
            },
            template_choice: TemplateChoiceInput {
                template: settings.default_template.as_str().to_string(),
            },
        }
    }

    pub fn input_for(&self, section: SectionKind) -> SectionInput {
        match section {
            SectionKind::BasicInfo => SectionInput::BasicInfo(self.basic_info.clone()),
            SectionKind::LineItems => SectionInput::LineItems(self.line_items.clone()),
            SectionKind::Terms => SectionInput::Terms(self.terms.clone()),
            SectionKind::TemplateChoice => {
                SectionInput::TemplateChoice(self.template_choice.clone())
            }
        }
    }
}

/// `PURCHASE-ORDER-4821` style reference. Uniqueness is not checked.
pub fn reference_number(kind: DocumentKind, suffix: u32) -> String {
    format!("{}-{suffix}", kind.slug().to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::rngs::mock::StepRng;
    use rust_decimal::Decimal;

    use super::{reference_number, SectionDefaults};
    use crate::config::WizardConfig;
    use crate::domain::document::DocumentKind;
    use crate::wizard::sections::{SectionInput, SectionKind};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("date")
    }

    #[test]
    fn reference_combines_kind_and_suffix() {
        assert_eq!(reference_number(DocumentKind::PurchaseOrder, 42), "PURCHASE-ORDER-42");
        assert_eq!(reference_number(DocumentKind::Quotation, 7), "QUOTATION-7");
    }

    #[test]
    fn defaults_prefill_every_section() {
        let mut rng = StepRng::new(0, 1);
        let defaults = SectionDefaults::build(
            DocumentKind::SalesAgreement,
            &WizardConfig::default(),
            today(),
            &mut rng,
        );

        assert!(defaults.basic_info.reference.starts_with("SALES-AGREEMENT-"));
        assert_eq!(defaults.basic_info.date, "2024-01-01");
        assert!(defaults.basic_info.title.is_empty());
        assert_eq!(defaults.line_items.items.len(), 1);
        assert_eq!(defaults.line_items.items[0].quantity, 1);
        assert_eq!(defaults.line_items.items[0].unit_price, Decimal::ZERO);
        assert_eq!(defaults.terms.payment_terms, "Payment due within 30 days of invoice");
        assert_eq!(defaults.template_choice.template, "standard");
    }

    #[test]
    fn reference_suffix_stays_in_configured_range() {
        let settings = WizardConfig { reference_suffix_max: 10, ..WizardConfig::default() };
        for _ in 0..50 {
            let defaults = SectionDefaults::generate(DocumentKind::Quotation, &settings);
            let suffix: u32 = defaults
                .basic_info
                .reference
                .trim_start_matches("QUOTATION-")
                .parse()
                .expect("numeric suffix");
            assert!(suffix < 10);
        }
    }

    #[test]
    fn input_for_matches_section() {
        let mut rng = StepRng::new(3, 0);
        let defaults =
            SectionDefaults::build(DocumentKind::PurchaseOrder, &WizardConfig::default(), today(), &mut rng);

        for section in SectionKind::ORDER {
            assert_eq!(defaults.input_for(section).kind(), section);
        }
        assert!(matches!(defaults.input_for(SectionKind::Terms), SectionInput::Terms(_)));
    }
}
