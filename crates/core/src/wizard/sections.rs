use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::document::{BasicInfo, DocumentTemplate, LineItem, Terms};
use crate::wizard::validation::{
    normalize_optional, parse_iso_date, FieldErrors, FieldRule, FieldSpec,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    BasicInfo,
    LineItems,
    Terms,
    TemplateChoice,
}

pub const SECTION_COUNT: usize = 4;

const TEMPLATE_NAMES: &[&str] = &["standard", "professional", "minimal", "detailed"];

const BASIC_INFO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "title",
        "Title",
        FieldRule::MinLength { min: 3, message: "Title must be at least 3 characters" },
    ),
    FieldSpec::new(
        "reference",
        "Reference Number",
        FieldRule::MinLength { min: 2, message: "Reference number is required" },
    ),
    FieldSpec::new(
        "date",
        "Date",
        FieldRule::IsoDate { message: "Date must be a valid YYYY-MM-DD date" },
    ),
    FieldSpec::new(
        "clientName",
        "Client Name",
        FieldRule::MinLength { min: 2, message: "Client name is required" },
    ),
    FieldSpec::new(
        "clientEmail",
        "Client Email",
        FieldRule::Email { message: "Please enter a valid email" },
    ),
    FieldSpec::new("clientPhone", "Client Phone", FieldRule::Optional),
];

const LINE_ITEMS_FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "items",
    "Items",
    FieldRule::MinItems { min: 1, message: "At least one item is required" },
)];

const LINE_ITEM_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("name", "Item Name", FieldRule::NonEmpty { message: "Item name is required" }),
    FieldSpec::new("description", "Description", FieldRule::Optional),
    FieldSpec::new(
        "quantity",
        "Quantity",
        FieldRule::MinInteger { min: 1, message: "Quantity must be at least 1" },
    ),
    FieldSpec::new(
        "unitPrice",
        "Unit Price",
        FieldRule::NonNegative { message: "Price cannot be negative" },
    ),
];

const TERMS_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "paymentTerms",
        "Payment Terms",
        FieldRule::MinLength { min: 3, message: "Payment terms are required" },
    ),
    FieldSpec::new("deliveryTerms", "Delivery Terms", FieldRule::Optional),
    FieldSpec::new("additionalNotes", "Additional Notes", FieldRule::Optional),
];

const TEMPLATE_CHOICE_FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "template",
    "Document Template",
    FieldRule::OneOf {
        allowed: TEMPLATE_NAMES,
        message: "Choose one of: standard, professional, minimal, detailed",
    },
)];

impl SectionKind {
    pub const ORDER: [SectionKind; SECTION_COUNT] =
        [SectionKind::BasicInfo, SectionKind::LineItems, SectionKind::Terms, SectionKind::TemplateChoice];

    pub fn at(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    pub fn index(self) -> usize {
        match self {
            Self::BasicInfo => 0,
            Self::LineItems => 1,
            Self::Terms => 2,
            Self::TemplateChoice => 3,
        }
    }

    pub fn is_last(self) -> bool {
        self.index() == SECTION_COUNT - 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::BasicInfo => "basic_info",
            Self::LineItems => "line_items",
            Self::Terms => "terms",
            Self::TemplateChoice => "template_choice",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::BasicInfo => "Basic Information",
            Self::LineItems => "Item Selection",
            Self::Terms => "Terms & Conditions",
            Self::TemplateChoice => "Template Selection",
        }
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            Self::BasicInfo => BASIC_INFO_FIELDS,
            Self::LineItems => LINE_ITEMS_FIELDS,
            Self::Terms => TERMS_FIELDS,
            Self::TemplateChoice => TEMPLATE_CHOICE_FIELDS,
        }
    }
}

/// Field rules for a single entry of the `items` list.
pub fn line_item_fields() -> &'static [FieldSpec] {
    LINE_ITEM_FIELDS
}

fn rule(fields: &'static [FieldSpec], name: &str) -> FieldRule {
    fields
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.rule)
        .unwrap_or(FieldRule::Optional)
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicInfoInput {
    pub title: String,
    pub reference: String,
    pub date: String,
    pub client_name: String,
    pub client_email: String,
    #[serde(default)]
    pub client_phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: i64,
    pub unit_price: Decimal,
}

impl LineItemInput {
    pub fn blank() -> Self {
        Self { name: String::new(), description: None, quantity: 1, unit_price: Decimal::ZERO }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemsInput {
    pub items: Vec<LineItemInput>,
}

impl LineItemsInput {
    pub fn add_blank_item(&mut self) {
        self.items.push(LineItemInput::blank());
    }

    /// Removes the item at `index`; the last remaining item is kept.
    pub fn remove_item(&mut self, index: usize) -> bool {
        if self.items.len() <= 1 || index >= self.items.len() {
            return false;
        }
        self.items.remove(index);
        true
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermsInput {
    pub payment_terms: String,
    #[serde(default)]
    pub delivery_terms: Option<String>,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateChoiceInput {
    pub template: String,
}

/// Raw, unvalidated values for one section as entered by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum SectionInput {
    BasicInfo(BasicInfoInput),
    LineItems(LineItemsInput),
    Terms(TermsInput),
    TemplateChoice(TemplateChoiceInput),
}

/// Validated values for one section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", content = "values", rename_all = "snake_case")]
pub enum SectionRecord {
    BasicInfo(BasicInfo),
    LineItems(Vec<LineItem>),
    Terms(Terms),
    TemplateChoice(DocumentTemplate),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validation {
    Valid(SectionRecord),
    Invalid(FieldErrors),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

impl SectionInput {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::BasicInfo(_) => SectionKind::BasicInfo,
            Self::LineItems(_) => SectionKind::LineItems,
            Self::Terms(_) => SectionKind::Terms,
            Self::TemplateChoice(_) => SectionKind::TemplateChoice,
        }
    }

    /// Runs the section's field rules. Pure and total.
    pub fn validate(&self) -> Validation {
        match self {
            Self::BasicInfo(input) => validate_basic_info(input),
            Self::LineItems(input) => validate_line_items(input),
            Self::Terms(input) => validate_terms(input),
            Self::TemplateChoice(input) => validate_template_choice(input),
        }
    }
}

impl SectionRecord {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::BasicInfo(_) => SectionKind::BasicInfo,
            Self::LineItems(_) => SectionKind::LineItems,
            Self::Terms(_) => SectionKind::Terms,
            Self::TemplateChoice(_) => SectionKind::TemplateChoice,
        }
    }

    /// Converts stored values back into form input for redisplay.
    pub fn to_input(&self) -> SectionInput {
        match self {
            Self::BasicInfo(basic) => SectionInput::BasicInfo(BasicInfoInput {
                title: basic.title.clone(),
                reference: basic.reference.clone(),
                date: basic.date.format("%Y-%m-%d").to_string(),
                client_name: basic.client_name.clone(),
                client_email: basic.client_email.clone(),
                client_phone: basic.client_phone.clone(),
            }),
            Self::LineItems(items) => SectionInput::LineItems(LineItemsInput {
                items: items
                    .iter()
                    .map(|item| LineItemInput {
                        name: item.name.clone(),
                        description: item.description.clone(),
                        quantity: i64::from(item.quantity),
                        unit_price: item.unit_price,
                    })
                    .collect(),
            }),
            Self::Terms(terms) => SectionInput::Terms(TermsInput {
                payment_terms: terms.payment_terms.clone(),
                delivery_terms: terms.delivery_terms.clone(),
                additional_notes: terms.additional_notes.clone(),
            }),
            Self::TemplateChoice(template) => SectionInput::TemplateChoice(TemplateChoiceInput {
                template: template.as_str().to_string(),
            }),
        }
    }
}

fn validate_basic_info(input: &BasicInfoInput) -> Validation {
    let fields = SectionKind::BasicInfo.fields();
    let mut errors = FieldErrors::default();
    errors.check("title", rule(fields, "title").check_text(&input.title));
    errors.check("reference", rule(fields, "reference").check_text(&input.reference));
    errors.check("date", rule(fields, "date").check_text(&input.date));
    errors.check("clientName", rule(fields, "clientName").check_text(&input.client_name));
    errors.check("clientEmail", rule(fields, "clientEmail").check_text(&input.client_email));

    let date = parse_iso_date(&input.date);
    match (errors.is_empty(), date) {
        (true, Some(date)) => Validation::Valid(SectionRecord::BasicInfo(BasicInfo {
            title: input.title.trim().to_string(),
            reference: input.reference.trim().to_string(),
            date,
            client_name: input.client_name.trim().to_string(),
            client_email: input.client_email.trim().to_string(),
            client_phone: normalize_optional(input.client_phone.as_deref()),
        })),
        _ => Validation::Invalid(errors),
    }
}

fn validate_line_items(input: &LineItemsInput) -> Validation {
    let mut errors = FieldErrors::default();
    errors.check(
        "items",
        rule(SectionKind::LineItems.fields(), "items").check_count(input.items.len()),
    );

    let item_fields = line_item_fields();
    let mut items = Vec::with_capacity(input.items.len());
    let mut total = Some(Decimal::ZERO);
    for (index, raw) in input.items.iter().enumerate() {
        let before = errors.len();
        errors.check(format!("items[{index}].name"), rule(item_fields, "name").check_text(&raw.name));
        errors.check(
            format!("items[{index}].quantity"),
            rule(item_fields, "quantity").check_integer(raw.quantity),
        );
        errors.check(
            format!("items[{index}].unitPrice"),
            rule(item_fields, "unitPrice").check_decimal(raw.unit_price),
        );

        let quantity = match u32::try_from(raw.quantity) {
            Ok(quantity) => quantity,
            Err(_) => {
                if errors.len() == before {
                    errors.push(format!("items[{index}].quantity"), "Quantity is too large");
                }
                continue;
            }
        };

        if errors.len() == before {
            let item = LineItem {
                name: raw.name.trim().to_string(),
                description: normalize_optional(raw.description.as_deref()),
                quantity,
                unit_price: raw.unit_price,
            };
            // Every confirmed section must have a representable grand total.
            let running = item
                .checked_line_total()
                .and_then(|line_total| total.and_then(|sum| sum.checked_add(line_total)));
            if running.is_none() {
                errors.push(format!("items[{index}].unitPrice"), "Amount is too large");
                continue;
            }
            total = running;
            items.push(item);
        }
    }

    if errors.is_empty() {
        Validation::Valid(SectionRecord::LineItems(items))
    } else {
        Validation::Invalid(errors)
    }
}

fn validate_terms(input: &TermsInput) -> Validation {
    let mut errors = FieldErrors::default();
    errors.check(
        "paymentTerms",
        rule(SectionKind::Terms.fields(), "paymentTerms").check_text(&input.payment_terms),
    );

    if !errors.is_empty() {
        return Validation::Invalid(errors);
    }

    Validation::Valid(SectionRecord::Terms(Terms {
        payment_terms: input.payment_terms.trim().to_string(),
        delivery_terms: normalize_optional(input.delivery_terms.as_deref()),
        additional_notes: normalize_optional(input.additional_notes.as_deref()),
    }))
}

fn validate_template_choice(input: &TemplateChoiceInput) -> Validation {
    let template_rule = rule(SectionKind::TemplateChoice.fields(), "template");
    let mut errors = FieldErrors::default();
    errors.check("template", template_rule.check_text(&input.template));

    match input.template.parse::<DocumentTemplate>() {
        Ok(template) if errors.is_empty() => {
            Validation::Valid(SectionRecord::TemplateChoice(template))
        }
        _ => Validation::Invalid(errors),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{
        BasicInfoInput, LineItemInput, LineItemsInput, SectionInput, SectionKind, SectionRecord,
        TemplateChoiceInput, TermsInput, Validation,
    };
    use crate::domain::document::DocumentTemplate;

    fn basic_info() -> BasicInfoInput {
        BasicInfoInput {
            title: "Office Supplies".to_string(),
            reference: "PO-1234".to_string(),
            date: "2024-01-01".to_string(),
            client_name: "Acme".to_string(),
            client_email: "a@acme.com".to_string(),
            client_phone: Some("   ".to_string()),
        }
    }

    fn item(name: &str, quantity: i64, unit_price: Decimal) -> LineItemInput {
        LineItemInput { name: name.to_string(), description: None, quantity, unit_price }
    }

    fn errors_of(validation: Validation) -> super::FieldErrors {
        match validation {
            Validation::Invalid(errors) => errors,
            Validation::Valid(record) => panic!("expected invalid input, got {record:?}"),
        }
    }

    #[test]
    fn basic_info_normalizes_valid_input() {
        let validation = SectionInput::BasicInfo(basic_info()).validate();
        let Validation::Valid(SectionRecord::BasicInfo(record)) = validation else {
            panic!("expected valid basic info");
        };

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"));
        assert_eq!(record.client_phone, None);
    }

    #[test]
    fn basic_info_reports_every_failing_field() {
        let input = BasicInfoInput {
            title: "PO".to_string(),
            client_email: "not-an-email".to_string(),
            date: "yesterday".to_string(),
            ..basic_info()
        };
        let errors = errors_of(SectionInput::BasicInfo(input).validate());

        assert_eq!(errors.message_for("title"), Some("Title must be at least 3 characters"));
        assert_eq!(errors.message_for("clientEmail"), Some("Please enter a valid email"));
        assert!(errors.has_error_for("date"));
        assert!(!errors.has_error_for("clientName"));
    }

    #[test]
    fn line_items_require_at_least_one_item() {
        let errors = errors_of(SectionInput::LineItems(LineItemsInput::default()).validate());
        assert_eq!(errors.message_for("items"), Some("At least one item is required"));
    }

    #[test]
    fn zero_price_is_permitted_and_negative_rejected() {
        let free = SectionInput::LineItems(LineItemsInput {
            items: vec![item("Widget", 1, Decimal::ZERO)],
        });
        assert!(free.validate().is_valid());

        let negative = SectionInput::LineItems(LineItemsInput {
            items: vec![item("Widget", 1, Decimal::new(-100, 2))],
        });
        let errors = errors_of(negative.validate());
        assert_eq!(errors.message_for("items[0].unitPrice"), Some("Price cannot be negative"));
    }

    #[test]
    fn item_errors_are_keyed_by_index() {
        let input = SectionInput::LineItems(LineItemsInput {
            items: vec![item("Paper", 10, Decimal::new(300, 2)), item("  ", 0, Decimal::ONE)],
        });
        let errors = errors_of(input.validate());

        assert_eq!(errors.message_for("items[1].name"), Some("Item name is required"));
        assert_eq!(errors.message_for("items[1].quantity"), Some("Quantity must be at least 1"));
        assert!(!errors.has_error_for("items[0].name"));
    }

    #[test]
    fn oversized_quantity_is_rejected() {
        let input = SectionInput::LineItems(LineItemsInput {
            items: vec![item("Bolts", i64::from(u32::MAX) + 1, Decimal::ONE)],
        });
        let errors = errors_of(input.validate());
        assert_eq!(errors.message_for("items[0].quantity"), Some("Quantity is too large"));
    }

    #[test]
    fn overflowing_amounts_are_rejected() {
        let input = SectionInput::LineItems(LineItemsInput {
            items: vec![item("Widget", 2, Decimal::MAX)],
        });
        let errors = errors_of(input.validate());
        assert_eq!(errors.message_for("items[0].unitPrice"), Some("Amount is too large"));

        let input = SectionInput::LineItems(LineItemsInput {
            items: vec![item("Widget", 1, Decimal::MAX), item("Gadget", 1, Decimal::ONE)],
        });
        let errors = errors_of(input.validate());
        assert!(!errors.has_error_for("items[0].unitPrice"));
        assert_eq!(errors.message_for("items[1].unitPrice"), Some("Amount is too large"));
    }

    #[test]
    fn blank_item_helpers_keep_one_item() {
        let mut input = LineItemsInput { items: vec![LineItemInput::blank()] };
        assert!(!input.remove_item(0), "the only item cannot be removed");

        input.add_blank_item();
        assert_eq!(input.items.len(), 2);
        assert!(input.remove_item(1));
        assert!(!input.remove_item(5));
        assert_eq!(input.items, vec![LineItemInput::blank()]);
    }

    #[test]
    fn terms_require_payment_terms() {
        let errors = errors_of(
            SectionInput::Terms(TermsInput { payment_terms: " ".to_string(), ..TermsInput::default() })
                .validate(),
        );
        assert_eq!(errors.message_for("paymentTerms"), Some("Payment terms are required"));

        let valid = SectionInput::Terms(TermsInput {
            payment_terms: "Net 30".to_string(),
            delivery_terms: Some(String::new()),
            additional_notes: Some("Deliver to dock 4".to_string()),
        })
        .validate();
        let Validation::Valid(SectionRecord::Terms(terms)) = valid else {
            panic!("expected valid terms");
        };
        assert_eq!(terms.delivery_terms, None);
        assert_eq!(terms.additional_notes.as_deref(), Some("Deliver to dock 4"));
    }

    #[test]
    fn template_choice_accepts_known_templates_only() {
        let valid = SectionInput::TemplateChoice(TemplateChoiceInput {
            template: "standard".to_string(),
        })
        .validate();
        assert_eq!(valid, Validation::Valid(SectionRecord::TemplateChoice(DocumentTemplate::Standard)));

        let errors = errors_of(
            SectionInput::TemplateChoice(TemplateChoiceInput { template: "glossy".to_string() })
                .validate(),
        );
        assert!(errors.has_error_for("template"));
    }

    #[test]
    fn stored_records_round_back_into_inputs() {
        let Validation::Valid(record) = SectionInput::BasicInfo(basic_info()).validate() else {
            panic!("expected valid basic info");
        };
        let SectionInput::BasicInfo(refilled) = record.to_input() else {
            panic!("expected basic info input");
        };
        assert_eq!(refilled.date, "2024-01-01");
        assert_eq!(refilled.client_phone, None);
    }

    #[test]
    fn sections_are_ordered() {
        assert_eq!(SectionKind::at(0), Some(SectionKind::BasicInfo));
        assert_eq!(SectionKind::at(3), Some(SectionKind::TemplateChoice));
        assert_eq!(SectionKind::at(4), None);
        assert!(SectionKind::TemplateChoice.is_last());
        assert!(SectionKind::BasicInfo.fields().iter().any(|field| !field.required()));
    }

    #[test]
    fn section_input_deserializes_from_tagged_json() {
        let input: SectionInput = serde_json::from_str(
            r#"{"section":"line_items","items":[{"name":"Paper","quantity":10,"unitPrice":"3.00"}]}"#,
        )
        .expect("tagged input");
        assert_eq!(input.kind(), SectionKind::LineItems);
        assert!(input.validate().is_valid());
    }
}
