use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::principal::PrincipalId;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub String);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    PurchaseOrder,
    Quotation,
    SalesAgreement,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 3] =
        [DocumentKind::PurchaseOrder, DocumentKind::Quotation, DocumentKind::SalesAgreement];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "purchase_order",
            Self::Quotation => "quotation",
            Self::SalesAgreement => "sales_agreement",
        }
    }

    /// Route-style slug, also the prefix of generated reference numbers.
    pub fn slug(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "purchase-order",
            Self::Quotation => "quotation",
            Self::SalesAgreement => "sales-agreement",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::PurchaseOrder => "Purchase Order",
            Self::Quotation => "Quotation",
            Self::SalesAgreement => "Sales Agreement",
        }
    }
}

impl std::str::FromStr for DocumentKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "po" | "purchase-order" | "purchase_order" => Ok(Self::PurchaseOrder),
            "quotation" | "quote" => Ok(Self::Quotation),
            "agreement" | "sales-agreement" | "sales_agreement" => Ok(Self::SalesAgreement),
            other => Err(DomainError::UnknownDocumentKind(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentTemplate {
    Standard,
    Professional,
    Minimal,
    Detailed,
}

impl DocumentTemplate {
    pub const ALL: [DocumentTemplate; 4] = [
        DocumentTemplate::Standard,
        DocumentTemplate::Professional,
        DocumentTemplate::Minimal,
        DocumentTemplate::Detailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Professional => "professional",
            Self::Minimal => "minimal",
            Self::Detailed => "detailed",
        }
    }
}

impl std::str::FromStr for DocumentTemplate {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "professional" => Ok(Self::Professional),
            "minimal" => Ok(Self::Minimal),
            "detailed" => Ok(Self::Detailed),
            other => Err(DomainError::UnknownTemplate(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub name: String,
    pub description: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItem {
    /// `quantity * unit_price`, or `None` when it leaves the `Decimal` range.
    pub fn checked_line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Saturates at `Decimal::MAX`. Validated line items never get there.
    pub fn line_total(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Sum of line totals in list order, or `None` on overflow.
pub fn checked_grand_total(items: &[LineItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| total.checked_add(item.checked_line_total()?))
}

/// Sum of `quantity * unit_price` over `items`, in list order. Saturates like
/// [`LineItem::line_total`].
pub fn grand_total(items: &[LineItem]) -> Decimal {
    items.iter().fold(Decimal::ZERO, |total, item| total.saturating_add(item.line_total()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub title: String,
    pub reference: String,
    pub date: NaiveDate,
    pub client_name: String,
    pub client_email: String,
    pub client_phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terms {
    pub payment_terms: String,
    pub delivery_terms: Option<String>,
    pub additional_notes: Option<String>,
}

/// A finished document, assembled once every wizard section is confirmed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub kind: DocumentKind,
    pub basic: BasicInfo,
    pub items: Vec<LineItem>,
    pub terms: Terms,
    pub template: DocumentTemplate,
    pub grand_total: Decimal,
    pub created_by: PrincipalId,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub status: DocumentStatus,
    pub record: DocumentRecord,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn can_transition_to(&self, next: &DocumentStatus) -> bool {
        matches!(
            (&self.status, next),
            (DocumentStatus::Draft, DocumentStatus::Pending)
                | (DocumentStatus::Pending, DocumentStatus::Approved)
                | (DocumentStatus::Pending, DocumentStatus::Rejected)
                | (DocumentStatus::Rejected, DocumentStatus::Draft)
        )
    }

    pub fn transition_to(&mut self, next: DocumentStatus) -> Result<(), DomainError> {
        if self.can_transition_to(&next) {
            self.status = next;
            self.updated_at = Utc::now();
            return Ok(());
        }

        Err(DomainError::InvalidStatusTransition { from: self.status.clone(), to: next })
    }

    pub fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id.clone(),
            title: self.record.basic.title.clone(),
            kind: self.record.kind,
            date: self.record.basic.date,
            status: self.status.clone(),
            reference: self.record.basic.reference.clone(),
            amount: self.record.grand_total,
        }
    }
}

/// Dashboard card view of a stored document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub title: String,
    pub kind: DocumentKind,
    pub date: NaiveDate,
    pub status: DocumentStatus,
    pub reference: String,
    pub amount: Decimal,
}
