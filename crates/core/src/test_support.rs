use chrono::{NaiveTime, TimeZone, Utc};

use crate::domain::document::{
    BasicInfo, DocumentRecord, DocumentStatus, DocumentSummary, DocumentTemplate, LineItem,
    StoredDocument, Terms,
};
use crate::domain::principal::PrincipalId;

/// A stored document whose summary equals `summary`, created at 09:00 on its date.
pub(crate) fn stored_from_summary(summary: &DocumentSummary) -> StoredDocument {
    let created_at = Utc.from_utc_datetime(&summary.date.and_time(NaiveTime::MIN))
        + chrono::Duration::hours(9);
    StoredDocument {
        id: summary.id.clone(),
        status: summary.status.clone(),
        record: DocumentRecord {
            kind: summary.kind,
            basic: BasicInfo {
                title: summary.title.clone(),
                reference: summary.reference.clone(),
                date: summary.date,
                client_name: "Acme".to_owned(),
                client_email: "buyer@acme.example".to_owned(),
                client_phone: None,
            },
            items: vec![LineItem {
                name: "Services".to_owned(),
                description: None,
                quantity: 1,
                unit_price: summary.amount,
            }],
            terms: Terms {
                payment_terms: "Net 30".to_owned(),
                delivery_terms: None,
                additional_notes: None,
            },
            template: DocumentTemplate::Standard,
            grand_total: summary.amount,
            created_by: PrincipalId("user-1".to_owned()),
            created_at,
        },
        updated_at: created_at,
    }
}

pub(crate) fn stored_with_status(id: &str, status: DocumentStatus) -> StoredDocument {
    let summary = DocumentSummary {
        id: crate::domain::document::DocumentId(id.to_owned()),
        title: "Website Redesign".to_owned(),
        kind: crate::domain::document::DocumentKind::Quotation,
        date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).expect("date"),
        status,
        reference: format!("QUOTATION-{id}"),
        amount: rust_decimal::Decimal::new(125000, 2),
    };
    stored_from_summary(&summary)
}
