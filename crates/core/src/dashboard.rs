//! Search, filter and sort over stored document summaries.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::document::{DocumentKind, DocumentStatus, DocumentSummary};
use crate::errors::{ApplicationError, DomainError};
use crate::wizard::DocumentStore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    #[default]
    All,
    Only(DocumentKind),
}

impl KindFilter {
    pub fn matches(self, kind: DocumentKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == kind,
        }
    }
}

impl FromStr for KindFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        DocumentKind::from_str(value).map(Self::Only)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    AmountHigh,
    AmountLow,
}

impl SortOrder {
    fn compare(self, left: &DocumentSummary, right: &DocumentSummary) -> Ordering {
        match self {
            Self::Newest => right.date.cmp(&left.date),
            Self::Oldest => left.date.cmp(&right.date),
            Self::AmountHigh => right.amount.cmp(&left.amount),
            Self::AmountLow => left.amount.cmp(&right.amount),
        }
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "amount_high" | "highest" => Ok(Self::AmountHigh),
            "amount_low" | "lowest" => Ok(Self::AmountLow),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown sort order `{other}` (expected newest|oldest|amount_high|amount_low)"
            ))),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub kind: KindFilter,
    #[serde(default)]
    pub sort: SortOrder,
}

impl ListingQuery {
    /// Keeps matching summaries, then sorts them. Ties keep their input order.
    pub fn apply(&self, summaries: Vec<DocumentSummary>) -> Vec<DocumentSummary> {
        let needle = self.search.trim().to_lowercase();
        let mut listed: Vec<DocumentSummary> = summaries
            .into_iter()
            .filter(|summary| self.kind.matches(summary.kind))
            .filter(|summary| matches_search(summary, &needle))
            .collect();
        listed.sort_by(|left, right| self.sort.compare(left, right));
        listed
    }
}

fn matches_search(summary: &DocumentSummary, needle: &str) -> bool {
    needle.is_empty()
        || summary.title.to_lowercase().contains(needle)
        || summary.reference.to_lowercase().contains(needle)
}

pub fn pending_approvals(summaries: &[DocumentSummary]) -> Vec<DocumentSummary> {
    summaries.iter().filter(|summary| summary.status == DocumentStatus::Pending).cloned().collect()
}

pub async fn load<S>(store: &S, query: &ListingQuery) -> Result<Vec<DocumentSummary>, ApplicationError>
where
    S: DocumentStore + ?Sized,
{
    let summaries = store.list_summaries().await?;
    let total = summaries.len();
    let listed = query.apply(summaries);
    debug!(
        event_name = "dashboard.listing_loaded",
        total,
        listed = listed.len(),
        sort = ?query.sort,
        "document listing loaded"
    );
    Ok(listed)
}
