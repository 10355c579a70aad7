use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Raw slot data as extracted from the page, prior to normalization.
pub type RawOffer = serde_json::Value;

/// Calendar date of an offer. A source date that fails to parse is carried
/// verbatim rather than dropped, so the offer stays visible downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OfferDate {
    Day(NaiveDate),
    Raw(String),
}

impl OfferDate {
    pub fn as_day(&self) -> Option<NaiveDate> {
        match self {
            OfferDate::Day(day) => Some(*day),
            OfferDate::Raw(_) => None,
        }
    }
}

impl fmt::Display for OfferDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OfferDate::Day(day) => write!(f, "{}", day.format("%Y-%m-%d")),
            OfferDate::Raw(raw) => write!(f, "{raw}"),
        }
    }
}

/// A bookable time slot surfaced at a promotional price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub discipline: String,
    pub date: OfferDate,
    pub time: String,
    pub price: String,
}

impl Offer {
    /// Deduplication key. The same (discipline, date, time) always yields
    /// the same key across re-scrapes; any differing field changes it.
    pub fn identity_key(&self) -> String {
        format!("{}_{}_{}", self.discipline, self.date, self.time)
    }
}

/// Everything a successful scan persists: the offer snapshot and the set of
/// identity keys already alerted on. Saved and replaced as a single unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub offers: Vec<Offer>,
    #[serde(default)]
    pub date_range: String,
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notified_offers: BTreeSet<String>,
}
