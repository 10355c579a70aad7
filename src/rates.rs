use chrono::{Datelike, NaiveDate};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::normalizer::{parse_day, price_from_deposit_cents};
use crate::types::RawOffer;

/// Standard weekly tariff entry from the embedded `rates` array.
#[derive(Debug, Clone, Deserialize)]
pub struct StandardRate {
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: u32,
    pub hour: i64,
    pub cents: i64,
    #[serde(default)]
    pub discipline: Option<String>,
}

/// Day-of-week index used by the `rates` table. Observed payloads show
/// `dayOfWeek: 0` on Sundays, so the lookup is Sunday-based. If the site
/// ever flips convention this only shifts standard-rate lookups; offer
/// identity and dedup never touch it.
pub fn rate_day_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Decoded rate entries; malformed ones are skipped with a warning.
pub fn parse_rates(values: Vec<Value>) -> Vec<StandardRate> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(rate) => Some(rate),
            Err(e) => {
                warn!("Skipping malformed rate entry: {e}");
                None
            }
        })
        .collect()
}

/// What a specific slot costs and where the number came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub total: String,
    pub deposit_cents: i64,
    pub from_offer: bool,
    pub discipline: Option<String>,
}

/// Price for a slot on a given date and hour. A dated offer takes priority;
/// otherwise the standard rate for that weekday applies.
pub fn price_for(
    raw_offers: &[RawOffer],
    rates: &[StandardRate],
    date: NaiveDate,
    hour: i64,
) -> Option<PriceQuote> {
    for raw in raw_offers {
        let same_day = raw
            .get("date")
            .and_then(Value::as_str)
            .and_then(parse_day)
            == Some(date);
        if same_day && raw.get("hour").and_then(Value::as_i64) == Some(hour) {
            let cents = raw.get("cents").and_then(Value::as_i64).unwrap_or(0);
            return Some(PriceQuote {
                total: price_from_deposit_cents(cents),
                deposit_cents: cents,
                from_offer: true,
                discipline: raw
                    .get("discipline")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
    }

    let day = rate_day_index(date);
    rates
        .iter()
        .find(|rate| rate.day_of_week == day && rate.hour == hour)
        .map(|rate| PriceQuote {
            total: price_from_deposit_cents(rate.cents),
            deposit_cents: rate.cents,
            from_offer: false,
            discipline: rate.discipline.clone(),
        })
}
