use chrono::NaiveDate;
use serde_json::Value;

use crate::constants::UNKNOWN_TIME;
use crate::error::{HunterError, Result};
use crate::types::{Offer, OfferDate, RawOffer};

/// Display label for a raw discipline token. Unrecognized tokens pass
/// through capitalized with a question-mark marker so they stay visible
/// instead of being dropped.
pub fn discipline_label(raw: &str) -> String {
    match raw.trim().to_lowercase().as_str() {
        "wheelie" => "Wheelie 🟢".to_string(),
        "drift" => "Drift 🔴".to_string(),
        "offroad" | "off-road" => "Off-road 🟠".to_string(),
        "stoppie" => "Stoppie 🔵".to_string(),
        "asphalt" | "general" => "Asphalt/General ⚪".to_string(),
        "racing" => "Racing 🏁".to_string(),
        other => format!("{} ❓", capitalize(other)),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Calendar date from a source timestamp like `2026-02-25T09:00:00.000Z`.
pub fn parse_day(raw: &str) -> Option<NaiveDate> {
    let day_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

/// `HH:MM` from the time-of-day part of a source timestamp.
fn parse_time(raw: &str) -> Option<String> {
    let idx = raw.find('T')?;
    let rest = &raw[idx + 1..];
    if rest.len() >= 5 && rest.as_bytes()[2] == b':' {
        Some(rest[..5].to_string())
    } else {
        None
    }
}

/// The source publishes a deposit worth half the total price, in cents.
pub fn price_from_deposit_cents(cents: i64) -> String {
    format!("{}€", ((2 * cents) as f64 / 100.0).round() as i64)
}

/// One raw record into a canonical offer. A missing required field is a
/// `Field` error; the caller skips the record and carries on.
pub fn normalize(raw: &RawOffer) -> Result<Offer> {
    let discipline_raw = raw
        .get("discipline")
        .and_then(Value::as_str)
        .ok_or_else(|| HunterError::Field("discipline".to_string()))?;
    let discipline = discipline_label(discipline_raw);

    let date_raw = raw
        .get("date")
        .and_then(Value::as_str)
        .ok_or_else(|| HunterError::Field("date".to_string()))?;
    // An unparsable date is preserved verbatim, never dropped
    let date = match parse_day(date_raw) {
        Some(day) => OfferDate::Day(day),
        None => OfferDate::Raw(date_raw.to_string()),
    };

    // Grid records already carry a slot label; embedded records carry an
    // integer hour, with the timestamp as a last resort.
    let time = if let Some(label) = raw.get("time").and_then(Value::as_str).filter(|t| !t.is_empty()) {
        label.to_string()
    } else if let Some(hour) = raw.get("hour").and_then(Value::as_i64) {
        format!("{hour:02}:00")
    } else if let Some(hhmm) = parse_time(date_raw) {
        hhmm
    } else {
        UNKNOWN_TIME.to_string()
    };

    // Grid records show the total already; embedded records publish the
    // half-price deposit in cents.
    let price = if let Some(display) = raw.get("price").and_then(Value::as_str) {
        display.to_string()
    } else if let Some(cents) = raw.get("cents").and_then(Value::as_i64) {
        price_from_deposit_cents(cents)
    } else {
        return Err(HunterError::Field("price/cents".to_string()));
    };

    Ok(Offer {
        discipline,
        date,
        time,
        price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deposit_doubles_into_whole_euros() {
        assert_eq!(price_from_deposit_cents(2500), "50€");
        assert_eq!(price_from_deposit_cents(0), "0€");
        assert_eq!(price_from_deposit_cents(2525), "51€"); // 50.50 rounds up
    }

    #[test]
    fn embedded_record_normalizes_fully() {
        let raw = json!({
            "hour": 9,
            "cents": 2500,
            "date": "2026-02-25T08:00:00.000Z",
            "discipline": "wheelie"
        });
        let offer = normalize(&raw).unwrap();
        assert_eq!(offer.discipline, "Wheelie 🟢");
        assert_eq!(offer.date, OfferDate::Day("2026-02-25".parse().unwrap()));
        assert_eq!(offer.time, "09:00");
        assert_eq!(offer.price, "50€");
    }

    #[test]
    fn grid_record_keeps_its_displayed_price_and_time() {
        let raw = json!({
            "is_offer": true,
            "discipline": "drift",
            "date": "21 ene",
            "time": "10:00-12:00",
            "price": "40€"
        });
        let offer = normalize(&raw).unwrap();
        assert_eq!(offer.discipline, "Drift 🔴");
        assert_eq!(offer.date, OfferDate::Raw("21 ene".to_string()));
        assert_eq!(offer.time, "10:00-12:00");
        assert_eq!(offer.price, "40€");
    }

    #[test]
    fn time_falls_back_to_the_timestamp() {
        let raw = json!({
            "cents": 2000,
            "date": "2026-02-25T16:30:00.000Z",
            "discipline": "stoppie"
        });
        assert_eq!(normalize(&raw).unwrap().time, "16:30");
    }

    #[test]
    fn time_unknown_when_nothing_parses() {
        let raw = json!({
            "cents": 2000,
            "date": "someday",
            "discipline": "stoppie"
        });
        let offer = normalize(&raw).unwrap();
        assert_eq!(offer.time, UNKNOWN_TIME);
        assert_eq!(offer.date, OfferDate::Raw("someday".to_string()));
    }

    #[test]
    fn unknown_discipline_passes_through_marked() {
        assert_eq!(discipline_label("trial"), "Trial ❓");
        assert_eq!(discipline_label("RACING"), "Racing 🏁");
    }

    #[test]
    fn missing_required_fields_are_field_errors() {
        let no_discipline = json!({ "cents": 100, "date": "2026-02-25T08:00:00.000Z" });
        assert!(matches!(
            normalize(&no_discipline).unwrap_err(),
            HunterError::Field(_)
        ));

        let no_price = json!({ "discipline": "drift", "date": "2026-02-25T08:00:00.000Z" });
        assert!(matches!(
            normalize(&no_price).unwrap_err(),
            HunterError::Field(_)
        ));
    }
}
