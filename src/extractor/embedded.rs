use regex::Regex;
use serde_json::Value;
use tracing::debug;

use super::{ExtractStrategy, Extraction};
use crate::error::{HunterError, Result};
use crate::normalizer;
use crate::types::RawOffer;

// The site's framework serializes its data into the page source with escaped
// quotes, so both `"offers":` and `\"offers\":` must match.
const OFFERS_PATTERN: &str = r#"\\?"offers\\?":\s*(\[\{.*?\}\])"#;
const RATES_PATTERN: &str = r#"\\?"rates\\?":\s*(\[\{.*?\}\])"#;

/// Pulls the `offers` JSON array embedded in the page source. Record fields:
/// `hour` (integer), `cents` (integer deposit), `date` (timestamp string),
/// `discipline` (string). Every record in the array is promotional.
pub struct EmbeddedOffersExtractor;

/// Undo the serialization artifacts around the payload: escaped quotes and
/// the `$D` prefix the framework puts in front of timestamps.
fn decode_payload(raw: &str) -> Result<Vec<Value>> {
    let cleaned = raw.replace("\\\"", "\"").replace("$D", "");
    serde_json::from_str(&cleaned)
        .map_err(|e| HunterError::Parse(format!("embedded payload is not valid JSON: {e}")))
}

fn capture_array(html: &str, pattern: &str, what: &str) -> Result<Vec<Value>> {
    let re = Regex::new(pattern).unwrap();
    let captures = re
        .captures(html)
        .ok_or_else(|| HunterError::Parse(format!("{what} payload anchor not found")))?;
    decode_payload(&captures[1])
}

/// The promotional slots array. Used by the offer scan.
pub fn extract_offers_payload(html: &str) -> Result<Vec<RawOffer>> {
    capture_array(html, OFFERS_PATTERN, "offers")
}

/// The standard weekly tariff array next to the offers. Used by the price
/// lookup, never by the scan itself.
pub fn extract_rates_payload(html: &str) -> Result<Vec<Value>> {
    capture_array(html, RATES_PATTERN, "rates")
}

/// Week label derived from the record dates, oldest to newest.
fn date_range_label(records: &[Value]) -> String {
    let mut days: Vec<_> = records
        .iter()
        .filter_map(|r| r.get("date").and_then(Value::as_str))
        .filter_map(normalizer::parse_day)
        .collect();
    days.sort();
    match (days.first(), days.last()) {
        (Some(first), Some(last)) => format!("{first} - {last}"),
        _ => String::new(),
    }
}

impl ExtractStrategy for EmbeddedOffersExtractor {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn probe(&self, html: &str) -> bool {
        Regex::new(OFFERS_PATTERN).unwrap().is_match(html)
    }

    fn extract(&self, html: &str) -> Result<Extraction> {
        let records = extract_offers_payload(html)?;
        debug!("Decoded {} embedded offer records", records.len());
        let date_range = date_range_label(&records);
        Ok(Extraction {
            records,
            date_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<script>self.__next_f.push("\"offers\":[{\"hour\":10,\"cents\":2500,\"date\":\"$D2026-02-25T09:00:00.000Z\",\"discipline\":\"wheelie\"},{\"hour\":16,\"cents\":3000,\"date\":\"$D2026-02-27T15:00:00.000Z\",\"discipline\":\"drift\"}],\"rates\":[{\"dayOfWeek\":0,\"hour\":10,\"cents\":4000,\"discipline\":\"wheelie\"}]")</script>"#;

    #[test]
    fn probe_detects_escaped_payload() {
        assert!(EmbeddedOffersExtractor.probe(PAGE));
        assert!(!EmbeddedOffersExtractor.probe("<html>nothing here</html>"));
    }

    #[test]
    fn extracts_and_decodes_offer_records() {
        let extraction = EmbeddedOffersExtractor.extract(PAGE).unwrap();
        assert_eq!(extraction.records.len(), 2);

        let first = &extraction.records[0];
        assert_eq!(first["hour"], 10);
        assert_eq!(first["cents"], 2500);
        assert_eq!(first["discipline"], "wheelie");
        // The $D vendor prefix is stripped
        assert_eq!(first["date"], "2026-02-25T09:00:00.000Z");
    }

    #[test]
    fn date_range_spans_oldest_to_newest() {
        let extraction = EmbeddedOffersExtractor.extract(PAGE).unwrap();
        assert_eq!(extraction.date_range, "2026-02-25 - 2026-02-27");
    }

    #[test]
    fn unescaped_payload_is_also_accepted() {
        let page = r#"{"offers": [{"hour":12,"cents":0,"date":"2026-03-01T11:00:00.000Z","discipline":"racing"}]}"#;
        let extraction = EmbeddedOffersExtractor.extract(page).unwrap();
        assert_eq!(extraction.records.len(), 1);
        assert_eq!(extraction.records[0]["discipline"], "racing");
    }

    #[test]
    fn malformed_payload_is_a_parse_error() {
        let page = r#"\"offers\":[{\"hour\":}]"#;
        assert!(EmbeddedOffersExtractor.probe(page));
        let err = EmbeddedOffersExtractor.extract(page).unwrap_err();
        assert!(matches!(err, HunterError::Parse(_)));
    }

    #[test]
    fn rates_payload_is_extracted_separately() {
        let rates = extract_rates_payload(PAGE).unwrap();
        assert_eq!(rates.len(), 1);
        assert_eq!(rates[0]["dayOfWeek"], 0);
        assert_eq!(rates[0]["cents"], 4000);
    }
}
