pub mod calendar;
pub mod embedded;

pub use calendar::CalendarGridExtractor;
pub use embedded::EmbeddedOffersExtractor;

use tracing::debug;

use crate::error::{HunterError, Result};
use crate::types::RawOffer;

/// One way of locating offer data inside the fetched page.
pub trait ExtractStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap check for the anchor this strategy needs.
    fn probe(&self, html: &str) -> bool;

    fn extract(&self, html: &str) -> Result<Extraction>;
}

/// Output of a successful extraction: the raw slot records in page order,
/// plus the human-readable label of the week the page is showing.
#[derive(Debug, Default)]
pub struct Extraction {
    pub records: Vec<RawOffer>,
    pub date_range: String,
}

/// Probes the page for a recognizable shape and runs the matching strategy.
/// The embedded payload is preferred; the rendered grid is the fallback.
pub fn extract_offers(html: &str) -> Result<Extraction> {
    let strategies: [&dyn ExtractStrategy; 2] = [&EmbeddedOffersExtractor, &CalendarGridExtractor];
    for strategy in strategies {
        if strategy.probe(html) {
            debug!("Using {} extraction strategy", strategy.name());
            return strategy.extract(html);
        }
    }
    Err(HunterError::Parse(
        "no recognizable offer data on page (embedded payload and calendar grid both absent)"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_page_is_a_parse_error() {
        let err = extract_offers("<html><body>maintenance</body></html>").unwrap_err();
        assert!(matches!(err, HunterError::Parse(_)));
    }
}
