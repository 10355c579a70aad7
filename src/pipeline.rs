use chrono::{Local, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::Result;
use crate::expiry;
use crate::extractor;
use crate::fetcher::PageSource;
use crate::formatter;
use crate::normalizer;
use crate::notifier::OfferNotifier;
use crate::novelty;
use crate::storage::StateStore;
use crate::types::Offer;

/// Summary of one completed scan.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Slot records extracted from the page, promotional or not.
    pub total_slots: usize,
    /// Current valid offers, as persisted.
    pub offers: Vec<Offer>,
    /// Offers that had not been alerted on before this scan.
    pub new_offers: Vec<Offer>,
    /// Subscribers the alert actually reached.
    pub delivered: usize,
}

/// Wires fetch → extract → normalize → filter → dedup → persist. Any stage
/// failure aborts the scan and leaves the previously persisted state as the
/// authoritative one.
pub struct Scanner {
    source: Arc<dyn PageSource>,
    store: Arc<dyn StateStore>,
    notifier: Arc<dyn OfferNotifier>,
    booking_url: String,
}

impl Scanner {
    pub fn new(
        source: Arc<dyn PageSource>,
        store: Arc<dyn StateStore>,
        notifier: Arc<dyn OfferNotifier>,
        booking_url: String,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            booking_url,
        }
    }

    #[instrument(skip(self))]
    pub async fn scan(&self) -> Result<ScanOutcome> {
        let html = self.source.fetch().await?;
        let extraction = extractor::extract_offers(&html)?;
        let total_slots = extraction.records.len();

        let mut offers = Vec::new();
        for raw in &extraction.records {
            // The embedded payload only lists promotional slots, so a
            // missing flag counts as promotional.
            let is_offer = raw
                .get("is_offer")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            if !is_offer {
                continue;
            }
            match normalizer::normalize(raw) {
                Ok(offer) => offers.push(offer),
                Err(e) => warn!("Skipping malformed slot record: {e}"),
            }
        }

        let today = Local::now().date_naive();
        let offers = expiry::retain_current(offers, today);
        info!(
            "Scan found {} slots, {} current offers",
            total_slots,
            offers.len()
        );

        let mut state = self.store.load_or_default().await;
        let fresh = novelty::new_offers(&offers, &state.notified_offers);

        let delivered = if fresh.is_empty() {
            info!("No new offers to notify");
            0
        } else {
            let message =
                formatter::format_offer_message(&fresh, &extraction.date_range, &self.booking_url);
            let report = self.notifier.broadcast(&message).await;
            info!(
                "Alerted on {} new offers: {} delivered, {} blocked",
                fresh.len(),
                report.delivered.len(),
                report.blocked.len()
            );
            report.delivered.len()
        };

        // Dispatched keys are unioned in even on partial delivery, then the
        // set is trimmed to keys still present in the snapshot.
        novelty::record_notified(&mut state.notified_offers, &fresh);
        novelty::prune(&mut state.notified_offers, &offers);

        state.offers = offers.clone();
        state.date_range = extraction.date_range;
        state.fetched_at = Some(Utc::now());
        self.store.save(&state).await?;

        Ok(ScanOutcome {
            total_slots,
            offers,
            new_offers: fresh,
            delivered,
        })
    }
}

/// Cached offers for query commands: read-only and expiry-filtered on load,
/// so a restart and a live run are pruned the same way.
pub async fn cached_offers(store: &dyn StateStore) -> (Vec<Offer>, String) {
    let state = store.load_or_default().await;
    let today = Local::now().date_naive();
    (
        expiry::retain_current(state.offers, today),
        state.date_range,
    )
}
