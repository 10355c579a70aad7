use async_trait::async_trait;

/// Per-recipient outcome of a broadcast. A blocked recipient is a signal to
/// drop the subscription, not a scan failure.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeliveryReport {
    pub delivered: Vec<i64>,
    pub blocked: Vec<i64>,
}

/// Fans one alert message out to every subscriber. Delivery failures are
/// handled per recipient inside the implementation; the scan never fails
/// because of them.
#[async_trait]
pub trait OfferNotifier: Send + Sync {
    async fn broadcast(&self, text: &str) -> DeliveryReport;
}
