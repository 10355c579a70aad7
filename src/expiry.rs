use chrono::NaiveDate;
use tracing::warn;

use crate::types::{Offer, OfferDate};

/// Keeps offers dated today or later, comparing dates only. Applied on both
/// the save path and the load path so a restart sees the same pruning as a
/// live run. Offers whose date never parsed are kept fail-open.
pub fn retain_current(offers: Vec<Offer>, today: NaiveDate) -> Vec<Offer> {
    offers
        .into_iter()
        .filter(|offer| match &offer.date {
            OfferDate::Day(day) => *day >= today,
            OfferDate::Raw(raw) => {
                warn!("Keeping offer with unparsed date '{raw}'");
                true
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(date: OfferDate) -> Offer {
        Offer {
            discipline: "Wheelie 🟢".to_string(),
            date,
            time: "10:00".to_string(),
            price: "50€".to_string(),
        }
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn yesterday_is_dropped_today_and_tomorrow_stay() {
        let offers = vec![
            offer(OfferDate::Day(day("2026-02-24"))),
            offer(OfferDate::Day(day("2026-02-25"))),
            offer(OfferDate::Day(day("2026-02-26"))),
        ];
        let kept = retain_current(offers, day("2026-02-25"));
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|o| o.date.as_day().unwrap() >= day("2026-02-25")));
    }

    #[test]
    fn unparsed_dates_are_retained() {
        let offers = vec![offer(OfferDate::Raw("21 ene".to_string()))];
        let kept = retain_current(offers, day("2026-02-25"));
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn filtering_is_idempotent() {
        let offers = vec![
            offer(OfferDate::Day(day("2026-02-20"))),
            offer(OfferDate::Day(day("2026-02-26"))),
            offer(OfferDate::Raw("someday".to_string())),
        ];
        let today = day("2026-02-25");
        let once = retain_current(offers, today);
        let twice = retain_current(once.clone(), today);
        assert_eq!(once, twice);
    }
}
