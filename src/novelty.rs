use std::collections::BTreeSet;

use crate::types::Offer;

/// Offers not yet surfaced to subscribers: identity key absent from the
/// notified set. Always a subset of `current`.
pub fn new_offers(current: &[Offer], notified: &BTreeSet<String>) -> Vec<Offer> {
    current
        .iter()
        .filter(|offer| !notified.contains(&offer.identity_key()))
        .cloned()
        .collect()
}

/// Unions the dispatched keys into the notified set. Union, not replace, so
/// a partially failed broadcast never forgets previously recorded keys.
pub fn record_notified(notified: &mut BTreeSet<String>, dispatched: &[Offer]) {
    for offer in dispatched {
        notified.insert(offer.identity_key());
    }
}

/// Drops keys no longer present in the current snapshot.
pub fn prune(notified: &mut BTreeSet<String>, current: &[Offer]) {
    let live: BTreeSet<String> = current.iter().map(Offer::identity_key).collect();
    notified.retain(|key| live.contains(key));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfferDate;

    fn offer(discipline: &str, date: &str, time: &str) -> Offer {
        Offer {
            discipline: discipline.to_string(),
            date: OfferDate::Day(date.parse().unwrap()),
            time: time.to_string(),
            price: "50€".to_string(),
        }
    }

    #[test]
    fn new_offers_is_a_subset_of_current() {
        let current = vec![
            offer("Wheelie 🟢", "2026-02-25", "10:00"),
            offer("Drift 🔴", "2026-02-26", "16:00"),
        ];
        let mut notified = BTreeSet::new();
        notified.insert(current[0].identity_key());

        let fresh = new_offers(&current, &notified);
        assert_eq!(fresh, vec![current[1].clone()]);
    }

    #[test]
    fn identical_rescan_yields_nothing_new() {
        let current = vec![
            offer("Wheelie 🟢", "2026-02-25", "10:00"),
            offer("Drift 🔴", "2026-02-26", "16:00"),
        ];
        let mut notified = BTreeSet::new();

        let first = new_offers(&current, &notified);
        assert_eq!(first.len(), 2);
        record_notified(&mut notified, &first);

        let second = new_offers(&current, &notified);
        assert!(second.is_empty());
    }

    #[test]
    fn record_notified_unions_rather_than_replaces() {
        let mut notified: BTreeSet<String> = ["older_key".to_string()].into();
        let dispatched = vec![offer("Wheelie 🟢", "2026-02-25", "10:00")];
        record_notified(&mut notified, &dispatched);
        assert_eq!(notified.len(), 2);
        assert!(notified.contains("older_key"));

        // Recording the same dispatch again is idempotent
        record_notified(&mut notified, &dispatched);
        assert_eq!(notified.len(), 2);
    }

    #[test]
    fn prune_drops_keys_absent_from_the_snapshot() {
        let current = vec![offer("Wheelie 🟢", "2026-02-25", "10:00")];
        let mut notified = BTreeSet::new();
        notified.insert(current[0].identity_key());
        notified.insert("Drift 🔴_2026-01-01_16:00".to_string());

        prune(&mut notified, &current);
        assert_eq!(notified.len(), 1);
        assert!(notified.contains(&current[0].identity_key()));
    }
}
