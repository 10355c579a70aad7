use crate::types::Offer;

/// Renders an offer list as one Telegram-HTML message: a header, one block
/// per offer and a booking link. An empty list gets the fixed no-offers
/// text, naming the week when a date-range label is known.
pub fn format_offer_message(offers: &[Offer], date_range: &str, booking_url: &str) -> String {
    if offers.is_empty() {
        return if date_range.is_empty() {
            "😴 No offers currently available.".to_string()
        } else {
            format!("😴 No offers currently available for {date_range}.")
        };
    }

    let mut lines = vec!["🚨 <b>NEW OFFERS FOUND!</b> 🚨".to_string(), String::new()];
    for offer in offers {
        lines.push(format!(
            "📅 {} - {}\n🏍️ {} - 💰 {}\n",
            offer.date, offer.time, offer.discipline, offer.price
        ));
    }
    lines.push(format!("🔗 <a href='{booking_url}'>Book Now</a>"));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OfferDate;

    const URL: &str = "https://www.polferrer.com";

    #[test]
    fn empty_list_names_the_date_range() {
        let message = format_offer_message(&[], "19 ene - 25 ene", URL);
        assert!(message.contains("No offers currently available"));
        assert!(message.contains("19 ene - 25 ene"));
    }

    #[test]
    fn empty_list_without_range_still_has_the_fixed_text() {
        let message = format_offer_message(&[], "", URL);
        assert_eq!(message, "😴 No offers currently available.");
    }

    #[test]
    fn offers_render_header_blocks_and_booking_link() {
        let offers = vec![Offer {
            discipline: "Wheelie 🟢".to_string(),
            date: OfferDate::Day("2026-02-25".parse().unwrap()),
            time: "10:00".to_string(),
            price: "50€".to_string(),
        }];
        let message = format_offer_message(&offers, "", URL);
        assert!(message.starts_with("🚨 <b>NEW OFFERS FOUND!</b> 🚨"));
        assert!(message.contains("📅 2026-02-25 - 10:00"));
        assert!(message.contains("🏍️ Wheelie 🟢 - 💰 50€"));
        assert!(message.ends_with(&format!("🔗 <a href='{URL}'>Book Now</a>")));
    }
}
