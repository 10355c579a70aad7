use scraper::{ElementRef, Html, Selector};
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{ExtractStrategy, Extraction};
use crate::constants::{marker_to_discipline, OFFER_MARKERS};
use crate::error::{HunterError, Result};

/// Walks the rendered weekly calendar: rows of 8 cells, one time-label
/// column plus seven day columns. Row 0 holds the day headers; every other
/// active cell is a `<button>` carrying a discipline style marker, an offer
/// marker text and a price span.
pub struct CalendarGridExtractor;

/// Cell text with whitespace collapsed, fragments joined by a single space.
fn cell_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Time label text joined without separators, so the fragments "10", ":00",
/// "-", "12", ":00" come out as "10:00-12:00".
fn time_label(element: &ElementRef) -> String {
    element.text().map(str::trim).collect()
}

impl ExtractStrategy for CalendarGridExtractor {
    fn name(&self) -> &'static str {
        "calendar-grid"
    }

    fn probe(&self, html: &str) -> bool {
        html.contains("grid-cols-8")
    }

    fn extract(&self, html: &str) -> Result<Extraction> {
        let document = Html::parse_document(html);
        let row_selector = Selector::parse("div.grid-cols-8").unwrap();
        let header_selector = Selector::parse("div.text-gray-500").unwrap();
        let button_selector = Selector::parse("button").unwrap();
        let span_selector = Selector::parse("span").unwrap();

        let rows: Vec<ElementRef> = document.select(&row_selector).collect();
        if rows.is_empty() {
            return Err(HunterError::Parse(
                "no grid-cols-8 rows found in calendar".to_string(),
            ));
        }
        debug!("Found {} rows in the calendar grid", rows.len());

        // Column index (1-7) -> day header text
        let mut col_dates: HashMap<usize, String> = HashMap::new();
        let mut records = Vec::new();
        let mut date_range = String::new();

        for (row_index, row) in rows.iter().enumerate() {
            // Immediate children only; descending further would leave the
            // grid level and miscount columns.
            let cells: Vec<ElementRef> = row.children().filter_map(ElementRef::wrap).collect();
            if cells.len() < 8 {
                continue;
            }

            if row_index == 0 {
                for (col_idx, cell) in cells.iter().enumerate() {
                    if col_idx == 0 {
                        continue; // top-left corner is empty
                    }
                    // Prefer the clean date the header nests in a gray div,
                    // fall back to the full cell text.
                    let date_text = cell
                        .select(&header_selector)
                        .next()
                        .map(|d| cell_text(&d))
                        .unwrap_or_else(|| cell_text(cell));
                    col_dates.insert(col_idx, date_text);
                }
                let start = col_dates.get(&1).cloned().unwrap_or_else(|| "?".to_string());
                let end = col_dates.get(&7).cloned().unwrap_or_else(|| "?".to_string());
                date_range = format!("{start} - {end}");
                info!("Calendar week detected: {date_range}");
                continue;
            }

            let time = time_label(&cells[0]);

            for (col_idx, element) in cells.iter().enumerate().take(8).skip(1) {
                // An active slot is a button, either the cell itself or
                // nested inside it.
                let button = if element.value().name() == "button" {
                    Some(*element)
                } else {
                    element.select(&button_selector).next()
                };
                let Some(button) = button else { continue };

                let discipline = button
                    .value()
                    .classes()
                    .find_map(marker_to_discipline);
                // No discipline marker means the cell is not a bookable slot
                let Some(discipline) = discipline else { continue };

                let text_content = cell_text(&button);
                let is_offer = OFFER_MARKERS.iter().any(|m| text_content.contains(m));
                let price = button
                    .select(&span_selector)
                    .next()
                    .map(|s| cell_text(&s))
                    .unwrap_or_else(|| "N/A".to_string());
                let date = col_dates
                    .get(&col_idx)
                    .cloned()
                    .unwrap_or_else(|| "Unknown Date".to_string());

                if is_offer {
                    info!("Offer slot found: {discipline} on {date} at {time}");
                }

                records.push(json!({
                    "is_offer": is_offer,
                    "discipline": discipline,
                    "date": date,
                    "time": time,
                    "price": price,
                    "raw_text": text_content,
                }));
            }
        }

        Ok(Extraction {
            records,
            date_range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_page() -> String {
        let header: String = std::iter::once("<div></div>".to_string())
            .chain((19..26).map(|day| {
                format!("<div><div class=\"text-gray-500\">{day} ene</div></div>")
            }))
            .collect();

        // One slot row: time label, an offer button, a regular button, an
        // empty div and four blank cells.
        let slot_row = "<div>10:00</div>\
             <div><button class=\"slot border-lime-600\">Oferta<span>50€</span></button></div>\
             <button class=\"slot border-red-600\">Libre<span>80€</span></button>\
             <div></div><div></div><div></div><div></div><div></div>";

        format!(
            "<html><body>\
             <div class=\"grid grid-cols-8\">{header}</div>\
             <div class=\"grid grid-cols-8\">{slot_row}</div>\
             </body></html>"
        )
    }

    #[test]
    fn probe_requires_the_grid_anchor() {
        assert!(CalendarGridExtractor.probe(&grid_page()));
        assert!(!CalendarGridExtractor.probe("<div class=\"grid-cols-7\"></div>"));
    }

    #[test]
    fn header_row_yields_the_week_range() {
        let extraction = CalendarGridExtractor.extract(&grid_page()).unwrap();
        assert_eq!(extraction.date_range, "19 ene - 25 ene");
    }

    #[test]
    fn active_cells_become_records_with_offer_flag() {
        let extraction = CalendarGridExtractor.extract(&grid_page()).unwrap();
        assert_eq!(extraction.records.len(), 2);

        let offer = &extraction.records[0];
        assert_eq!(offer["is_offer"], true);
        assert_eq!(offer["discipline"], "wheelie");
        assert_eq!(offer["date"], "19 ene");
        assert_eq!(offer["time"], "10:00");
        assert_eq!(offer["price"], "50€");

        let regular = &extraction.records[1];
        assert_eq!(regular["is_offer"], false);
        assert_eq!(regular["discipline"], "drift");
        assert_eq!(regular["date"], "20 ene");
    }

    #[test]
    fn page_without_rows_is_a_parse_error() {
        let page = "<html><body><p>grid-cols-8 mentioned in prose only</p></body></html>";
        let err = CalendarGridExtractor.extract(page).unwrap_err();
        assert!(matches!(err, HunterError::Parse(_)));
    }

    #[test]
    fn short_rows_are_skipped() {
        let page = "<div class=\"grid-cols-8\"><div>only</div><div>three</div><div>cells</div></div>";
        let extraction = CalendarGridExtractor.extract(page).unwrap();
        assert!(extraction.records.is_empty());
    }
}
